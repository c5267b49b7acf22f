//! Expression AST.
//!
//! Conditions and effect parameters are plain data: a closed tagged union
//! that card content can express declaratively and the evaluator can match
//! exhaustively.

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

/// An expression over a [`Document`](super::Document).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal value.
    Lit(Value),

    /// A dotted document path. Missing paths evaluate to `Null`.
    Path(String),

    /// A call into the session's function table.
    Call {
        /// Function name.
        func: String,
        /// Argument expressions.
        args: Vec<Expr>,
    },

    /// A binary comparison.
    Cmp {
        /// Operator.
        op: CmpOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },

    /// All sub-conditions must hold.
    All(Vec<Expr>),

    /// At least one sub-condition must hold.
    Any(Vec<Expr>),

    /// Negation.
    Not(Box<Expr>),
}

impl Expr {
    /// Literal.
    pub fn lit(value: impl Into<Value>) -> Self {
        Self::Lit(value.into())
    }

    /// Document path.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Function call.
    pub fn call(func: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Call {
            func: func.into(),
            args: args.into_iter().collect(),
        }
    }

    fn cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Cmp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// `lhs == rhs`.
    pub fn eq(lhs: Expr, rhs: Expr) -> Self {
        Self::cmp(CmpOp::Eq, lhs, rhs)
    }

    /// `lhs != rhs`.
    pub fn ne(lhs: Expr, rhs: Expr) -> Self {
        Self::cmp(CmpOp::Ne, lhs, rhs)
    }

    /// `lhs < rhs`.
    pub fn lt(lhs: Expr, rhs: Expr) -> Self {
        Self::cmp(CmpOp::Lt, lhs, rhs)
    }

    /// `lhs <= rhs`.
    pub fn le(lhs: Expr, rhs: Expr) -> Self {
        Self::cmp(CmpOp::Le, lhs, rhs)
    }

    /// `lhs > rhs`.
    pub fn gt(lhs: Expr, rhs: Expr) -> Self {
        Self::cmp(CmpOp::Gt, lhs, rhs)
    }

    /// `lhs >= rhs`.
    pub fn ge(lhs: Expr, rhs: Expr) -> Self {
        Self::cmp(CmpOp::Ge, lhs, rhs)
    }

    /// Conjunction.
    pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Self::All(exprs.into_iter().collect())
    }

    /// Disjunction.
    pub fn any(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Self::Any(exprs.into_iter().collect())
    }

    /// Negate this expression.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: Expr) -> Self {
        match self {
            Self::All(mut exprs) => {
                exprs.push(other);
                Self::All(exprs)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Shorthand for `path == literal`, the most common trigger condition.
    pub fn path_eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::eq(Self::path(path), Self::lit(value))
    }
}
