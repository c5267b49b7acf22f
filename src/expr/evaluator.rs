//! Condition evaluation.
//!
//! Conditions are three-valued. A trigger fires only on
//! [`Outcome::Satisfied`]; [`Outcome::Conflict`] (the document contradicts
//! the condition) and [`Outcome::Open`] (the document lacks the data to
//! decide) both mean "does not fire" and are reported, never logged as
//! errors.
//!
//! Combinators follow Kleene logic: `All` is a conflict if any part
//! conflicts, otherwise open if any part is open. `Any` is satisfied if any
//! part is satisfied, otherwise open if any part is open.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::expression::{CmpOp, Expr};
use super::functions::FunctionTable;
use super::value::{Document, Value};

/// Result of evaluating a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The condition holds.
    Satisfied,
    /// The condition is contradicted by the document.
    Conflict,
    /// The document does not contain enough data to decide.
    Open,
}

impl Outcome {
    /// True only for `Satisfied`.
    #[must_use]
    pub fn is_satisfied(self) -> bool {
        self == Outcome::Satisfied
    }

    fn from_bool(b: bool) -> Self {
        if b {
            Outcome::Satisfied
        } else {
            Outcome::Conflict
        }
    }

    fn negate(self) -> Self {
        match self {
            Outcome::Satisfied => Outcome::Conflict,
            Outcome::Conflict => Outcome::Satisfied,
            Outcome::Open => Outcome::Open,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Outcome::Satisfied => Value::Bool(true),
            Outcome::Conflict => Value::Bool(false),
            Outcome::Open => Value::Null,
        }
    }
}

/// Evaluates conditions against documents.
///
/// The dispatcher and the response matcher share one evaluator, owned by
/// the [`Engine`](crate::engine::Engine).
pub trait ConditionEvaluator: Send + Sync {
    /// Evaluate `condition` against `document`.
    ///
    /// # Errors
    ///
    /// Fatal evaluation errors, such as an unknown function.
    fn evaluate(
        &self,
        condition: &Expr,
        document: &Document,
        functions: &FunctionTable,
    ) -> Result<Outcome>;
}

/// The built-in evaluator for [`Expr`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardEvaluator;

impl ConditionEvaluator for StandardEvaluator {
    fn evaluate(
        &self,
        condition: &Expr,
        document: &Document,
        functions: &FunctionTable,
    ) -> Result<Outcome> {
        eval_condition(condition, document, functions)
    }
}

/// Evaluate an expression to a value.
///
/// Missing paths yield `Null`. Boolean expressions yield `Bool`, or `Null`
/// when the outcome is open.
///
/// # Errors
///
/// [`EngineError::UnknownFunction`](crate::error::EngineError::UnknownFunction)
/// for calls to unregistered functions, and any error a function returns.
pub fn eval_value(expr: &Expr, document: &Document, functions: &FunctionTable) -> Result<Value> {
    match expr {
        Expr::Lit(v) => Ok(v.clone()),
        Expr::Path(path) => Ok(document.get(path).cloned().unwrap_or_default()),
        Expr::Call { func, args } => {
            let args = args
                .iter()
                .map(|a| eval_value(a, document, functions))
                .collect::<Result<Vec<_>>>()?;
            functions.call(func, &args)
        }
        Expr::Cmp { .. } | Expr::All(_) | Expr::Any(_) | Expr::Not(_) => {
            Ok(eval_condition(expr, document, functions)?.into_value())
        }
    }
}

/// Evaluate an expression as a three-valued condition.
///
/// # Errors
///
/// Same as [`eval_value`].
pub fn eval_condition(
    expr: &Expr,
    document: &Document,
    functions: &FunctionTable,
) -> Result<Outcome> {
    match expr {
        Expr::Lit(_) | Expr::Path(_) | Expr::Call { .. } => {
            Ok(match eval_value(expr, document, functions)? {
                Value::Bool(b) => Outcome::from_bool(b),
                Value::Null => Outcome::Open,
                _ => Outcome::Conflict,
            })
        }

        Expr::Cmp { op, lhs, rhs } => {
            let lhs = eval_value(lhs, document, functions)?;
            let rhs = eval_value(rhs, document, functions)?;
            Ok(compare(*op, &lhs, &rhs))
        }

        Expr::All(parts) => {
            let mut open = false;
            for part in parts {
                match eval_condition(part, document, functions)? {
                    Outcome::Conflict => return Ok(Outcome::Conflict),
                    Outcome::Open => open = true,
                    Outcome::Satisfied => {}
                }
            }
            Ok(if open { Outcome::Open } else { Outcome::Satisfied })
        }

        Expr::Any(parts) => {
            let mut open = false;
            for part in parts {
                match eval_condition(part, document, functions)? {
                    Outcome::Satisfied => return Ok(Outcome::Satisfied),
                    Outcome::Open => open = true,
                    Outcome::Conflict => {}
                }
            }
            Ok(if open { Outcome::Open } else { Outcome::Conflict })
        }

        Expr::Not(inner) => Ok(eval_condition(inner, document, functions)?.negate()),
    }
}

fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Outcome {
    if lhs.is_null() || rhs.is_null() {
        return Outcome::Open;
    }
    match op {
        CmpOp::Eq => Outcome::from_bool(lhs == rhs),
        CmpOp::Ne => Outcome::from_bool(lhs != rhs),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
            let ordering = match (lhs, rhs) {
                (Value::Int(a), Value::Int(b)) => a.cmp(b),
                (Value::Text(a), Value::Text(b)) => a.cmp(b),
                _ => return Outcome::Conflict,
            };
            Outcome::from_bool(match op {
                CmpOp::Lt => ordering == Ordering::Less,
                CmpOp::Le => ordering != Ordering::Greater,
                CmpOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Team;
    use crate::error::EngineError;

    fn doc() -> Document {
        Document::new()
            .with("team", Team::Home)
            .with("distance", 4i64)
            .with("flag", true)
    }

    fn check(expr: &Expr) -> Outcome {
        StandardEvaluator
            .evaluate(expr, &doc(), &FunctionTable::with_builtins())
            .unwrap()
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(check(&Expr::path_eq("team", "home")), Outcome::Satisfied);
        assert_eq!(check(&Expr::path_eq("team", "away")), Outcome::Conflict);
        assert_eq!(check(&Expr::gt(Expr::path("distance"), Expr::lit(3i64))), Outcome::Satisfied);
        assert_eq!(check(&Expr::le(Expr::path("distance"), Expr::lit(3i64))), Outcome::Conflict);
    }

    #[test]
    fn test_missing_data_is_open() {
        assert_eq!(check(&Expr::path_eq("zone", "paint")), Outcome::Open);
        assert_eq!(check(&Expr::path("nothing")), Outcome::Open);
        assert_eq!(check(&Expr::path_eq("zone", "paint").negate()), Outcome::Open);
    }

    #[test]
    fn test_mismatched_ordering_is_conflict() {
        assert_eq!(check(&Expr::lt(Expr::path("team"), Expr::lit(3i64))), Outcome::Conflict);
        assert_eq!(check(&Expr::path("distance")), Outcome::Conflict);
    }

    #[test]
    fn test_kleene_combinators() {
        let sat = Expr::path("flag");
        let open = Expr::path("nothing");
        let conflict = Expr::path_eq("team", "away");

        assert_eq!(check(&Expr::all([sat.clone(), open.clone()])), Outcome::Open);
        assert_eq!(check(&Expr::all([open.clone(), conflict.clone()])), Outcome::Conflict);
        assert_eq!(check(&Expr::any([open.clone(), sat.clone()])), Outcome::Satisfied);
        assert_eq!(check(&Expr::any([open, conflict.clone()])), Outcome::Open);
        assert_eq!(check(&conflict.negate()), Outcome::Satisfied);
        assert_eq!(check(&Expr::all([])), Outcome::Satisfied);
        assert_eq!(check(&Expr::any([])), Outcome::Conflict);
    }

    #[test]
    fn test_calls_in_conditions() {
        let expr = Expr::eq(
            Expr::call("opponent", [Expr::path("team")]),
            Expr::lit(Team::Away),
        );
        assert_eq!(check(&expr), Outcome::Satisfied);
    }

    #[test]
    fn test_unknown_function_is_fatal() {
        let expr = Expr::call("warp", [Expr::lit(1i64)]);
        let err = StandardEvaluator
            .evaluate(&expr, &doc(), &FunctionTable::with_builtins())
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownFunction { .. }));
    }

    #[test]
    fn test_eval_value_of_condition() {
        let functions = FunctionTable::with_builtins();
        let d = doc();
        assert_eq!(
            eval_value(&Expr::path_eq("team", "home"), &d, &functions).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            eval_value(&Expr::path_eq("zone", "x"), &d, &functions).unwrap(),
            Value::Null
        );
        assert_eq!(
            eval_value(&Expr::call("add", [Expr::path("distance"), Expr::lit(1i64)]), &d, &functions)
                .unwrap(),
            Value::Int(5)
        );
    }
}
