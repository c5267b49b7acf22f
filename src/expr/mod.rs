//! Declarative expressions used by trigger conditions and effect parameters.
//!
//! - [`Value`] and [`Document`]: the data expressions read
//! - [`Expr`]: a closed, serializable expression tree
//! - [`FunctionTable`]: named native functions, owned per engine
//! - [`ConditionEvaluator`]: three-valued condition evaluation

pub mod evaluator;
pub mod expression;
pub mod functions;
pub mod value;

pub use evaluator::{eval_condition, eval_value, ConditionEvaluator, Outcome, StandardEvaluator};
pub use expression::{CmpOp, Expr};
pub use functions::{FunctionTable, NativeFn};
pub use value::{Document, Value};
