//! Function lookup table for expression calls.
//!
//! The table is constructed explicitly and owned by the session's
//! [`Engine`](crate::engine::Engine); nothing is registered globally, so
//! two sessions with different content can run side by side.
//!
//! ```
//! use court_engine::expr::{FunctionTable, Value};
//!
//! let mut table = FunctionTable::with_builtins();
//! table.register("double", |args| {
//!     Ok(Value::Int(args.first().and_then(Value::as_int).unwrap_or(0) * 2))
//! });
//!
//! assert_eq!(table.call("double", &[Value::Int(4)]).unwrap(), Value::Int(8));
//! assert!(table.call("triple", &[]).is_err());
//! ```

use rustc_hash::FxHashMap;

use crate::error::{EngineError, Result};

use super::value::Value;

/// A native function callable from expressions.
pub type NativeFn = Box<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// Named functions available to expressions.
#[derive(Default)]
pub struct FunctionTable {
    functions: FxHashMap<String, NativeFn>,
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionTable").field("functions", &names).finish()
    }
}

impl FunctionTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding the builtin functions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register("add", |args| fold_ints("add", args, 0, i64::saturating_add));
        table.register("mul", |args| fold_ints("mul", args, 1, i64::saturating_mul));
        table.register("sub", |args| {
            let (Some(a), Some(b)) = (int_arg("sub", args, 0)?, int_arg("sub", args, 1)?) else {
                return Ok(Value::Null);
            };
            Ok(Value::Int(a.saturating_sub(b)))
        });
        table.register("min", |args| extremum("min", args, std::cmp::min));
        table.register("max", |args| extremum("max", args, std::cmp::max));
        table.register("count", |args| match args.first() {
            Some(Value::List(items)) => Ok(Value::Int(len_i64(items.len()))),
            Some(Value::Map(m)) => Ok(Value::Int(len_i64(m.len()))),
            Some(Value::Null) | None => Ok(Value::Int(0)),
            Some(other) => Err(EngineError::InvalidArgument {
                function: "count".to_string(),
                reason: format!("cannot count a {}", other.type_name()),
            }),
        });
        table.register("contains", |args| match (args.first(), args.get(1)) {
            (Some(Value::List(items)), Some(needle)) => Ok(Value::Bool(items.contains(needle))),
            (Some(Value::Null), _) => Ok(Value::Bool(false)),
            _ => Err(EngineError::InvalidArgument {
                function: "contains".to_string(),
                reason: "expected (list, value)".to_string(),
            }),
        });
        table.register("opponent", |args| match args.first() {
            Some(Value::Null) | None => Ok(Value::Null),
            Some(v) => v
                .as_team()
                .map(|t| Value::from(t.opponent()))
                .ok_or_else(|| EngineError::InvalidArgument {
                    function: "opponent".to_string(),
                    reason: format!("not a team: {v:?}"),
                }),
        });
        table.register("concat", |args| {
            let mut out = String::new();
            for arg in args {
                match arg {
                    Value::Text(s) => out.push_str(s),
                    Value::Int(i) => out.push_str(&i.to_string()),
                    Value::Null => {}
                    other => {
                        return Err(EngineError::InvalidArgument {
                            function: "concat".to_string(),
                            reason: format!("cannot concat a {}", other.type_name()),
                        })
                    }
                }
            }
            Ok(Value::Text(out))
        });
        table
    }

    /// Register (or replace) a function.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        function: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) {
        self.functions.insert(name.into(), Box::new(function));
    }

    /// Call a function by name.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownFunction`] if the name is not registered, or
    /// whatever the function itself returns.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| EngineError::UnknownFunction {
                name: name.to_string(),
            })?;
        function(args)
    }

    /// Check whether a function is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

fn len_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Integer argument at `index`; `Ok(None)` for `Null`.
fn int_arg(function: &str, args: &[Value], index: usize) -> Result<Option<i64>> {
    match args.get(index) {
        Some(Value::Int(v)) => Ok(Some(*v)),
        Some(Value::Null) => Ok(None),
        Some(other) => Err(EngineError::InvalidArgument {
            function: function.to_string(),
            reason: format!("argument {index} is a {}, expected int", other.type_name()),
        }),
        None => Err(EngineError::InvalidArgument {
            function: function.to_string(),
            reason: format!("missing argument {index}"),
        }),
    }
}

fn fold_ints(function: &str, args: &[Value], init: i64, op: fn(i64, i64) -> i64) -> Result<Value> {
    let mut acc = init;
    for index in 0..args.len() {
        match int_arg(function, args, index)? {
            Some(v) => acc = op(acc, v),
            None => return Ok(Value::Null),
        }
    }
    Ok(Value::Int(acc))
}

fn extremum(function: &str, args: &[Value], pick: fn(i64, i64) -> i64) -> Result<Value> {
    let mut best: Option<i64> = None;
    for index in 0..args.len() {
        if let Some(v) = int_arg(function, args, index)? {
            best = Some(best.map_or(v, |b| pick(b, v)));
        }
    }
    Ok(best.map_or(Value::Null, Value::Int))
}
