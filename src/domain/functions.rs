//! The fixed table of spreadsheet functions.
//!
//! Every callable a formula may invoke lives in this registry; evaluation has
//! no other name resolution. Lookup is case-sensitive and keyed on the whole
//! identifier, so a name like `CHECKSUM` can never dispatch through `SUM`.

use std::collections::HashMap;

use super::errors::{EvalError, EvalResult};
use super::models::Value;

/// Signature shared by all registered functions.
pub type FunctionImpl = fn(&[Value]) -> EvalResult<Value>;

/// Registry mapping function names to their implementations.
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionImpl>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };
        registry.register_builtins();
        registry
    }

    /// Registers a function under the given name, exactly as spelled.
    pub fn register(&mut self, name: &str, function: FunctionImpl) {
        self.functions.insert(name.to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionImpl> {
        self.functions.get(name)
    }

    fn register_builtins(&mut self) {
        self.register("SUM", |args| {
            Ok(Value::Number(numeric_args("SUM", args)?.iter().sum()))
        });

        self.register("AVERAGE", |args| {
            let numbers = numeric_args("AVERAGE", args)?;
            // An empty AVERAGE is 0, not a division error.
            if numbers.is_empty() {
                Ok(Value::Number(0.0))
            } else {
                Ok(Value::Number(numbers.iter().sum::<f64>() / numbers.len() as f64))
            }
        });

        self.register("MIN", |args| {
            let numbers = numeric_args("MIN", args)?;
            numbers
                .iter()
                .copied()
                .reduce(f64::min)
                .map(Value::Number)
                .ok_or(EvalError::BadArity {
                    function: "MIN",
                    expected: "at least 1",
                    got: 0,
                })
        });

        self.register("MAX", |args| {
            let numbers = numeric_args("MAX", args)?;
            numbers
                .iter()
                .copied()
                .reduce(f64::max)
                .map(Value::Number)
                .ok_or(EvalError::BadArity {
                    function: "MAX",
                    expected: "at least 1",
                    got: 0,
                })
        });

        self.register("ROUND", |args| {
            let numbers = numeric_args("ROUND", args)?;
            match numbers.as_slice() {
                [value] => Ok(Value::Number(value.round())),
                [value, digits] => {
                    // The digits argument truncates toward zero; negative
                    // digit counts round to tens, hundreds, and so on.
                    let multiplier = 10f64.powi(*digits as i32);
                    Ok(Value::Number((value * multiplier).round() / multiplier))
                }
                _ => Err(EvalError::BadArity {
                    function: "ROUND",
                    expected: "1 or 2",
                    got: numbers.len(),
                }),
            }
        });

        self.register("IF", |args| {
            if args.len() != 3 {
                return Err(EvalError::BadArity {
                    function: "IF",
                    expected: "exactly 3",
                    got: args.len(),
                });
            }
            Ok(if args[0].is_truthy() {
                args[1].clone()
            } else {
                args[2].clone()
            })
        });

        self.register("AND", |args| {
            Ok(Value::Bool(args.iter().all(Value::is_truthy)))
        });

        self.register("OR", |args| {
            Ok(Value::Bool(args.iter().any(Value::is_truthy)))
        });

        self.register("NOT", |args| {
            if args.len() != 1 {
                return Err(EvalError::BadArity {
                    function: "NOT",
                    expected: "exactly 1",
                    got: args.len(),
                });
            }
            Ok(Value::Bool(!args[0].is_truthy()))
        });

        self.register("LEN", |args| {
            if args.len() != 1 {
                return Err(EvalError::BadArity {
                    function: "LEN",
                    expected: "exactly 1",
                    got: args.len(),
                });
            }
            Ok(Value::Number(args[0].to_string().chars().count() as f64))
        });

        self.register("CONCAT", |args| {
            Ok(Value::Text(args.iter().map(Value::to_string).collect()))
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn numeric_args(function: &'static str, args: &[Value]) -> EvalResult<Vec<f64>> {
    args.iter()
        .map(|value| {
            value.as_number().ok_or_else(|| {
                EvalError::TypeMismatch(format!("{} expects numeric arguments", function))
            })
        })
        .collect()
}
