use super::ast::{Expr, Value};
use crate::error::EvalError;
use ahash::AHashMap;
use std::cmp::Ordering;

type Input = AHashMap<String, serde_json::Value>;

pub(super) fn eval(expr: &Expr, input: &Input) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),

        Expr::Ident(_) | Expr::Member(..) => resolve(expr, input),

        Expr::Not(operand) => {
            let value = as_bool("!", eval(operand, input)?)?;
            Ok(Value::Bool(!value))
        }
        Expr::And(l, r) => {
            // short-circuit: the right side is untouched when the left is false
            if !as_bool("&&", eval(l, input)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(as_bool("&&", eval(r, input)?)?))
        }
        Expr::Or(l, r) => {
            if as_bool("||", eval(l, input)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(as_bool("||", eval(r, input)?)?))
        }

        Expr::Equal(l, r) => {
            let (l, r) = (eval(l, input)?, eval(r, input)?);
            Ok(Value::Bool(values_equal(&l, &r)))
        }
        Expr::NotEqual(l, r) => {
            let (l, r) = (eval(l, input)?, eval(r, input)?);
            Ok(Value::Bool(!values_equal(&l, &r)))
        }

        Expr::LessThan(l, r) => compare("<", eval(l, input)?, eval(r, input)?, Ordering::is_lt),
        Expr::LessThanOrEqual(l, r) => {
            compare("<=", eval(l, input)?, eval(r, input)?, Ordering::is_le)
        }
        Expr::GreaterThan(l, r) => compare(">", eval(l, input)?, eval(r, input)?, Ordering::is_gt),
        Expr::GreaterThanOrEqual(l, r) => {
            compare(">=", eval(l, input)?, eval(r, input)?, Ordering::is_ge)
        }

        Expr::In(l, r) => {
            let element = eval(l, input)?;
            match eval(r, input)? {
                Value::List(items) => {
                    Ok(Value::Bool(items.iter().any(|v| values_equal(v, &element))))
                }
                found => Err(EvalError::TypeMismatch {
                    op: "in",
                    expected: "list",
                    found,
                }),
            }
        }
    }
}

/// Collapse an identifier or member chain into a dotted key and look it up
/// in the flattened input.
fn resolve(expr: &Expr, input: &Input) -> Result<Value, EvalError> {
    let path =
        path_of(expr).ok_or_else(|| EvalError::Unresolvable(format!("{expr:?}")))?;
    input
        .get(&path)
        .map(Value::from_json)
        .ok_or(EvalError::InputNotFound(path))
}

fn path_of(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(name) => Some(name.clone()),
        Expr::Member(base, field) => Some(format!("{}.{}", path_of(base)?, field)),
        _ => None,
    }
}

fn as_bool(op: &'static str, value: Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(b),
        found => Err(EvalError::TypeMismatch {
            op,
            expected: "bool",
            found,
        }),
    }
}

/// Equality with numeric promotion: ints and doubles compare by value.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(i), Value::Double(d)) | (Value::Double(d), Value::Int(i)) => *i as f64 == *d,
        _ => a == b,
    }
}

fn compare(
    op: &'static str,
    left: Value,
    right: Value,
    test: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let ordering = match (&left, &right) {
        (Value::Int(l), Value::Int(r)) => l.cmp(r),
        (Value::String(l), Value::String(r)) => l.cmp(r),
        _ => {
            let (Some(l), Some(r)) = (numeric(&left), numeric(&right)) else {
                let found = if numeric(&left).is_none() { left } else { right };
                return Err(EvalError::TypeMismatch {
                    op,
                    expected: "number",
                    found,
                });
            };
            l.partial_cmp(&r).ok_or(EvalError::NotComparable { op })?
        }
    };
    Ok(Value::Bool(test(ordering)))
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Double(d) => Some(*d),
        _ => None,
    }
}
