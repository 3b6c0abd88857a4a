use super::ast::{Expr, Value};
use super::{Env, Type};
use crate::error::ExprError;

/// Infers and validates the type of an expression against an [`Env`].
pub(super) struct Checker<'a, 'p> {
    env: &'a Env<'p>,
}

impl<'a, 'p> Checker<'a, 'p> {
    pub(super) fn new(env: &'a Env<'p>) -> Self {
        Checker { env }
    }

    pub(super) fn infer(&self, expr: &Expr) -> Result<Type, ExprError> {
        match expr {
            Expr::Literal(value) => Ok(match value {
                Value::Null => Type::Null,
                Value::Bool(_) => Type::Bool,
                Value::Int(_) => Type::Int,
                Value::Double(_) => Type::Double,
                Value::String(_) => Type::String,
                Value::List(_) | Value::Object(_) => Type::Any,
            }),

            Expr::Ident(name) => self
                .env
                .variable_type(name)
                .cloned()
                .ok_or_else(|| ExprError::UnknownVariable(name.clone())),

            Expr::Member(base, field) => match self.infer(base)? {
                Type::Any => Ok(Type::Any),
                Type::Object(path) => {
                    let qualified = format!("{path}.{field}");
                    self.env.provider().find_type(&qualified).ok_or_else(|| {
                        ExprError::UnknownField {
                            object: path,
                            field: field.clone(),
                        }
                    })
                }
                other => Err(ExprError::NotAnObject(other)),
            },

            Expr::Not(operand) => {
                self.expect_bool("!", operand)?;
                Ok(Type::Bool)
            }
            Expr::And(l, r) => {
                self.expect_bool("&&", l)?;
                self.expect_bool("&&", r)?;
                Ok(Type::Bool)
            }
            Expr::Or(l, r) => {
                self.expect_bool("||", l)?;
                self.expect_bool("||", r)?;
                Ok(Type::Bool)
            }

            Expr::Equal(l, r) => self.check_equality("==", l, r),
            Expr::NotEqual(l, r) => self.check_equality("!=", l, r),

            Expr::LessThan(l, r) => self.check_ordering("<", l, r),
            Expr::LessThanOrEqual(l, r) => self.check_ordering("<=", l, r),
            Expr::GreaterThan(l, r) => self.check_ordering(">", l, r),
            Expr::GreaterThanOrEqual(l, r) => self.check_ordering(">=", l, r),

            Expr::In(l, r) => {
                let element = self.infer(l)?;
                let list = self.infer(r)?;
                match list {
                    Type::Any => Ok(Type::Bool),
                    Type::List(item) => {
                        if element == Type::Any || *item == Type::Any || element == *item {
                            Ok(Type::Bool)
                        } else {
                            Err(ExprError::OperandMismatch {
                                op: "in",
                                left: element,
                                right: Type::List(item),
                            })
                        }
                    }
                    other => Err(ExprError::BadOperand {
                        op: "in",
                        expected: Type::List(Box::new(Type::Any)),
                        found: other,
                    }),
                }
            }
        }
    }

    fn expect_bool(&self, op: &'static str, operand: &Expr) -> Result<(), ExprError> {
        match self.infer(operand)? {
            Type::Bool | Type::Any => Ok(()),
            found => Err(ExprError::BadOperand {
                op,
                expected: Type::Bool,
                found,
            }),
        }
    }

    /// Equality admits matching types, `null` against anything, and `any`
    /// against anything.
    fn check_equality(&self, op: &'static str, l: &Expr, r: &Expr) -> Result<Type, ExprError> {
        let left = self.infer(l)?;
        let right = self.infer(r)?;
        let ok = left == right
            || left == Type::Any
            || right == Type::Any
            || left == Type::Null
            || right == Type::Null;
        if ok {
            Ok(Type::Bool)
        } else {
            Err(ExprError::OperandMismatch { op, left, right })
        }
    }

    /// Ordering requires two ints, two doubles, or two strings.
    fn check_ordering(&self, op: &'static str, l: &Expr, r: &Expr) -> Result<Type, ExprError> {
        let left = self.infer(l)?;
        let right = self.infer(r)?;
        let ok = left == Type::Any
            || right == Type::Any
            || (left == right && matches!(left, Type::Int | Type::Double | Type::String));
        if ok {
            Ok(Type::Bool)
        } else {
            Err(ExprError::OperandMismatch { op, left, right })
        }
    }
}
