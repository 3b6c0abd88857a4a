//! The embedded boolean expression language used by `check:` steps.
//!
//! The surface is deliberately small: literals, dotted member access on the
//! workflow input, comparisons, `in`, and the boolean connectives. Expressions
//! are compiled once against a type environment and evaluated repeatedly
//! against a flattened input map with dotted keys (`input.group.id`).
//!
//! Types for identifiers come from a [`TypeProvider`], which resolves
//! fully-qualified dotted names. The provider backed by a JSON schema lives
//! in [`crate::schema`].

mod ast;
mod check;
mod eval;
mod parse;

pub use ast::{Expr, Value};

use crate::error::{EvalError, ExprError};
use ahash::AHashMap;
use std::fmt;

/// Types known to the expression language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Null,
    Bool,
    Int,
    Double,
    String,
    /// A list with a fixed element type.
    List(Box<Type>),
    /// A structural object named by its dotted schema path.
    Object(String),
    /// An unchecked type: field selection and comparisons always succeed.
    Any,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => write!(f, "null"),
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Double => write!(f, "double"),
            Type::String => write!(f, "string"),
            Type::List(item) => write!(f, "list({})", item),
            Type::Object(name) => write!(f, "{}", name),
            Type::Any => write!(f, "any"),
        }
    }
}

/// Supplies types for fully-qualified dotted names during type-checking.
pub trait TypeProvider {
    /// Resolve the type registered under a dotted name such as
    /// `input.group.id`. `None` means the name is not declared.
    fn find_type(&self, name: &str) -> Option<Type>;
}

/// A compilation environment: declared variables plus a type provider.
pub struct Env<'p> {
    variables: AHashMap<String, Type>,
    provider: &'p dyn TypeProvider,
}

impl<'p> Env<'p> {
    pub fn new(provider: &'p dyn TypeProvider) -> Self {
        Env {
            variables: AHashMap::new(),
            provider,
        }
    }

    /// Declare a variable visible to compiled expressions.
    pub fn variable(mut self, name: &str, ty: Type) -> Self {
        self.variables.insert(name.to_string(), ty);
        self
    }

    /// Parse and type-check an expression, producing an executable handle.
    pub fn compile(&self, source: &str) -> Result<CompiledExpr, ExprError> {
        let ast = parse::parse(source)?;
        let output = check::Checker::new(self).infer(&ast)?;
        Ok(CompiledExpr {
            source: source.to_string(),
            ast,
            output,
        })
    }

    pub(crate) fn variable_type(&self, name: &str) -> Option<&Type> {
        self.variables.get(name)
    }

    pub(crate) fn provider(&self) -> &dyn TypeProvider {
        self.provider
    }
}

/// A parsed, type-checked expression ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    source: String,
    ast: Expr,
    output: Type,
}

impl CompiledExpr {
    /// The type the expression produces.
    pub fn output_type(&self) -> &Type {
        &self.output
    }

    /// The original expression text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against a flattened input map keyed by dotted paths.
    pub fn eval(
        &self,
        input: &AHashMap<String, serde_json::Value>,
    ) -> Result<Value, EvalError> {
        eval::eval(&self.ast, input)
    }
}
