//! Expression tree evaluated column-at-a-time against a `TupleVector`.

use std::fmt;
use std::sync::Arc;

use vecq_core::prelude::*;

use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::function::ScalarFunction;

#[derive(Clone)]
pub struct FunctionCall {
    pub function: Arc<dyn ScalarFunction>,
    pub arguments: Vec<Expression>,
    pub catalog_alias: Option<String>,
}

#[derive(Clone)]
pub enum Expression {
    /// Reference to the first input column with this name.
    Column(String),
    Literal(Value, ResolvedType),
    Function(FunctionCall),
    /// `parameter -> body`; only meaningful as a higher-order function argument.
    Lambda {
        parameter: String,
        body: Box<Expression>,
    },
    /// `*`, as in `count(*)`.
    Asterisk,
}

impl Expression {
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(name.into())
    }

    /// Literal typed by the value's runtime type.
    pub fn literal(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = value.runtime_type();
        Expression::Literal(value, ty)
    }

    pub fn call(function: Arc<dyn ScalarFunction>, arguments: Vec<Expression>) -> Self {
        Expression::Function(FunctionCall {
            function,
            arguments,
            catalog_alias: None,
        })
    }

    pub fn lambda(parameter: impl Into<String>, body: Expression) -> Self {
        Expression::Lambda {
            parameter: parameter.into(),
            body: Box::new(body),
        }
    }

    /// Static type against an input schema.
    pub fn ty(&self, schema: &Schema) -> Result<ResolvedType> {
        match self {
            Expression::Column(name) => schema
                .index_of(name)
                .and_then(|idx| schema.column(idx))
                .map(|c| c.data_type.clone())
                .ok_or_else(|| unknown_column(name, schema)),
            Expression::Literal(_, ty) => Ok(ty.clone()),
            Expression::Function(call) => call.function.return_type(schema, &call.arguments),
            Expression::Lambda { .. } => Err(FunctionError::Type(
                "a lambda has no type outside a higher-order function".into(),
            )),
            Expression::Asterisk => Err(FunctionError::Type(
                "* is only valid as an aggregate argument".into(),
            )),
        }
    }

    /// Evaluate to one value per input row.
    pub fn eval(&self, input: &TupleVector, ctx: &ExecutionContext) -> Result<ValueVector> {
        match self {
            Expression::Column(name) => input
                .column_by_name(name)
                .cloned()
                .ok_or_else(|| unknown_column(name, input.schema())),
            Expression::Literal(value, ty) => Ok(ValueVector::literal(
                value.clone(),
                ty.clone(),
                input.row_count(),
            )?),
            Expression::Function(call) => call.function.eval_scalar(
                ctx,
                input,
                call.catalog_alias.as_deref(),
                &call.arguments,
            ),
            Expression::Lambda { .. } => Err(FunctionError::Type(
                "a lambda cannot be evaluated on its own".into(),
            )),
            Expression::Asterisk => Err(FunctionError::Type(
                "* cannot be evaluated on its own".into(),
            )),
        }
    }

    /// The string of a string literal.
    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Expression::Literal(Value::String(s), _) => Some(s),
            _ => None,
        }
    }
}

fn unknown_column(name: &str, schema: &Schema) -> FunctionError {
    FunctionError::Argument(format!("unknown column '{name}' in {schema}"))
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column(name) => write!(f, "{name}"),
            Expression::Literal(Value::String(s), _) => write!(f, "'{s}'"),
            Expression::Literal(value, _) => write!(f, "{value}"),
            Expression::Function(call) => {
                write!(f, "{}(", call.function.name())?;
                for (i, arg) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Expression::Lambda { parameter, body } => write!(f, "{parameter} -> {body}"),
            Expression::Asterisk => write!(f, "*"),
        }
    }
}
