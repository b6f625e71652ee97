//! `json_value(text)`: parse JSON text into boxed values.

use vecq_core::prelude::*;

use super::{eval_arguments, map_rows};
use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::{expect_arity, ScalarFunction};

/// Convert parsed JSON into a boxed value. Objects become single-row
/// `ObjectValue`s and arrays become Any-typed array vectors.
pub fn json_to_value(json: serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(b),
        Json::Number(n) => match n.as_i64() {
            Some(v) => Value::Long(v),
            None => n.as_f64().map_or(Value::Null, Value::Double),
        },
        Json::String(s) => Value::from(s),
        Json::Array(items) => {
            let values = items
                .into_iter()
                .map(json_to_value)
                .collect::<Result<Vec<_>>>()?;
            Value::Array(ValueVector::from_values(ResolvedType::Any, values)?)
        }
        Json::Object(map) => {
            let pairs = map
                .into_iter()
                .map(|(k, v)| Ok((k, json_to_value(v)?)))
                .collect::<Result<Vec<_>>>()?;
            Value::Object(ObjectValue::from_pairs(pairs)?)
        }
    })
}

pub fn parse_json(text: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| FunctionError::Data(format!("cannot parse '{text}' as JSON: {e}")))?;
    json_to_value(json)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonValue;

impl ScalarFunction for JsonValue {
    fn name(&self) -> &'static str {
        "json_value"
    }

    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        expect_arity("json_value", arguments, 1)?;
        match arguments[0].ty(schema)? {
            ResolvedType::String | ResolvedType::Any => Ok(ResolvedType::Any),
            other => Err(FunctionError::Type(format!(
                "json_value expects a string argument, got {other}"
            ))),
        }
    }

    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        let output = self.return_type(input.schema(), arguments)?;
        let vectors = eval_arguments(ctx, input, arguments)?;
        map_rows(ctx, input.row_count(), &vectors, &output, |values| {
            match &values[0] {
                Value::Null => Ok(Value::Null),
                Value::String(text) => parse_json(text),
                other => Err(FunctionError::Type(format!(
                    "json_value expects strings, got {other}"
                ))),
            }
        })
    }
}
