//! Structural constructors: `object(k1, v1, ...)` and `array(a, b, ...)`.

use vecq_core::prelude::*;

use super::{eval_arguments, map_rows};
use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::ScalarFunction;

/// Split `k1, v1, k2, v2, ...` into literal string keys and value expressions.
fn key_value_pairs(arguments: &[Expression]) -> Result<Vec<(&str, &Expression)>> {
    if arguments.len() % 2 != 0 {
        return Err(FunctionError::Argument(format!(
            "object expects an even number of arguments, got {}",
            arguments.len()
        )));
    }
    arguments
        .chunks(2)
        .map(|pair| {
            let key = pair[0].as_string_literal().ok_or_else(|| {
                FunctionError::Argument(format!(
                    "object keys must be string literals, got {}",
                    pair[0]
                ))
            })?;
            Ok((key, &pair[1]))
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectConstructor;

impl ScalarFunction for ObjectConstructor {
    fn name(&self) -> &'static str {
        "object"
    }

    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        let columns = key_value_pairs(arguments)?
            .into_iter()
            .map(|(key, value)| Ok(Column::new(key, value.ty(schema)?)))
            .collect::<Result<Schema>>()?;
        Ok(ResolvedType::Object(columns))
    }

    /// Every output row is a view into one shared tuple of the value columns.
    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        let output = self.return_type(input.schema(), arguments)?;
        let pairs = key_value_pairs(arguments)?;
        let mut columns = Vec::with_capacity(pairs.len());
        let mut vectors = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let vector = value.eval(input, ctx)?;
            columns.push(Column::new(key, vector.ty().clone()));
            vectors.push(vector);
        }
        let tuple = if vectors.is_empty() {
            TupleVector::constant(input.row_count())
        } else {
            TupleVector::of(Schema::new(columns), vectors)?
        };
        let mut builder = ctx.factory().builder(&output);
        for row in 0..input.row_count() {
            builder.put_any(Value::Object(ObjectValue::new(tuple.clone(), row)))?;
        }
        Ok(builder.build()?)
    }
}

/// One array per row holding the argument values, widened to their common type.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrayConstructor;

impl ArrayConstructor {
    fn element_type(schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        let mut element: Option<ResolvedType> = None;
        for argument in arguments {
            let ty = argument.ty(schema)?;
            element = Some(match element {
                Some(current) => ResolvedType::common_type(&current, &ty),
                None => ty,
            });
        }
        Ok(element.unwrap_or(ResolvedType::Any))
    }
}

impl ScalarFunction for ArrayConstructor {
    fn name(&self) -> &'static str {
        "array"
    }

    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        Ok(ResolvedType::array(Self::element_type(schema, arguments)?))
    }

    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        let element = Self::element_type(input.schema(), arguments)?;
        let output = ResolvedType::array(element.clone());
        if arguments.is_empty() {
            let empty = Value::Array(ValueVector::empty(element));
            return Ok(ValueVector::literal(empty, output, input.row_count())?);
        }
        let vectors = eval_arguments(ctx, input, arguments)?;
        map_rows(ctx, input.row_count(), &vectors, &output, |values| {
            Ok(Value::Array(ValueVector::from_values(
                element.clone(),
                values.to_vec(),
            )?))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn input() -> TupleVector {
        TupleVector::of(
            Schema::of([("n", ResolvedType::Int)]),
            vec![ValueVector::from_values(ResolvedType::Int, vec![Value::Int(1), Value::Int(2)])
                .expect("ints")],
        )
        .expect("tuple")
    }

    #[test]
    fn object_rows_share_one_tuple() {
        let ctx = ExecutionContext::default();
        let expr = Expression::call(
            Arc::new(ObjectConstructor),
            vec![
                Expression::literal("id"),
                Expression::column("n"),
                Expression::literal("tag"),
                Expression::literal("x"),
            ],
        );
        let out = expr.eval(&input(), &ctx).expect("object");
        let second = out.get_object(1).expect("object row");
        assert_eq!(second.get("id"), Some(Value::Int(2)));
        assert_eq!(second.get("tag"), Some(Value::from("x")));
    }

    #[test]
    fn odd_argument_count_is_rejected() {
        let args = [Expression::literal("id")];
        assert!(matches!(
            ObjectConstructor.return_type(&Schema::EMPTY, &args),
            Err(FunctionError::Argument(_))
        ));
    }

    #[test]
    fn non_literal_key_is_rejected() {
        let args = [Expression::column("n"), Expression::column("n")];
        assert!(matches!(
            ObjectConstructor.return_type(&input().schema().clone(), &args),
            Err(FunctionError::Argument(msg)) if msg.contains("string literals")
        ));
    }

    #[test]
    fn array_widens_to_common_type() {
        let ctx = ExecutionContext::default();
        let expr = Expression::call(
            Arc::new(ArrayConstructor),
            vec![Expression::column("n"), Expression::literal(Value::Double(0.5))],
        );
        let out = expr.eval(&input(), &ctx).expect("array");
        assert_eq!(out.ty(), &ResolvedType::array(ResolvedType::Double));
        let first = out.get_array(0).expect("array row");
        assert_eq!(first.get_double(0), 1.0);
        assert_eq!(first.get_double(1), 0.5);
    }
}
