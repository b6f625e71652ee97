//! Numeric binary operators and negation.
//!
//! The static result type is the wider operand type (`Any` if either operand
//! is `Any`). Null in either operand gives null.

use vecq_core::prelude::*;

use super::{eval_arguments, map_rows};
use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::{expect_arity, ScalarFunction};
use crate::numeric::{binary_type, BinaryOp, Numeric};

fn eval_binary(
    function: &'static str,
    op: BinaryOp,
    ctx: &ExecutionContext,
    input: &TupleVector,
    arguments: &[Expression],
) -> Result<ValueVector> {
    expect_arity(function, arguments, 2)?;
    let schema = input.schema();
    let output = binary_type(
        function,
        &arguments[0].ty(schema)?,
        &arguments[1].ty(schema)?,
    )?;
    let vectors = eval_arguments(ctx, input, arguments)?;
    map_rows(ctx, input.row_count(), &vectors, &output, |values| {
        let (Some(a), Some(b)) = (
            Numeric::require(function, &values[0])?,
            Numeric::require(function, &values[1])?,
        ) else {
            return Ok(Value::Null);
        };
        Ok(a.apply(op, b)?.into_value())
    })
}

macro_rules! binary_operator {
    ($name:ident, $fn_name:literal, $op:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl ScalarFunction for $name {
            fn name(&self) -> &'static str {
                $fn_name
            }

            fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
                expect_arity($fn_name, arguments, 2)?;
                binary_type($fn_name, &arguments[0].ty(schema)?, &arguments[1].ty(schema)?)
            }

            fn eval_scalar(
                &self,
                ctx: &ExecutionContext,
                input: &TupleVector,
                _catalog_alias: Option<&str>,
                arguments: &[Expression],
            ) -> Result<ValueVector> {
                eval_binary($fn_name, $op, ctx, input, arguments)
            }
        }
    };
}

binary_operator!(Add, "add", BinaryOp::Add);
binary_operator!(Subtract, "subtract", BinaryOp::Subtract);
binary_operator!(Multiply, "multiply", BinaryOp::Multiply);
binary_operator!(Divide, "divide", BinaryOp::Divide);

#[derive(Debug, Default, Clone, Copy)]
pub struct Negate;

impl ScalarFunction for Negate {
    fn name(&self) -> &'static str {
        "negate"
    }

    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        expect_arity("negate", arguments, 1)?;
        let ty = arguments[0].ty(schema)?;
        if ty.is_numeric() || ty == ResolvedType::Any {
            Ok(ty)
        } else {
            Err(FunctionError::Type(format!(
                "negate expects a numeric argument, got {ty}"
            )))
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
            match Numeric::require("negate", &values[0])? {
                Some(n) => Ok(n.checked_neg()?.into_value()),
                None => Ok(Value::Null),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn input() -> TupleVector {
        TupleVector::of(
            Schema::of([("a", ResolvedType::Int), ("b", ResolvedType::Long)]),
            vec![
                ValueVector::from_values(
                    ResolvedType::Int,
                    vec![Value::Int(1), Value::Null, Value::Int(i32::MAX)],
                )
                .expect("ints"),
                ValueVector::from_values(
                    ResolvedType::Long,
                    vec![Value::Long(10), Value::Long(20), Value::Long(1)],
                )
                .expect("longs"),
            ],
        )
        .expect("tuple")
    }

    #[test]
    fn int_plus_long_widens_and_propagates_null() {
        let ctx = ExecutionContext::default();
        let expr = Expression::call(
            Arc::new(Add),
            vec![Expression::column("a"), Expression::column("b")],
        );
        let out = expr.eval(&input(), &ctx).expect("add");
        assert_eq!(out.ty(), &ResolvedType::Long);
        assert_eq!(out.get_long(0), 11);
        assert!(out.is_null(1));
        assert_eq!(out.get_long(2), i64::from(i32::MAX) + 1);
    }

    #[test]
    fn int_overflow_is_an_error() {
        let ctx = ExecutionContext::default();
        let expr = Expression::call(
            Arc::new(Multiply),
            vec![Expression::column("a"), Expression::literal(Value::Int(2))],
        );
        let err = expr.eval(&input(), &ctx).unwrap_err();
        assert!(matches!(err, FunctionError::Arithmetic(_)));
    }

    #[test]
    fn literal_operands_stay_literal() {
        let ctx = ExecutionContext::default();
        let expr = Expression::call(
            Arc::new(Subtract),
            vec![
                Expression::literal(Value::Double(2.5)),
                Expression::literal(Value::Int(1)),
            ],
        );
        let out = expr.eval(&input(), &ctx).expect("subtract");
        assert!(out.is_literal());
        assert_eq!(out.size(), 3);
        assert_eq!(out.get_double(2), 1.5);
    }

    #[test]
    fn integer_division_by_zero_fails() {
        let ctx = ExecutionContext::default();
        let expr = Expression::call(
            Arc::new(Divide),
            vec![Expression::column("b"), Expression::literal(Value::Long(0))],
        );
        assert!(matches!(
            expr.eval(&input(), &ctx),
            Err(FunctionError::Arithmetic(_))
        ));
    }
}
