//! Binary comparison predicates. Numbers compare after widening; a null
//! operand makes the result null.

use std::cmp::Ordering;

use vecq_core::prelude::*;

use super::{eval_arguments, map_rows};
use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::{expect_arity, ScalarFunction};

fn comparable(function: &str, a: &ResolvedType, b: &ResolvedType) -> Result<()> {
    let ok = a == b
        || *a == ResolvedType::Any
        || *b == ResolvedType::Any
        || (a.is_numeric() && b.is_numeric());
    if ok {
        Ok(())
    } else {
        Err(FunctionError::Type(format!(
            "{function} cannot compare {a} with {b}"
        )))
    }
}

fn eval_comparison(
    function: &'static str,
    accept: fn(Ordering) -> bool,
    ctx: &ExecutionContext,
    input: &TupleVector,
    arguments: &[Expression],
) -> Result<ValueVector> {
    expect_arity(function, arguments, 2)?;
    let schema = input.schema();
    comparable(function, &arguments[0].ty(schema)?, &arguments[1].ty(schema)?)?;
    let vectors = eval_arguments(ctx, input, arguments)?;
    map_rows(ctx, input.row_count(), &vectors, &ResolvedType::Boolean, |values| {
        let (a, b) = (&values[0], &values[1]);
        if a.is_null() || b.is_null() {
            return Ok(Value::Null);
        }
        Ok(Value::Boolean(accept(a.compare(b))))
    })
}

macro_rules! comparison {
    ($name:ident, $fn_name:literal, $accept:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl ScalarFunction for $name {
            fn name(&self) -> &'static str {
                $fn_name
            }

            fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
                expect_arity($fn_name, arguments, 2)?;
                comparable($fn_name, &arguments[0].ty(schema)?, &arguments[1].ty(schema)?)?;
                Ok(ResolvedType::Boolean)
            }

            fn eval_scalar(
                &self,
                ctx: &ExecutionContext,
                input: &TupleVector,
                _catalog_alias: Option<&str>,
                arguments: &[Expression],
            ) -> Result<ValueVector> {
                eval_comparison($fn_name, $accept, ctx, input, arguments)
            }
        }
    };
}

comparison!(Equals, "equals", Ordering::is_eq);
comparison!(NotEquals, "not_equals", Ordering::is_ne);
comparison!(LessThan, "less_than", Ordering::is_lt);
comparison!(LessThanOrEqual, "less_than_or_equal", Ordering::is_le);
comparison!(GreaterThan, "greater_than", Ordering::is_gt);
comparison!(GreaterThanOrEqual, "greater_than_or_equal", Ordering::is_ge);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn mixed_width_numbers_compare_by_value() {
        let ctx = ExecutionContext::default();
        let input = TupleVector::of(
            Schema::of([("x", ResolvedType::Int)]),
            vec![ValueVector::from_values(
                ResolvedType::Int,
                vec![Value::Int(1), Value::Int(3), Value::Null],
            )
            .expect("ints")],
        )
        .expect("tuple");
        let expr = Expression::call(
            Arc::new(GreaterThan),
            vec![Expression::column("x"), Expression::literal(Value::Double(2.0))],
        );
        let out = expr.eval(&input, &ctx).expect("compare");
        assert_eq!(out.ty(), &ResolvedType::Boolean);
        assert!(!out.get_boolean(0));
        assert!(out.get_boolean(1));
        assert!(out.is_null(2));
    }

    #[test]
    fn strings_do_not_compare_with_numbers() {
        let schema = Schema::of([("s", ResolvedType::String)]);
        let args = [Expression::column("s"), Expression::literal(Value::Int(1))];
        assert!(matches!(
            Equals.return_type(&schema, &args),
            Err(FunctionError::Type(_))
        ));
    }
}
