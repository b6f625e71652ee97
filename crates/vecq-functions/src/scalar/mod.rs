//! Scalar function library.
//!
//! Every function here evaluates its arguments to vectors and then maps rows
//! through `map_rows`. When all argument vectors are literals the row function
//! runs once and the result is broadcast as a literal.

pub mod arithmetic;
pub mod comparison;
pub mod json;
pub mod lambda;
pub mod string;
pub mod structural;

pub use arithmetic::{Add, Divide, Multiply, Negate, Subtract};
pub use comparison::{
    Equals, GreaterThan, GreaterThanOrEqual, LessThan, LessThanOrEqual, NotEquals,
};
pub use json::JsonValue;
pub use lambda::{AnyMatch, Filter, Map};
pub use string::{Concat, Length, Lower, Trim, Upper};
pub use structural::{ArrayConstructor, ObjectConstructor};

use vecq_core::prelude::*;

use crate::context::ExecutionContext;
use crate::error::Result;
use crate::expression::Expression;

pub(crate) fn eval_arguments(
    ctx: &ExecutionContext,
    input: &TupleVector,
    arguments: &[Expression],
) -> Result<Vec<ValueVector>> {
    arguments.iter().map(|arg| arg.eval(input, ctx)).collect()
}

/// Apply `f` to the boxed argument values of every row.
pub(crate) fn map_rows<F>(
    ctx: &ExecutionContext,
    row_count: usize,
    vectors: &[ValueVector],
    output: &ResolvedType,
    mut f: F,
) -> Result<ValueVector>
where
    F: FnMut(&[Value]) -> Result<Value>,
{
    if !vectors.is_empty() && vectors.iter().all(ValueVector::is_literal) {
        let values: Vec<Value> = vectors
            .iter()
            .map(|v| v.literal_value().cloned().unwrap_or_default())
            .collect();
        return broadcast(ctx, f(&values)?, output, row_count);
    }
    let mut builder = ctx.factory().builder(output);
    let mut row_values = Vec::with_capacity(vectors.len());
    for row in 0..row_count {
        row_values.clear();
        row_values.extend(vectors.iter().map(|v| v.get_any(row)));
        builder.put_any(f(&row_values)?)?;
    }
    Ok(builder.build()?)
}

/// Literal of `size` rows holding `value` converted to `output`.
pub(crate) fn broadcast(
    ctx: &ExecutionContext,
    value: Value,
    output: &ResolvedType,
    size: usize,
) -> Result<ValueVector> {
    let mut builder = ctx.factory().builder(output);
    builder.put_any(value)?;
    let single = builder.build()?;
    let value = single.get_any(0);
    Ok(ValueVector::literal(value, output.clone(), size)?)
}
