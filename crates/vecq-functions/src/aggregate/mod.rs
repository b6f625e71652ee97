//! Aggregate functions.
//!
//! Each aggregate also has a scalar mode that folds an Array argument per row,
//! e.g. `sum(array_column)`.

pub mod count;
pub mod min_max;
pub mod sum;

pub use count::Count;
pub use min_max::{Max, Min};
pub use sum::{Avg, Sum};

use vecq_core::prelude::*;

use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;

pub(crate) fn single_argument<'a>(
    function: &str,
    arguments: &'a [Expression],
) -> Result<&'a Expression> {
    match arguments {
        [argument] => Ok(argument),
        _ => Err(FunctionError::Argument(format!(
            "{function} expects 1 argument, got {}",
            arguments.len()
        ))),
    }
}

/// Grow per-group state so that ordinals `0..group_count` exist.
pub(crate) fn ensure_groups<T: Default>(states: &mut Vec<T>, group_count: usize) {
    if states.len() < group_count {
        states.resize_with(group_count, T::default);
    }
}

/// Element type of an Array argument in scalar mode.
pub(crate) fn element_type(function: &str, ty: &ResolvedType) -> Result<ResolvedType> {
    match ty {
        ResolvedType::Array(element) => Ok((**element).clone()),
        ResolvedType::Any => Ok(ResolvedType::Any),
        other => Err(FunctionError::Type(format!(
            "{function} in scalar mode expects an array argument, got {other}"
        ))),
    }
}

pub(crate) fn require_numeric(function: &str, ty: &ResolvedType) -> Result<()> {
    if ty.is_numeric() || *ty == ResolvedType::Any {
        Ok(())
    } else {
        Err(FunctionError::Type(format!(
            "{function} expects a numeric argument, got {ty}"
        )))
    }
}

/// Scalar-mode driver: evaluate `argument` and fold each row's array with `fold`.
/// Null rows give null; a literal column is folded once.
pub(crate) fn eval_per_array<F>(
    function: &str,
    ctx: &ExecutionContext,
    input: &TupleVector,
    argument: &Expression,
    output: &ResolvedType,
    mut fold: F,
) -> Result<ValueVector>
where
    F: FnMut(&ValueVector) -> Result<Value>,
{
    let arrays = argument.eval(input, ctx)?;
    let as_array = |value: Value| match value {
        Value::Array(array) => Ok(array),
        other => Err(FunctionError::Type(format!(
            "{function} in scalar mode expects arrays, got {other}"
        ))),
    };
    if let Some(value) = arrays.literal_value() {
        if value.is_null() {
            return Ok(ValueVector::literal_null(output.clone(), arrays.size()));
        }
        let folded = fold(&as_array(value.clone())?)?;
        let mut builder = ctx.factory().builder(output);
        builder.put_any(folded)?;
        let single = builder.build()?;
        return Ok(match single.literal_value() {
            Some(v) => ValueVector::literal(v.clone(), output.clone(), arrays.size())?,
            None => single,
        });
    }
    let mut builder = ctx.factory().builder(output);
    for row in 0..arrays.size() {
        if arrays.is_null(row) {
            builder.put_null();
            continue;
        }
        let array = as_array(arrays.get_any(row))?;
        builder.put_any(fold(&array)?)?;
    }
    Ok(builder.build()?)
}

/// Collect per-group results into one vector of type `output`.
pub(crate) fn build_results(
    ctx: &ExecutionContext,
    output: &ResolvedType,
    results: impl IntoIterator<Item = Value>,
) -> Result<ValueVector> {
    let mut builder = ctx.factory().builder(output);
    for value in results {
        builder.put_any(value)?;
    }
    Ok(builder.build()?)
}
