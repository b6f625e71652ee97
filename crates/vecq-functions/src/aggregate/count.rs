//! `count(x)`, `count(*)` and `count(DISTINCT x)`.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use vecq_core::prelude::*;

use super::{build_results, element_type, ensure_groups, eval_per_array, single_argument};
use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::{check_groups, AggregateMode, Aggregator, ScalarFunction};

/// Distinct-set key. Values order by `Value::compare`; nested values, which
/// compare by kind only, are told apart by their JSON rendering.
#[derive(Debug, Clone)]
struct DistinctKey(Value);

impl Ord for DistinctKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.compare(&other.0).then_with(|| {
            if is_nested(&self.0) || is_nested(&other.0) {
                self.0.to_json().to_string().cmp(&other.0.to_json().to_string())
            } else {
                Ordering::Equal
            }
        })
    }
}

impl PartialOrd for DistinctKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DistinctKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DistinctKey {}

fn is_nested(value: &Value) -> bool {
    matches!(
        value,
        Value::Array(_) | Value::Table(_) | Value::Object(_) | Value::Writable(_)
    )
}

#[derive(Default)]
struct CountState {
    count: u64,
    seen: BTreeSet<DistinctKey>,
}

struct CountAggregator {
    /// `None` counts rows (`count(*)`).
    argument: Option<Expression>,
    distinct: bool,
    states: Vec<CountState>,
}

impl Aggregator for CountAggregator {
    fn append_group(
        &mut self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        group_rows: &ValueVector,
        groups: &GroupIndices,
    ) -> Result<()> {
        check_groups("count", group_rows, groups)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            function = "count",
            distinct = self.distinct,
            groups = groups.group_count(),
            "append_group"
        );
        ensure_groups(&mut self.states, groups.group_count());
        let Some(argument) = &self.argument else {
            for (g, rows) in groups.iter().enumerate() {
                self.states[g].count += rows.len() as u64;
            }
            return Ok(());
        };
        let values = argument.eval(input, ctx)?;
        for (g, rows) in groups.iter().enumerate() {
            let state = &mut self.states[g];
            if self.distinct {
                for &row in rows {
                    let value = values.get_any(row as usize);
                    if !value.is_null() {
                        state.seen.insert(DistinctKey(value));
                    }
                }
            } else if values.is_literal() {
                if !values.has_nulls() {
                    state.count += rows.len() as u64;
                }
            } else {
                state.count += rows.iter().filter(|&&r| !values.is_null(r as usize)).count() as u64;
            }
        }
        Ok(())
    }

    fn combine(self: Box<Self>, ctx: &ExecutionContext) -> Result<ValueVector> {
        let distinct = self.distinct;
        let counts = self.states.into_iter().map(|state| {
            let n = if distinct {
                state.seen.len() as u64
            } else {
                state.count
            };
            Value::Long(n as i64)
        });
        build_results(ctx, &ResolvedType::Long, counts)
    }
}

/// Number of non-null values (or rows, for `*`) per group; zero for an empty group.
#[derive(Debug, Default, Clone, Copy)]
pub struct Count;

impl ScalarFunction for Count {
    fn name(&self) -> &'static str {
        "count"
    }

    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        let argument = single_argument("count", arguments)?;
        if matches!(argument, Expression::Asterisk) {
            return Err(FunctionError::Unsupported(
                "count(*) is only defined in aggregate mode".into(),
            ));
        }
        element_type("count", &argument.ty(schema)?)?;
        Ok(ResolvedType::Long)
    }

    /// Non-null elements of each row's array.
    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        let output = self.return_type(input.schema(), arguments)?;
        eval_per_array("count", ctx, input, &arguments[0], &output, |array| {
            let n = if array.is_literal() {
                if array.has_nulls() {
                    0
                } else {
                    array.size()
                }
            } else {
                (0..array.size()).filter(|&r| !array.is_null(r)).count()
            };
            Ok(Value::Long(n as i64))
        })
    }

    fn create_aggregator(
        &self,
        mode: AggregateMode,
        _catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<Box<dyn Aggregator>> {
        let argument = match single_argument("count", arguments)? {
            Expression::Asterisk if mode == AggregateMode::Distinct => {
                return Err(FunctionError::Argument(
                    "count(DISTINCT *) is not a valid aggregate".into(),
                ))
            }
            Expression::Asterisk => None,
            other => Some(other.clone()),
        };
        Ok(Box::new(CountAggregator {
            argument,
            distinct: mode == AggregateMode::Distinct,
            states: Vec::new(),
        }))
    }

    fn aggregate_type(&self, _schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        single_argument("count", arguments)?;
        Ok(ResolvedType::Long)
    }
}
