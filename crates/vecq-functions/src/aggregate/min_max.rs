use std::cmp::Ordering;

use vecq_core::prelude::*;

use super::{build_results, element_type, ensure_groups, eval_per_array, single_argument};
use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::{check_groups, AggregateMode, Aggregator, ScalarFunction};

/// Running extremum; nulls are skipped and numbers compare after widening.
#[derive(Debug, Clone, Copy)]
struct Extremum {
    name: &'static str,
    /// Ordering a candidate must have against the current best to replace it.
    wins: Ordering,
}

impl Extremum {
    fn offer(self, best: &mut Option<Value>, candidate: Value) {
        if candidate.is_null() {
            return;
        }
        let replace = match best {
            Some(current) => candidate.compare(current) == self.wins,
            None => true,
        };
        if replace {
            *best = Some(candidate);
        }
    }

    fn fold(self, best: &mut Option<Value>, values: &ValueVector, rows: impl Iterator<Item = usize>) {
        if let Some(value) = values.literal_value() {
            if rows.take(1).count() > 0 {
                self.offer(best, value.clone());
            }
            return;
        }
        for row in rows {
            self.offer(best, values.get_any(row));
        }
    }
}

struct ExtremumAggregator {
    extremum: Extremum,
    argument: Expression,
    output: Option<ResolvedType>,
    states: Vec<Option<Value>>,
}

impl Aggregator for ExtremumAggregator {
    fn append_group(
        &mut self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        group_rows: &ValueVector,
        groups: &GroupIndices,
    ) -> Result<()> {
        check_groups(self.extremum.name, group_rows, groups)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            function = self.extremum.name,
            groups = groups.group_count(),
            "append_group"
        );
        if self.output.is_none() {
            self.output = Some(self.argument.ty(input.schema())?);
        }
        let values = self.argument.eval(input, ctx)?;
        ensure_groups(&mut self.states, groups.group_count());
        for (g, rows) in groups.iter().enumerate() {
            self.extremum
                .fold(&mut self.states[g], &values, rows.iter().map(|&r| r as usize));
        }
        Ok(())
    }

    fn combine(self: Box<Self>, ctx: &ExecutionContext) -> Result<ValueVector> {
        let output = self.output.unwrap_or(ResolvedType::Any);
        build_results(
            ctx,
            &output,
            self.states.into_iter().map(|best| best.unwrap_or(Value::Null)),
        )
    }
}

macro_rules! extremum_function {
    ($name:ident, $fn_name:literal, $wins:expr) => {
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl $name {
            const EXTREMUM: Extremum = Extremum {
                name: $fn_name,
                wins: $wins,
            };
        }

        impl ScalarFunction for $name {
            fn name(&self) -> &'static str {
                $fn_name
            }

            fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
                element_type($fn_name, &single_argument($fn_name, arguments)?.ty(schema)?)
            }

            fn eval_scalar(
                &self,
                ctx: &ExecutionContext,
                input: &TupleVector,
                _catalog_alias: Option<&str>,
                arguments: &[Expression],
            ) -> Result<ValueVector> {
                let output = self.return_type(input.schema(), arguments)?;
                eval_per_array($fn_name, ctx, input, &arguments[0], &output, |array| {
                    let mut best = None;
                    Self::EXTREMUM.fold(&mut best, array, 0..array.size());
                    Ok(best.unwrap_or(Value::Null))
                })
            }

            fn create_aggregator(
                &self,
                mode: AggregateMode,
                _catalog_alias: Option<&str>,
                arguments: &[Expression],
            ) -> Result<Box<dyn Aggregator>> {
                if mode == AggregateMode::Distinct {
                    return Err(FunctionError::Unsupported(format!(
                        "DISTINCT is not supported by {}",
                        $fn_name
                    )));
                }
                Ok(Box::new(ExtremumAggregator {
                    extremum: Self::EXTREMUM,
                    argument: single_argument($fn_name, arguments)?.clone(),
                    output: None,
                    states: Vec::new(),
                }))
            }

            fn aggregate_type(
                &self,
                schema: &Schema,
                arguments: &[Expression],
            ) -> Result<ResolvedType> {
                single_argument($fn_name, arguments)?.ty(schema)
            }
        }
    };
}

extremum_function!(Min, "min", Ordering::Less);
extremum_function!(Max, "max", Ordering::Greater);
