//! `sum` and `avg`: both fold a running sum and non-null count per group.

use vecq_core::prelude::*;

use super::{
    build_results, element_type, ensure_groups, eval_per_array, require_numeric, single_argument,
};
use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;
use crate::function::{check_groups, AggregateMode, Aggregator, ScalarFunction};
use crate::numeric::SumState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finish {
    Sum,
    Average,
}

impl Finish {
    fn name(self) -> &'static str {
        match self {
            Finish::Sum => "sum",
            Finish::Average => "avg",
        }
    }

    fn value(self, state: &SumState) -> Result<Value> {
        match self {
            Finish::Sum => Ok(state.sum_value()),
            Finish::Average => state.average_value(),
        }
    }

    fn scalar_type(self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        let name = self.name();
        let element = element_type(name, &single_argument(name, arguments)?.ty(schema)?)?;
        require_numeric(name, &element)?;
        Ok(element)
    }

    fn aggregate_type(self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
        let name = self.name();
        let ty = single_argument(name, arguments)?.ty(schema)?;
        require_numeric(name, &ty)?;
        Ok(ty)
    }

    fn eval_scalar(
        self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        arguments: &[Expression],
    ) -> Result<ValueVector> {
        let name = self.name();
        let output = self.scalar_type(input.schema(), arguments)?;
        eval_per_array(name, ctx, input, &arguments[0], &output, |array| {
            let mut state = SumState::default();
            state.add_rows(name, array, 0..array.size())?;
            self.value(&state)
        })
    }

    fn create_aggregator(
        self,
        mode: AggregateMode,
        arguments: &[Expression],
    ) -> Result<Box<dyn Aggregator>> {
        let name = self.name();
        if mode == AggregateMode::Distinct {
            return Err(FunctionError::Unsupported(format!(
                "DISTINCT is not supported by {name}"
            )));
        }
        let argument = single_argument(name, arguments)?.clone();
        Ok(Box::new(SumAggregator {
            finish: self,
            argument,
            output: None,
            states: Vec::new(),
        }))
    }
}

struct SumAggregator {
    finish: Finish,
    argument: Expression,
    output: Option<ResolvedType>,
    states: Vec<SumState>,
}

impl Aggregator for SumAggregator {
    fn append_group(
        &mut self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        group_rows: &ValueVector,
        groups: &GroupIndices,
    ) -> Result<()> {
        let name = self.finish.name();
        check_groups(name, group_rows, groups)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(function = name, groups = groups.group_count(), "append_group");

        if self.output.is_none() {
            self.output = Some(self.finish.aggregate_type(
                input.schema(),
                std::slice::from_ref(&self.argument),
            )?);
        }
        let values = self.argument.eval(input, ctx)?;
        ensure_groups(&mut self.states, groups.group_count());
        for (g, rows) in groups.iter().enumerate() {
            let rows = rows.iter().map(|&r| r as usize);
            self.states[g].add_rows(name, &values, rows)?;
        }
        Ok(())
    }

    fn combine(self: Box<Self>, ctx: &ExecutionContext) -> Result<ValueVector> {
        let output = self.output.clone().unwrap_or(ResolvedType::Any);
        let results = self
            .states
            .iter()
            .map(|state| self.finish.value(state))
            .collect::<Result<Vec<_>>>()?;
        build_results(ctx, &output, results)
    }
}

macro_rules! sum_like {
    ($name:ident, $finish:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl ScalarFunction for $name {
            fn name(&self) -> &'static str {
                $finish.name()
            }

            fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType> {
                $finish.scalar_type(schema, arguments)
            }

            fn eval_scalar(
                &self,
                ctx: &ExecutionContext,
                input: &TupleVector,
                _catalog_alias: Option<&str>,
                arguments: &[Expression],
            ) -> Result<ValueVector> {
                $finish.eval_scalar(ctx, input, arguments)
            }

            fn create_aggregator(
                &self,
                mode: AggregateMode,
                _catalog_alias: Option<&str>,
                arguments: &[Expression],
            ) -> Result<Box<dyn Aggregator>> {
                $finish.create_aggregator(mode, arguments)
            }

            fn aggregate_type(
                &self,
                schema: &Schema,
                arguments: &[Expression],
            ) -> Result<ResolvedType> {
                $finish.aggregate_type(schema, arguments)
            }
        }
    };
}

sum_like!(
    Sum,
    Finish::Sum,
    "Sum of non-null values; null for a group with no values. Int and Long sums fail on overflow."
);
sum_like!(
    Avg,
    Finish::Average,
    "Average of non-null values in the promoted representation of their sum."
);
