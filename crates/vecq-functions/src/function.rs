//! Function protocol: scalar evaluation and grouped aggregation.
//!
//! Invariants:
//! - `eval_scalar` returns one row per input row and does not mutate its input.
//! - An `Aggregator` folds any number of `append_group` calls into per-group
//!   state keyed by group ordinal; ordinal `g` names the same group in every
//!   call. `combine` consumes the aggregator, so it runs exactly once.

use vecq_core::prelude::*;

use crate::context::ExecutionContext;
use crate::error::{FunctionError, Result};
use crate::expression::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateMode {
    All,
    Distinct,
}

pub trait ScalarFunction: Send + Sync {
    /// Lower-case name used for registry lookup and diagnostics.
    fn name(&self) -> &'static str;

    /// Static result type in scalar mode.
    fn return_type(&self, schema: &Schema, arguments: &[Expression]) -> Result<ResolvedType>;

    fn eval_scalar(
        &self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        catalog_alias: Option<&str>,
        arguments: &[Expression],
    ) -> Result<ValueVector>;

    /// Stateful accumulator for grouped evaluation. Fails for functions that
    /// are not aggregates, and for modes the aggregate does not define.
    fn create_aggregator(
        &self,
        _mode: AggregateMode,
        _catalog_alias: Option<&str>,
        _arguments: &[Expression],
    ) -> Result<Box<dyn Aggregator>> {
        Err(FunctionError::Unsupported(format!(
            "{} is not an aggregate function",
            self.name()
        )))
    }

    /// Static result type in aggregate mode.
    fn aggregate_type(&self, _schema: &Schema, _arguments: &[Expression]) -> Result<ResolvedType> {
        Err(FunctionError::Unsupported(format!(
            "{} is not an aggregate function",
            self.name()
        )))
    }
}

pub trait Aggregator: Send {
    /// Fold one input batch into the running per-group state.
    ///
    /// `group_rows[g]` is the base row of group `g` in `input`, and
    /// `groups.group(g)` lists every row of `input` belonging to group `g`.
    fn append_group(
        &mut self,
        ctx: &ExecutionContext,
        input: &TupleVector,
        group_rows: &ValueVector,
        groups: &GroupIndices,
    ) -> Result<()>;

    /// One result row per group ordinal seen.
    fn combine(self: Box<Self>, ctx: &ExecutionContext) -> Result<ValueVector>;
}

/// Exactly `n` arguments, or an `Argument` error naming the function.
pub fn expect_arity(function: &str, arguments: &[Expression], n: usize) -> Result<()> {
    if arguments.len() != n {
        return Err(FunctionError::Argument(format!(
            "{function} expects {n} argument(s), got {}",
            arguments.len()
        )));
    }
    Ok(())
}

/// `group_rows` must hold one base row per group.
pub(crate) fn check_groups(
    function: &str,
    group_rows: &ValueVector,
    groups: &GroupIndices,
) -> Result<()> {
    if group_rows.size() != groups.group_count() {
        return Err(FunctionError::Argument(format!(
            "{function}: {} group base rows for {} groups",
            group_rows.size(),
            groups.group_count()
        )));
    }
    Ok(())
}
