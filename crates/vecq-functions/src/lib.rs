#![forbid(unsafe_code)]
//! vecq-functions: the scalar/aggregate function protocol and the built-in
//! function library.
//!
//! - Functions are evaluated column-at-a-time against a `TupleVector`.
//! - Grouped aggregation addresses rows through `GroupIndices`, so one input
//!   batch can feed many groups without materializing per-group vectors.
//! - All vectors are built through the `ExecutionContext`'s allocator.

pub mod aggregate;
pub mod context;
pub mod error;
pub mod expression;
pub mod function;
pub mod numeric;
pub mod registry;
pub mod scalar;

pub use context::ExecutionContext;
pub use error::{FunctionError, Result};
pub use expression::{Expression, FunctionCall};
pub use function::{expect_arity, AggregateMode, Aggregator, ScalarFunction};
pub use numeric::{Numeric, SumState};
pub use registry::FunctionRegistry;
