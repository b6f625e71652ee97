#![forbid(unsafe_code)]
//! vecq-vector: builders that produce the immutable vectors of `vecq-core`.
//!
//! - `builder`: append-only typed builders with literal collapse.
//! - `mutable`: positional, null-aware mutable vectors.
//! - `tuple_builder`: union-schema accumulation of tuple batches.
//! - `factory`: builder selection by type plus take/filter helpers.
//!
//! All storage is drawn from a `vecq_mem::BufferAllocator` passed in by the
//! caller.

pub mod builder;
pub mod factory;
pub mod filter;
pub mod mutable;
pub mod slots;
pub mod tuple_builder;

pub use builder::{
    BooleanVectorBuilder, DecimalVectorBuilder, DoubleVectorBuilder, FloatVectorBuilder,
    IntVectorBuilder, LongVectorBuilder, ObjectVectorBuilder, TypedBuilder, ValueVectorBuilder,
};
pub use factory::VectorFactory;
pub use filter::RowFilter;
pub use mutable::MutableValueVector;
pub use tuple_builder::TupleVectorBuilder;
