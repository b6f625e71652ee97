#![forbid(unsafe_code)]
//! vecq-core: the columnar data model shared by every other crate.
//!
//! Pure data; no allocator, builder or function logic lives here. Builders in
//! `vecq-vector` produce the immutable `ValueVector`/`TupleVector` values defined
//! in this crate, and `vecq-functions` consumes them.

pub mod bitset;
pub mod config;
pub mod error;
pub mod group;
pub mod prelude;
pub mod schema;
pub mod tuple;
pub mod value;
pub mod vector;

pub use bitset::BitSet;
pub use error::{Error, Result};
pub use group::GroupIndices;
pub use schema::{Column, ResolvedType, Schema, StorageKind};
pub use tuple::TupleVector;
pub use value::{ObjectValue, OutputWritable, Value};
pub use vector::{BufferVector, ColumnData, LiteralVector, ValueVector};
