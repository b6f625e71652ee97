//! Convenient re-exports for downstream crates.

pub use crate::bitset::BitSet;
pub use crate::config::{AllocatorSettings, ExecutionConfig};
pub use crate::error::{Error, Result};
pub use crate::group::GroupIndices;
pub use crate::schema::{Column, ResolvedType, Schema, StorageKind};
pub use crate::tuple::TupleVector;
pub use crate::value::{ObjectValue, OutputWritable, Value};
pub use crate::vector::{BufferVector, ColumnData, LiteralVector, ValueVector};
