#![forbid(unsafe_code)]
//! vecq-mem: query-scoped buffer allocator and growable typed buffers.
//!
//! Every backing array used by the builders in `vecq-vector` is issued here so
//! that allocation volume can be observed through `AllocatorStatistics`. One
//! allocator is created per execution scope and passed explicitly; there is no
//! global instance.

pub mod allocator;
pub mod buffer;

pub use allocator::{AllocationKind, AllocatorStatistics, BufferAllocator};
pub use buffer::{BitBuffer, ObjectBuffer, PrimitiveBuffer};
