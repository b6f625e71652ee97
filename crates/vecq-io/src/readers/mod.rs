//! Streaming readers that produce `TupleVector` batches.

pub mod csv;
pub mod jsonl;
