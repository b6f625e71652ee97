#![forbid(unsafe_code)]
//! vecq-io: table-function adapters over external formats.
//!
//! Readers produce `TupleVector` batches through the builder API; they never
//! construct vectors directly. Batches are bounded by `batch_size` rows.

pub mod error;
pub mod readers;
pub mod writers;

pub use error::{IoError, Result};
pub use readers::csv::{CsvOptions, CsvReader};
pub use readers::jsonl::JsonLinesReader;
pub use writers::jsonl::JsonlWriter;
