//! Streaming NDJSON writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use vecq_core::prelude::*;

use crate::error::Result;

/// Writes one JSON object per row, keys in schema order.
pub struct JsonlWriter<W: Write> {
    writer: BufWriter<W>,
    rows_written: u64,
}

impl JsonlWriter<File> {
    pub fn to_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::to_writer(File::create(path)?))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn to_writer(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            rows_written: 0,
        }
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Write every row of `batch` and flush.
    pub fn write_batch(&mut self, batch: &TupleVector) -> Result<()> {
        for row in batch.rows() {
            serde_json::to_writer(&mut self.writer, &row.to_json())?;
            self.writer.write_all(b"\n")?;
            self.rows_written += 1;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| e.into_error().into())
    }
}
