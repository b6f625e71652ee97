//! NDJSON reader. Each non-blank line must hold one JSON object.
//!
//! A batch's schema is the union of the keys of its lines in first-seen order;
//! every column is Any-typed and keys absent from a line read as null.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use vecq_core::config::DEFAULT_BATCH_SIZE;
use vecq_core::prelude::*;
use vecq_functions::scalar::json::json_to_value;
use vecq_vector::VectorFactory;

use crate::error::{IoError, Result};

pub struct JsonLinesReader<R: BufRead> {
    lines: Lines<R>,
    factory: VectorFactory,
    batch_size: usize,
    line: u64,
}

impl JsonLinesReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P, factory: VectorFactory) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?), factory))
    }
}

impl<R: BufRead> JsonLinesReader<R> {
    pub fn new(reader: R, factory: VectorFactory) -> Self {
        Self {
            lines: reader.lines(),
            factory,
            batch_size: DEFAULT_BATCH_SIZE,
            line: 0,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Next batch of up to `batch_size` objects; `None` at end of input.
    pub fn next_batch(&mut self) -> Result<Option<TupleVector>> {
        let mut builder = self.factory.tuple_builder();
        while builder.row_count() < self.batch_size {
            let Some(text) = self.lines.next().transpose()? else {
                break;
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            builder.append(&self.parse_line(&text)?)?;
        }
        if builder.row_count() == 0 {
            return Ok(None);
        }
        let batch = builder.build()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            rows = batch.row_count(),
            columns = batch.column_count(),
            line = self.line,
            "jsonl batch"
        );
        Ok(Some(batch))
    }

    /// One-row tuple of Any columns.
    fn parse_line(&self, text: &str) -> Result<TupleVector> {
        let json: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            IoError::Data(format!("line {}: cannot parse '{text}' as JSON: {e}", self.line))
        })?;
        let serde_json::Value::Object(map) = json else {
            return Err(IoError::Data(format!(
                "line {}: expected a JSON object, got '{text}'",
                self.line
            )));
        };
        let mut columns = Vec::with_capacity(map.len());
        let mut vectors = Vec::with_capacity(map.len());
        for (key, value) in map {
            columns.push(Column::new(key, ResolvedType::Any));
            vectors.push(ValueVector::literal_any(json_to_value(value)?, 1));
        }
        if vectors.is_empty() {
            return Ok(TupleVector::constant(1));
        }
        Ok(TupleVector::of(Schema::new(columns), vectors)?)
    }
}

impl<R: BufRead> Iterator for JsonLinesReader<R> {
    type Item = Result<TupleVector>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
