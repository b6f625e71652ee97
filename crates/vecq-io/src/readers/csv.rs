//! CSV reader producing `TupleVector` batches.
//!
//! Without a declared schema every column is String-typed and named by the
//! header row. With one, fields are parsed into the declared types; an empty
//! field is null for every type except String.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vecq_core::config::DEFAULT_BATCH_SIZE;
use vecq_core::prelude::*;
use vecq_core::value::parse_decimal;
use vecq_vector::{ValueVectorBuilder, VectorFactory};

use crate::error::{IoError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: u8,
    pub batch_size: usize,
    /// Declared column types, in header order.
    pub schema: Option<Schema>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            batch_size: DEFAULT_BATCH_SIZE,
            schema: None,
        }
    }
}

impl CsvOptions {
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

pub struct CsvReader<R: Read> {
    reader: csv::Reader<R>,
    schema: Schema,
    factory: VectorFactory,
    batch_size: usize,
    record: csv::StringRecord,
    /// 1-based line of the last record read, for diagnostics.
    line: u64,
}

impl CsvReader<File> {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        options: CsvOptions,
        factory: VectorFactory,
    ) -> Result<Self> {
        Self::from_reader(File::open(path)?, options, factory)
    }
}

impl<R: Read> CsvReader<R> {
    /// Read the header row and resolve the batch schema.
    pub fn from_reader(reader: R, options: CsvOptions, factory: VectorFactory) -> Result<Self> {
        if options.batch_size == 0 {
            return Err(IoError::Core(vecq_core::Error::Config(
                "batch_size must be positive".into(),
            )));
        }
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let schema = match options.schema {
            Some(schema) => {
                if schema.len() != headers.len() {
                    return Err(IoError::Data(format!(
                        "declared schema {schema} has {} columns but the header has {}",
                        schema.len(),
                        headers.len()
                    )));
                }
                if let Some(column) = schema.iter().find(|c| c.data_type.is_nested()) {
                    return Err(IoError::Data(format!(
                        "column '{}' of type {} cannot be read from CSV",
                        column.name, column.data_type
                    )));
                }
                schema
            }
            None => headers
                .iter()
                .map(|name| Column::new(name, ResolvedType::String))
                .collect(),
        };
        Ok(Self {
            reader,
            schema,
            factory,
            batch_size: options.batch_size,
            record: csv::StringRecord::new(),
            line: 1,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Next batch of up to `batch_size` rows; `None` at end of input.
    pub fn next_batch(&mut self) -> Result<Option<TupleVector>> {
        let mut builders: Vec<Box<dyn ValueVectorBuilder>> = self
            .schema
            .iter()
            .map(|c| self.factory.builder(&c.data_type))
            .collect();
        let mut rows = 0;
        while rows < self.batch_size && self.reader.read_record(&mut self.record)? {
            self.line += 1;
            for (idx, (column, builder)) in self.schema.iter().zip(&mut builders).enumerate() {
                let text = self.record.get(idx).unwrap_or("");
                builder.put_any(parse_field(text, column, self.line)?)?;
            }
            rows += 1;
        }
        if rows == 0 {
            return Ok(None);
        }
        let columns = builders
            .iter_mut()
            .map(|b| b.build())
            .collect::<vecq_core::Result<Vec<_>>>()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(rows, columns = columns.len(), line = self.line, "csv batch");
        Ok(Some(TupleVector::of(self.schema.clone(), columns)?))
    }
}

impl<R: Read> Iterator for CsvReader<R> {
    type Item = Result<TupleVector>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}

fn parse_field(text: &str, column: &Column, line: u64) -> Result<Value> {
    let ty = &column.data_type;
    if matches!(ty, ResolvedType::String | ResolvedType::Any) {
        return Ok(Value::from(text));
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    let bad = || {
        IoError::Data(format!(
            "cannot parse '{text}' as {ty} in column '{}' at line {line}",
            column.name
        ))
    };
    Ok(match ty {
        ResolvedType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => return Err(bad()),
        },
        ResolvedType::Int => Value::Int(trimmed.parse().map_err(|_| bad())?),
        ResolvedType::Long => Value::Long(trimmed.parse().map_err(|_| bad())?),
        ResolvedType::Float => Value::Float(trimmed.parse().map_err(|_| bad())?),
        ResolvedType::Double => Value::Double(trimmed.parse().map_err(|_| bad())?),
        ResolvedType::Decimal => Value::Decimal(parse_decimal(trimmed).map_err(|_| bad())?),
        ResolvedType::DateTime => Value::DateTime(trimmed.parse().map_err(|_| bad())?),
        _ => return Err(bad()),
    })
}
