//! Row-aligned collection of named columns.

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::ObjectValue;
use crate::vector::ValueVector;

/// A schema plus one `ValueVector` per column, all of the same size.
///
/// A tuple with zero columns still carries a row count, so `CONSTANT` (one
/// row, no columns) is distinct from `EMPTY` (no rows, no columns).
#[derive(Debug, Clone)]
pub struct TupleVector {
    schema: Schema,
    columns: Vec<ValueVector>,
    row_count: usize,
}

impl TupleVector {
    pub const EMPTY: TupleVector = TupleVector {
        schema: Schema::EMPTY,
        columns: Vec::new(),
        row_count: 0,
    };

    /// One row, zero columns: the input for evaluating constant expressions.
    pub const CONSTANT: TupleVector = TupleVector {
        schema: Schema::EMPTY,
        columns: Vec::new(),
        row_count: 1,
    };

    /// Pair a schema with its columns. Column count must match the schema, all
    /// columns must share one size and each declared type must accept its
    /// column's runtime type.
    pub fn of(schema: Schema, columns: Vec<ValueVector>) -> Result<Self> {
        if schema.len() != columns.len() {
            return Err(Error::schema(format!(
                "schema {schema} declares {} columns but {} were given",
                schema.len(),
                columns.len()
            )));
        }
        let row_count = columns.first().map_or(0, ValueVector::size);
        for (column, vector) in schema.iter().zip(&columns) {
            if vector.size() != row_count {
                return Err(Error::schema(format!(
                    "column '{}' has {} rows, expected {row_count}",
                    column.name,
                    vector.size()
                )));
            }
            if !column.data_type.is_assignable_from(vector.ty()) {
                return Err(Error::schema(format!(
                    "column '{}' declared {} cannot hold a {} vector",
                    column.name,
                    column.data_type,
                    vector.ty()
                )));
            }
        }
        Ok(Self {
            schema,
            columns,
            row_count,
        })
    }

    /// Zero columns, `row_count` rows.
    pub fn constant(row_count: usize) -> Self {
        Self::with_row_count(Schema::EMPTY, row_count)
    }

    /// An all-null tuple of `row_count` rows, one literal null column per field.
    pub fn with_row_count(schema: Schema, row_count: usize) -> Self {
        let columns = schema
            .iter()
            .map(|c| ValueVector::literal_null(c.data_type.clone(), row_count))
            .collect();
        Self {
            schema,
            columns,
            row_count,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[ValueVector] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<ValueVector> {
        self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&ValueVector> {
        self.columns.get(idx)
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ValueVector> {
        self.schema.index_of(name).and_then(|idx| self.column(idx))
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn row(&self, row: usize) -> Option<ObjectValue> {
        (row < self.row_count).then(|| ObjectValue::new(self.clone(), row))
    }

    pub fn rows(&self) -> impl Iterator<Item = ObjectValue> + '_ {
        (0..self.row_count).map(move |row| ObjectValue::new(self.clone(), row))
    }
}

impl Default for TupleVector {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl PartialEq for TupleVector {
    fn eq(&self, other: &Self) -> bool {
        self.row_count == other.row_count
            && self.schema == other.schema
            && self.columns == other.columns
    }
}
