//! Accumulates tuple-vector batches under a growing union schema.
//!
//! Columns are matched by name. A column first seen in a later batch is added
//! after every known column and is null for all earlier rows; a known column
//! missing from a batch is null for that batch's rows. When a batch carries a
//! known name with another type, the column is promoted to the common type.

use vecq_core::prelude::*;
use vecq_mem::BufferAllocator;

use crate::factory::VectorFactory;
use crate::filter::RowFilter;
use crate::mutable::MutableValueVector;

pub struct TupleVectorBuilder {
    allocator: BufferAllocator,
    columns: Vec<(String, MutableValueVector)>,
    row_count: usize,
}

impl TupleVectorBuilder {
    pub fn new(allocator: &BufferAllocator) -> Self {
        Self {
            allocator: allocator.clone(),
            columns: Vec::new(),
            row_count: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Union schema seen so far.
    pub fn schema(&self) -> Schema {
        self.columns
            .iter()
            .map(|(name, column)| Column::new(name.clone(), column.ty().clone()))
            .collect()
    }

    /// Append every row of `tuple`.
    pub fn append(&mut self, tuple: &TupleVector) -> Result<()> {
        let rows: Vec<usize> = (0..tuple.row_count()).collect();
        self.append_rows(tuple, &rows)
    }

    /// Append the rows of `tuple` selected by `filter`. The filter must cover
    /// exactly the tuple's rows; on mismatch nothing is appended.
    pub fn append_filtered(&mut self, tuple: &TupleVector, filter: RowFilter<'_>) -> Result<()> {
        filter.check_size(tuple.row_count())?;
        self.append_rows(tuple, &filter.selected())
    }

    /// Populate join: append matched `outer` rows, each carrying its matching
    /// `inner` rows as a nested table under `column_name`.
    ///
    /// `filter` is a row-major `outer × inner` match mask: entry
    /// `o * inner_rows + i` selects inner row `i` for outer row `o`. Outer rows
    /// with no selected inner row are not appended.
    pub fn append_populate(
        &mut self,
        outer: &TupleVector,
        inner: &TupleVector,
        filter: RowFilter<'_>,
        column_name: &str,
    ) -> Result<()> {
        let inner_rows = inner.row_count();
        let expected = outer.row_count().checked_mul(inner_rows).ok_or_else(|| {
            Error::illegal_argument("populate filter size overflows outer × inner row count")
        })?;
        filter.check_size(expected)?;

        let factory = VectorFactory::new(self.allocator.clone());
        let mut matched = Vec::new();
        let mut nested = Vec::new();
        for o in 0..outer.row_count() {
            let start = o * inner_rows;
            let selected: Vec<usize> = filter
                .selected_in(start, start + inner_rows)
                .into_iter()
                .map(|i| i - start)
                .collect();
            if selected.is_empty() {
                continue;
            }
            matched.push(o);
            nested.push(Value::Table(factory.take_tuple(inner, &selected)?));
        }

        let outer = factory.take_tuple(outer, &matched)?;
        let table_type = ResolvedType::Table(inner.schema().clone());
        let populated = ValueVector::from_buffer(table_type.clone(), ColumnData::Object(nested), None)?;

        let mut schema = outer.schema().clone();
        schema.columns.push(Column::new(column_name, table_type));
        let mut columns = outer.into_columns();
        columns.push(populated);
        let batch = TupleVector::of(schema, columns)?;
        self.append(&batch)
    }

    /// All or nothing: when any column rejects a value, rows already written
    /// for this batch are cleared and columns it introduced are dropped.
    fn append_rows(&mut self, tuple: &TupleVector, rows: &[usize]) -> Result<()> {
        let known = self.columns.len();
        if let Err(err) = self.write_rows(tuple, rows) {
            self.columns.truncate(known);
            let base = self.row_count;
            for (_, column) in &mut self.columns {
                column.truncate(base);
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %err, "tuple batch rejected");
            return Err(err);
        }
        self.row_count += rows.len();
        #[cfg(feature = "tracing")]
        tracing::trace!(rows = rows.len(), total = self.row_count, "tuple batch appended");
        Ok(())
    }

    fn write_rows(&mut self, tuple: &TupleVector, rows: &[usize]) -> Result<()> {
        let base = self.row_count;
        let mut used = vec![false; self.columns.len()];
        for (column, source) in tuple.schema().iter().zip(tuple.columns()) {
            let idx = self.resolve_column(column, &mut used)?;
            let target = &mut self.columns[idx].1;
            for (k, &row) in rows.iter().enumerate() {
                target.copy(base + k, source, row)?;
            }
        }
        Ok(())
    }

    /// Index of the union column receiving `column`, adding or promoting it as
    /// needed. `used` marks union columns already fed by this batch so that
    /// duplicate names in one batch map to successive union columns.
    fn resolve_column(&mut self, column: &Column, used: &mut Vec<bool>) -> Result<usize> {
        let existing = self
            .columns
            .iter()
            .enumerate()
            .position(|(i, (name, _))| {
                *name == column.name && !used.get(i).copied().unwrap_or(false)
            });
        let idx = match existing {
            Some(idx) => {
                let current = self.columns[idx].1.ty().clone();
                if current != column.data_type {
                    let promoted = ResolvedType::common_type(&current, &column.data_type);
                    if promoted != current {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(column = %column.name, from = %current, to = %promoted, "promoting column");
                        self.columns[idx].1.retype(promoted)?;
                    }
                }
                idx
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(column = %column.name, ty = %column.data_type, "schema gained column");
                let mut vector = MutableValueVector::new(&self.allocator, column.data_type.clone());
                vector.ensure_size(self.row_count);
                self.columns.push((column.name.clone(), vector));
                self.columns.len() - 1
            }
        };
        if used.len() <= idx {
            used.resize(idx + 1, false);
        }
        used[idx] = true;
        Ok(idx)
    }

    /// Densify every column to the total row count and freeze.
    pub fn build(self) -> Result<TupleVector> {
        let row_count = self.row_count;
        if self.columns.is_empty() {
            return Ok(TupleVector::constant(row_count));
        }
        let mut schema = Vec::with_capacity(self.columns.len());
        let mut vectors = Vec::with_capacity(self.columns.len());
        for (name, mut column) in self.columns {
            column.ensure_size(row_count);
            schema.push(Column::new(name, column.ty().clone()));
            vectors.push(column.build()?);
        }
        TupleVector::of(Schema::new(schema), vectors)
    }
}
