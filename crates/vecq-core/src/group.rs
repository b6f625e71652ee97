//! Segmented row addressing for grouped aggregation.
//!
//! The logical shape is "a vector of int vectors": group `g` owns a list of row
//! indices into one input batch. It is stored arena-style as one flat index
//! buffer plus group boundaries, so no per-group container is materialized.

use crate::error::{Error, Result};
use crate::schema::ResolvedType;
use crate::value::Value;
use crate::vector::{ColumnData, ValueVector};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndices {
    rows: Vec<u32>,
    /// `offsets[g]..offsets[g + 1]` is group `g`'s slice of `rows`.
    offsets: Vec<usize>,
}

impl GroupIndices {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            offsets: vec![0],
        }
    }

    pub fn from_groups(groups: &[&[u32]]) -> Self {
        let mut indices = Self::new();
        for group in groups {
            indices.push_group(group.iter().copied());
        }
        indices
    }

    /// Build from raw parts; offsets must start at 0, be non-decreasing and end
    /// at `rows.len()`.
    pub fn from_parts(rows: Vec<u32>, offsets: Vec<usize>) -> Result<Self> {
        let well_formed = offsets.first() == Some(&0)
            && offsets.last() == Some(&rows.len())
            && offsets.windows(2).all(|w| w[0] <= w[1]);
        if !well_formed {
            return Err(Error::illegal_argument(format!(
                "malformed group offsets {offsets:?} for {} row indices",
                rows.len()
            )));
        }
        Ok(Self { rows, offsets })
    }

    pub fn push_group(&mut self, rows: impl IntoIterator<Item = u32>) {
        if self.offsets.is_empty() {
            self.offsets.push(0);
        }
        self.rows.extend(rows);
        self.offsets.push(self.rows.len());
    }

    pub fn group_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn group(&self, g: usize) -> &[u32] {
        match (self.offsets.get(g), self.offsets.get(g + 1)) {
            (Some(&start), Some(&end)) => &self.rows[start..end],
            _ => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u32]> + '_ {
        (0..self.group_count()).map(move |g| self.group(g))
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    /// Convert from the nested form: an `Array<Int>` vector, one row per group.
    pub fn from_vector(groups: &ValueVector) -> Result<Self> {
        let mut indices = Self::new();
        for g in 0..groups.size() {
            if groups.is_null(g) {
                indices.push_group(std::iter::empty());
                continue;
            }
            let rows = groups.get_array(g).ok_or_else(|| {
                Error::illegal_argument(format!(
                    "group row indices must be Array<Int>, got {}",
                    groups.ty()
                ))
            })?;
            let mut group = Vec::with_capacity(rows.size());
            for r in 0..rows.size() {
                let row = rows.get_int(r);
                let row = u32::try_from(row).map_err(|_| {
                    Error::illegal_argument(format!("negative row index {row} in group {g}"))
                })?;
                group.push(row);
            }
            indices.push_group(group);
        }
        Ok(indices)
    }

    /// Convert to the nested `Array<Int>` form.
    pub fn to_vector(&self) -> Result<ValueVector> {
        let mut values = Vec::with_capacity(self.group_count());
        for group in self.iter() {
            let ints = group.iter().map(|&r| r as i32).collect::<Vec<_>>();
            let nested = ValueVector::from_buffer(ResolvedType::Int, ColumnData::Int(ints), None)?;
            values.push(Value::Array(nested));
        }
        ValueVector::from_buffer(
            ResolvedType::array(ResolvedType::Int),
            ColumnData::Object(values),
            None,
        )
    }
}
