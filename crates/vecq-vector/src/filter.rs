use vecq_core::prelude::*;

/// Row selection applied when appending or filtering tuple vectors.
#[derive(Debug, Clone, Copy)]
pub enum RowFilter<'a> {
    /// Boolean vector; a row is selected when its value is true (null = false).
    Mask(&'a ValueVector),
    /// Bit set; a row is selected when its bit is set.
    Bits(&'a BitSet),
}

impl RowFilter<'_> {
    pub fn size(&self) -> usize {
        match self {
            RowFilter::Mask(mask) => mask.size(),
            RowFilter::Bits(bits) => bits.len(),
        }
    }

    pub fn is_selected(&self, row: usize) -> bool {
        match self {
            RowFilter::Mask(mask) => !mask.is_null(row) && mask.get_boolean(row),
            RowFilter::Bits(bits) => bits.get(row),
        }
    }

    /// Selected rows in `start..end`, ascending.
    pub fn selected_in(&self, start: usize, end: usize) -> Vec<usize> {
        match self {
            RowFilter::Bits(bits) => bits
                .iter_ones()
                .skip_while(|&row| row < start)
                .take_while(|&row| row < end)
                .collect(),
            RowFilter::Mask(_) => (start..end).filter(|&row| self.is_selected(row)).collect(),
        }
    }

    pub fn selected(&self) -> Vec<usize> {
        self.selected_in(0, self.size())
    }

    /// Fail unless the filter covers exactly `row_count` rows.
    pub fn check_size(&self, row_count: usize) -> Result<()> {
        if self.size() != row_count {
            return Err(Error::illegal_argument(format!(
                "Filter size must equal tuple vector row count: filter has {} rows, tuple vector has {row_count}",
                self.size()
            )));
        }
        Ok(())
    }
}
