//! Word-packed bit set: one bit per row.
//!
//! Backs null masks, boolean column data and row filters.

use serde::{Deserialize, Serialize};

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; words_for(len)],
            len,
        }
    }

    /// Build from raw words; bits beyond `len` are cleared.
    pub fn from_words(mut words: Vec<u64>, len: usize) -> Self {
        words.resize(words_for(len), 0);
        let mut set = Self { words, len };
        set.clear_tail();
        set
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        let mut set = Self::new(bits.len());
        for (i, &b) in bits.iter().enumerate() {
            if b {
                set.set(i, true);
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Out-of-range reads return false.
    pub fn get(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        self.words[idx / WORD_BITS] & (1u64 << (idx % WORD_BITS)) != 0
    }

    /// Sets a bit, growing the set when `idx` is past the end.
    pub fn set(&mut self, idx: usize, value: bool) {
        if idx >= self.len {
            self.resize(idx + 1);
        }
        let mask = 1u64 << (idx % WORD_BITS);
        if value {
            self.words[idx / WORD_BITS] |= mask;
        } else {
            self.words[idx / WORD_BITS] &= !mask;
        }
    }

    pub fn resize(&mut self, len: usize) {
        self.words.resize(words_for(len), 0);
        self.len = len;
        self.clear_tail();
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    pub fn all(&self) -> bool {
        self.count_ones() == self.len
    }

    /// Indices of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(wi * WORD_BITS + bit)
            })
        })
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    fn clear_tail(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

fn words_for(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_grows_and_iterates() {
        let mut bits = BitSet::default();
        bits.set(3, true);
        bits.set(70, true);
        assert_eq!(bits.len(), 71);
        assert!(bits.get(3));
        assert!(!bits.get(4));
        assert!(!bits.get(500));
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![3, 70]);
        assert_eq!(bits.count_ones(), 2);
    }

    #[test]
    fn shrinking_clears_tail_bits() {
        let mut bits = BitSet::from_bools(&[true; 10]);
        bits.resize(4);
        bits.resize(10);
        assert_eq!(bits.count_ones(), 4);
    }
}
