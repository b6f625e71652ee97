//! Growable typed buffers issued by `BufferAllocator`.
//!
//! Buffers allocate lazily: nothing is counted until the first write that needs
//! storage. Growth never shrinks and preserves existing contents. Positions
//! between the old length and a newly written index hold `T::default()`.

use vecq_core::bitset::BitSet;

use crate::allocator::{AllocationKind, BufferAllocator};

struct Growable<T> {
    allocator: BufferAllocator,
    kind: AllocationKind,
    /// `data.len()` is the allocated capacity; `len` is the logical length.
    data: Vec<T>,
    len: usize,
}

impl<T: Clone + Default> Growable<T> {
    fn new(allocator: BufferAllocator, kind: AllocationKind) -> Self {
        Self {
            allocator,
            kind,
            data: Vec::new(),
            len: 0,
        }
    }

    fn ensure_capacity(&mut self, needed: usize) {
        let old = self.data.len();
        if needed <= old {
            return;
        }
        let capacity = if old == 0 {
            self.allocator.initial_capacity(needed)
        } else {
            self.allocator.grown_capacity(old, needed)
        };
        self.data.resize(capacity, T::default());
        self.allocator.record(self.kind, capacity);
    }

    fn set(&mut self, idx: usize, value: T) {
        self.ensure_capacity(idx + 1);
        self.data[idx] = value;
        self.len = self.len.max(idx + 1);
    }

    fn set_len(&mut self, len: usize) {
        if len > self.len {
            self.ensure_capacity(len);
        } else {
            for slot in &mut self.data[len..self.len] {
                *slot = T::default();
            }
        }
        self.len = len;
    }

    fn get(&self, idx: usize) -> Option<&T> {
        if idx < self.len {
            self.data.get(idx)
        } else {
            None
        }
    }

    fn freeze(mut self) -> Vec<T> {
        self.data.truncate(self.len);
        self.data
    }
}

macro_rules! growable_api {
    ($name:ident, $bound:ident) => {
        impl<T: $bound + Default> $name<T> {
            pub(crate) fn new(allocator: BufferAllocator) -> Self {
                Self(Growable::new(allocator, Self::KIND))
            }

            pub fn len(&self) -> usize {
                self.0.len
            }

            pub fn is_empty(&self) -> bool {
                self.0.len == 0
            }

            /// Allocated capacity in elements; zero until the first write.
            pub fn capacity(&self) -> usize {
                self.0.data.len()
            }

            pub fn is_allocated(&self) -> bool {
                !self.0.data.is_empty()
            }

            pub fn reserve(&mut self, needed: usize) {
                self.0.ensure_capacity(needed);
            }

            pub fn set(&mut self, idx: usize, value: T) {
                self.0.set(idx, value);
            }

            pub fn push(&mut self, value: T) {
                let idx = self.0.len;
                self.0.set(idx, value);
            }

            /// Grow (allocating if needed) or truncate the logical length.
            pub fn set_len(&mut self, len: usize) {
                self.0.set_len(len);
            }

            pub fn get(&self, idx: usize) -> Option<&T> {
                self.0.get(idx)
            }

            pub fn as_slice(&self) -> &[T] {
                &self.0.data[..self.0.len]
            }

            /// Logical contents; spare capacity is dropped.
            pub fn freeze(self) -> Vec<T> {
                self.0.freeze()
            }
        }
    };
}

/// Fixed-width numeric array (`i32`, `i64`, `f32`, `f64`, ...).
pub struct PrimitiveBuffer<T>(Growable<T>);

impl<T> PrimitiveBuffer<T> {
    const KIND: AllocationKind = AllocationKind::Primitive;
}

growable_api!(PrimitiveBuffer, Copy);

impl<T: Copy + Default> PrimitiveBuffer<T> {
    /// Element at `idx`, or the default past the end.
    pub fn value(&self, idx: usize) -> T {
        self.get(idx).copied().unwrap_or_default()
    }
}

/// Array of object references (boxed values, decimals, nested vectors).
pub struct ObjectBuffer<T>(Growable<T>);

impl<T> ObjectBuffer<T> {
    const KIND: AllocationKind = AllocationKind::Object;
}

growable_api!(ObjectBuffer, Clone);

/// Bit-packed storage: one bit per row.
pub struct BitBuffer {
    allocator: BufferAllocator,
    bits: BitSet,
    capacity: usize,
}

impl BitBuffer {
    pub(crate) fn new(allocator: BufferAllocator) -> Self {
        Self {
            allocator,
            bits: BitSet::default(),
            capacity: 0,
        }
    }

    fn ensure_capacity(&mut self, needed: usize) {
        if needed <= self.capacity {
            return;
        }
        let capacity = if self.capacity == 0 {
            self.allocator.initial_capacity(needed)
        } else {
            self.allocator.grown_capacity(self.capacity, needed)
        };
        self.capacity = capacity;
        self.allocator.record(AllocationKind::Bits, capacity);
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set(&mut self, idx: usize, value: bool) {
        self.ensure_capacity(idx + 1);
        self.bits.set(idx, value);
    }

    pub fn push(&mut self, value: bool) {
        let idx = self.bits.len();
        self.set(idx, value);
    }

    pub fn set_len(&mut self, len: usize) {
        self.ensure_capacity(len);
        self.bits.resize(len);
    }

    pub fn get(&self, idx: usize) -> bool {
        self.bits.get(idx)
    }

    pub fn any(&self) -> bool {
        self.bits.any()
    }

    pub fn as_bitset(&self) -> &BitSet {
        &self.bits
    }

    pub fn freeze(self) -> BitSet {
        self.bits
    }
}

#[cfg(test)]
mod tests {
    use vecq_core::config::AllocatorSettings;

    use super::*;

    fn allocator(bit_size: usize) -> BufferAllocator {
        BufferAllocator::new(AllocatorSettings { bit_size })
    }

    #[test]
    fn object_buffer_is_lazy() {
        let alloc = allocator(2);
        let buf: ObjectBuffer<String> = alloc.objects();
        assert!(!buf.is_allocated());
        assert!(buf.freeze().is_empty());
        assert_eq!(alloc.statistics().object_allocation_count, 0);
    }

    #[test]
    fn growth_is_counted_per_backing_array() {
        let alloc = allocator(2);
        let mut buf: ObjectBuffer<String> = alloc.objects();
        buf.push("a".into());
        buf.push("b".into());
        let stats = alloc.statistics();
        assert_eq!((stats.object_allocation_count, stats.object_allocation_sum), (1, 2));

        buf.push("c".into());
        let stats = alloc.statistics();
        assert_eq!((stats.object_allocation_count, stats.object_allocation_sum), (2, 6));
        assert_eq!(buf.freeze(), vec!["a", "b", "c"]);
    }

    #[test]
    fn sparse_writes_fill_defaults() {
        let alloc = allocator(1);
        let mut buf: PrimitiveBuffer<i64> = alloc.primitive();
        buf.set(3, 7);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.value(0), 0);
        assert_eq!(buf.value(3), 7);
        assert_eq!(buf.value(10), 0);
        buf.set_len(2);
        buf.set_len(4);
        assert_eq!(buf.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn bits_pack_one_per_row() {
        let alloc = allocator(64);
        let mut bits = alloc.bits();
        for i in 0..100 {
            bits.push(i % 3 == 0);
        }
        assert_eq!(bits.len(), 100);
        assert_eq!(bits.capacity(), 128);
        assert_eq!(alloc.statistics().bit_allocation_count, 2);
        assert_eq!(bits.freeze().count_ones(), 34);
    }
}
