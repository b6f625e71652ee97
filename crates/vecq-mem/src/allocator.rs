//! BufferAllocator + statistics.
//!
//! Capacities are counted in elements, not bytes. The first allocation for a
//! buffer is the requested size rounded up to a multiple of `bit_size`; later
//! growth takes the larger of that rounding and double the old capacity.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use vecq_core::config::AllocatorSettings;

use crate::buffer::{BitBuffer, ObjectBuffer, PrimitiveBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationKind {
    /// Fixed-width numeric array.
    Primitive,
    /// Bit-packed boolean or null-mask storage.
    Bits,
    /// Array of object references.
    Object,
}

/// Snapshot of allocation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorStatistics {
    pub object_allocation_count: usize,
    pub object_allocation_sum: usize,
    pub primitive_allocation_count: usize,
    pub primitive_allocation_sum: usize,
    pub bit_allocation_count: usize,
    pub bit_allocation_sum: usize,
}

#[derive(Default)]
struct Counter {
    count: AtomicUsize,
    sum: AtomicUsize,
}

impl Counter {
    fn record(&self, capacity: usize) -> (usize, usize) {
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        let sum = self.sum.fetch_add(capacity, Ordering::Relaxed) + capacity;
        (count, sum)
    }

    fn load(&self) -> (usize, usize) {
        (
            self.count.load(Ordering::Relaxed),
            self.sum.load(Ordering::Relaxed),
        )
    }
}

struct AllocatorInner {
    settings: AllocatorSettings,
    objects: Counter,
    primitives: Counter,
    bits: Counter,
}

/// Issues typed backing buffers and counts every backing-array allocation.
///
/// Clones share one set of counters.
#[derive(Clone)]
pub struct BufferAllocator {
    inner: Arc<AllocatorInner>,
}

impl BufferAllocator {
    pub fn new(settings: AllocatorSettings) -> Self {
        Self {
            inner: Arc::new(AllocatorInner {
                settings,
                objects: Counter::default(),
                primitives: Counter::default(),
                bits: Counter::default(),
            }),
        }
    }

    pub fn settings(&self) -> AllocatorSettings {
        self.inner.settings
    }

    pub fn bit_size(&self) -> usize {
        self.inner.settings.bit_size.max(1)
    }

    /// Capacity for a fresh buffer that must hold `needed` elements.
    pub fn initial_capacity(&self, needed: usize) -> usize {
        round_up(needed.max(1), self.bit_size())
    }

    /// Capacity for a buffer of capacity `old` that must now hold `needed`.
    pub fn grown_capacity(&self, old: usize, needed: usize) -> usize {
        self.initial_capacity(needed).max(old.saturating_mul(2))
    }

    pub fn primitive<T: Copy + Default>(&self) -> PrimitiveBuffer<T> {
        PrimitiveBuffer::new(self.clone())
    }

    pub fn bits(&self) -> BitBuffer {
        BitBuffer::new(self.clone())
    }

    pub fn objects<T: Clone + Default>(&self) -> ObjectBuffer<T> {
        ObjectBuffer::new(self.clone())
    }

    pub fn statistics(&self) -> AllocatorStatistics {
        let (object_allocation_count, object_allocation_sum) = self.inner.objects.load();
        let (primitive_allocation_count, primitive_allocation_sum) = self.inner.primitives.load();
        let (bit_allocation_count, bit_allocation_sum) = self.inner.bits.load();
        AllocatorStatistics {
            object_allocation_count,
            object_allocation_sum,
            primitive_allocation_count,
            primitive_allocation_sum,
            bit_allocation_count,
            bit_allocation_sum,
        }
    }

    /// Count one backing-array allocation of `capacity` elements.
    pub(crate) fn record(&self, kind: AllocationKind, capacity: usize) {
        let counter = match kind {
            AllocationKind::Primitive => &self.inner.primitives,
            AllocationKind::Bits => &self.inner.bits,
            AllocationKind::Object => &self.inner.objects,
        };
        let (_count, _sum) = counter.record(capacity);
        #[cfg(feature = "tracing")]
        tracing::trace!(kind = ?kind, capacity, count = _count, sum = _sum, "buffer allocated");
    }
}

impl Default for BufferAllocator {
    fn default() -> Self {
        Self::new(AllocatorSettings::default())
    }
}

impl std::fmt::Debug for BufferAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferAllocator")
            .field("settings", &self.inner.settings)
            .field("statistics", &self.statistics())
            .finish()
    }
}

fn round_up(n: usize, multiple: usize) -> usize {
    n.div_ceil(multiple).saturating_mul(multiple)
}
