//! Per-storage element handling shared by builders and mutable vectors.

use bigdecimal::BigDecimal;
use vecq_core::prelude::*;
use vecq_mem::{BitBuffer, BufferAllocator, ObjectBuffer, PrimitiveBuffer};

/// A backing buffer for one storage kind plus the conversions into it.
pub trait Slots: Sized {
    type Item: Clone;

    /// Builder name used in diagnostics.
    const NAME: &'static str;

    fn allocate(allocator: &BufferAllocator) -> Self;

    /// Default declared type of vectors stored in these slots.
    fn default_type() -> ResolvedType;

    /// Convert a non-null value for a column declared `ty`; `None` when the value
    /// cannot be stored without narrowing or reinterpretation.
    fn convert(ty: &ResolvedType, value: Value) -> Option<Self::Item>;

    /// Equality used for literal collapse.
    fn same(a: &Self::Item, b: &Self::Item) -> bool;

    fn to_value(item: Self::Item) -> Value;

    fn set(&mut self, idx: usize, item: Self::Item);

    fn get(&self, idx: usize) -> Option<Self::Item>;

    /// Freeze into column data of exactly `len` rows.
    fn into_data(self, len: usize) -> ColumnData;
}

fn widens_to(value: &Value, ty: &ResolvedType) -> bool {
    value.runtime_type().can_widen_to(ty)
}

/// `$same` is the literal-collapse equality for the element type.
macro_rules! primitive_slots {
    ($t:ty, $name:literal, $ty:ident, $variant:ident, $as:ident, $same:expr) => {
        impl Slots for PrimitiveBuffer<$t> {
            type Item = $t;
            const NAME: &'static str = $name;

            fn allocate(allocator: &BufferAllocator) -> Self {
                allocator.primitive()
            }

            fn default_type() -> ResolvedType {
                ResolvedType::$ty
            }

            fn convert(ty: &ResolvedType, value: Value) -> Option<$t> {
                if widens_to(&value, ty) {
                    value.$as()
                } else {
                    None
                }
            }

            fn same(a: &$t, b: &$t) -> bool {
                let same: fn(&$t, &$t) -> bool = $same;
                same(a, b)
            }

            fn to_value(item: $t) -> Value {
                Value::$variant(item)
            }

            fn set(&mut self, idx: usize, item: $t) {
                PrimitiveBuffer::set(self, idx, item);
            }

            fn get(&self, idx: usize) -> Option<$t> {
                PrimitiveBuffer::get(self, idx).copied()
            }

            fn into_data(mut self, len: usize) -> ColumnData {
                self.set_len(len);
                ColumnData::$variant(self.freeze())
            }
        }
    };
}

primitive_slots!(i32, "IntVectorBuilder", Int, Int, as_i32, |a, b| a == b);
primitive_slots!(i64, "LongVectorBuilder", Long, Long, as_i64, |a, b| a == b);
// Bitwise, so NaN collapses with NaN and 0.0 stays distinct from -0.0.
primitive_slots!(f32, "FloatVectorBuilder", Float, Float, as_f32, |a, b| {
    a.to_bits() == b.to_bits()
});
primitive_slots!(f64, "DoubleVectorBuilder", Double, Double, as_f64, |a, b| {
    a.to_bits() == b.to_bits()
});

impl Slots for BitBuffer {
    type Item = bool;
    const NAME: &'static str = "BooleanVectorBuilder";

    fn allocate(allocator: &BufferAllocator) -> Self {
        allocator.bits()
    }

    fn default_type() -> ResolvedType {
        ResolvedType::Boolean
    }

    fn convert(_ty: &ResolvedType, value: Value) -> Option<bool> {
        match value {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    fn same(a: &bool, b: &bool) -> bool {
        a == b
    }

    fn to_value(item: bool) -> Value {
        Value::Boolean(item)
    }

    fn set(&mut self, idx: usize, item: bool) {
        BitBuffer::set(self, idx, item);
    }

    fn get(&self, idx: usize) -> Option<bool> {
        (idx < self.len()).then(|| BitBuffer::get(self, idx))
    }

    fn into_data(mut self, len: usize) -> ColumnData {
        self.set_len(len);
        ColumnData::Boolean(self.freeze())
    }
}

impl Slots for ObjectBuffer<BigDecimal> {
    type Item = BigDecimal;
    const NAME: &'static str = "DecimalVectorBuilder";

    fn allocate(allocator: &BufferAllocator) -> Self {
        allocator.objects()
    }

    fn default_type() -> ResolvedType {
        ResolvedType::Decimal
    }

    fn convert(ty: &ResolvedType, value: Value) -> Option<BigDecimal> {
        if widens_to(&value, ty) {
            value.as_decimal()
        } else {
            None
        }
    }

    fn same(a: &BigDecimal, b: &BigDecimal) -> bool {
        a == b
    }

    fn to_value(item: BigDecimal) -> Value {
        Value::Decimal(item)
    }

    fn set(&mut self, idx: usize, item: BigDecimal) {
        ObjectBuffer::set(self, idx, item);
    }

    fn get(&self, idx: usize) -> Option<BigDecimal> {
        ObjectBuffer::get(self, idx).cloned()
    }

    fn into_data(mut self, len: usize) -> ColumnData {
        self.set_len(len);
        ColumnData::Decimal(self.freeze())
    }
}

impl Slots for ObjectBuffer<Value> {
    type Item = Value;
    const NAME: &'static str = "ObjectVectorBuilder";

    fn allocate(allocator: &BufferAllocator) -> Self {
        allocator.objects()
    }

    fn default_type() -> ResolvedType {
        ResolvedType::Any
    }

    fn convert(ty: &ResolvedType, value: Value) -> Option<Value> {
        value.conforms_to(ty).then_some(value)
    }

    fn same(a: &Value, b: &Value) -> bool {
        a == b
    }

    fn to_value(item: Value) -> Value {
        item
    }

    fn set(&mut self, idx: usize, item: Value) {
        ObjectBuffer::set(self, idx, item);
    }

    fn get(&self, idx: usize) -> Option<Value> {
        ObjectBuffer::get(self, idx).filter(|v| !v.is_null()).cloned()
    }

    fn into_data(mut self, len: usize) -> ColumnData {
        self.set_len(len);
        ColumnData::Object(self.freeze())
    }
}
