//! Positional, null-aware mutable vectors.
//!
//! Rows are written by index in any order. `size()` is the highest written row
//! plus one (or the size forced by `ensure_size`); rows never written are null.
//! Nulls are tracked by a validity bit buffer, never by storing placeholders,
//! so a vector that only ever receives nulls allocates no value storage.

use bigdecimal::BigDecimal;
use vecq_core::prelude::*;
use vecq_mem::{BitBuffer, BufferAllocator, ObjectBuffer, PrimitiveBuffer};

use crate::slots::Slots;

enum Storage {
    Boolean(BitBuffer),
    Int(PrimitiveBuffer<i32>),
    Long(PrimitiveBuffer<i64>),
    Float(PrimitiveBuffer<f32>),
    Double(PrimitiveBuffer<f64>),
    Decimal(ObjectBuffer<BigDecimal>),
    Object(ObjectBuffer<Value>),
}

macro_rules! with_slots {
    ($storage:expr, $s:ident => $body:expr) => {
        match $storage {
            Storage::Boolean($s) => $body,
            Storage::Int($s) => $body,
            Storage::Long($s) => $body,
            Storage::Float($s) => $body,
            Storage::Double($s) => $body,
            Storage::Decimal($s) => $body,
            Storage::Object($s) => $body,
        }
    };
}

impl Storage {
    fn allocate(allocator: &BufferAllocator, ty: &ResolvedType) -> Self {
        match ty.storage() {
            StorageKind::Boolean => Storage::Boolean(Slots::allocate(allocator)),
            StorageKind::Int => Storage::Int(Slots::allocate(allocator)),
            StorageKind::Long => Storage::Long(Slots::allocate(allocator)),
            StorageKind::Float => Storage::Float(Slots::allocate(allocator)),
            StorageKind::Double => Storage::Double(Slots::allocate(allocator)),
            StorageKind::Decimal => Storage::Decimal(Slots::allocate(allocator)),
            StorageKind::Object => Storage::Object(Slots::allocate(allocator)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Storage::Boolean(_) => "MutableBooleanVector",
            Storage::Int(_) => "MutableIntVector",
            Storage::Long(_) => "MutableLongVector",
            Storage::Float(_) => "MutableFloatVector",
            Storage::Double(_) => "MutableDoubleVector",
            Storage::Decimal(_) => "MutableDecimalVector",
            Storage::Object(_) => "MutableObjectVector",
        }
    }
}

fn write<S: Slots>(slots: &mut S, ty: &ResolvedType, row: usize, value: Value) -> bool {
    match S::convert(ty, value) {
        Some(item) => {
            slots.set(row, item);
            true
        }
        None => false,
    }
}

fn read<S: Slots>(slots: &S, row: usize) -> Value {
    slots.get(row).map_or(Value::Null, S::to_value)
}

pub struct MutableValueVector {
    allocator: BufferAllocator,
    ty: ResolvedType,
    storage: Storage,
    /// Set bit = row holds a value.
    valid: BitBuffer,
    size: usize,
}

impl MutableValueVector {
    pub fn new(allocator: &BufferAllocator, ty: ResolvedType) -> Self {
        Self {
            allocator: allocator.clone(),
            storage: Storage::allocate(allocator, &ty),
            valid: allocator.bits(),
            ty,
            size: 0,
        }
    }

    pub fn ty(&self) -> &ResolvedType {
        &self.ty
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_null(&self, row: usize) -> bool {
        !self.valid.get(row)
    }

    pub fn has_nulls(&self) -> bool {
        self.valid.as_bitset().count_ones() < self.size
    }

    /// Grow to at least `size` rows; new rows are null.
    pub fn ensure_size(&mut self, size: usize) {
        self.size = self.size.max(size);
    }

    /// Shrink to `size` rows, clearing every row at or past it.
    pub fn truncate(&mut self, size: usize) {
        for row in size..self.size.min(self.valid.len()) {
            self.valid.set(row, false);
        }
        self.size = self.size.min(size);
    }

    pub fn set_null(&mut self, row: usize) {
        if row < self.valid.len() {
            self.valid.set(row, false);
        }
        self.ensure_size(row + 1);
    }

    pub fn set_boolean(&mut self, row: usize, value: bool) -> Result<()> {
        self.store("set_boolean", row, Value::Boolean(value))
    }

    pub fn set_int(&mut self, row: usize, value: i32) -> Result<()> {
        self.store("set_int", row, Value::Int(value))
    }

    pub fn set_long(&mut self, row: usize, value: i64) -> Result<()> {
        self.store("set_long", row, Value::Long(value))
    }

    pub fn set_float(&mut self, row: usize, value: f32) -> Result<()> {
        self.store("set_float", row, Value::Float(value))
    }

    pub fn set_double(&mut self, row: usize, value: f64) -> Result<()> {
        self.store("set_double", row, Value::Double(value))
    }

    pub fn set_decimal(&mut self, row: usize, value: BigDecimal) -> Result<()> {
        self.store("set_decimal", row, Value::Decimal(value))
    }

    /// Write any value; string-like inputs are normalized to `Value::String`.
    pub fn set_any(&mut self, row: usize, value: impl Into<Value>) -> Result<()> {
        self.store("set_any", row, value.into())
    }

    /// Write `source[src_row]` into `dest_row`, preserving null.
    pub fn copy(&mut self, dest_row: usize, source: &ValueVector, src_row: usize) -> Result<()> {
        if source.is_null(src_row) {
            self.set_null(dest_row);
            return Ok(());
        }
        self.store("copy", dest_row, source.get_any(src_row))
    }

    /// Write every row of `source` starting at `dest_row`.
    pub fn copy_all(&mut self, dest_row: usize, source: &ValueVector) -> Result<()> {
        for row in 0..source.size() {
            self.copy(dest_row + row, source, row)?;
        }
        self.ensure_size(dest_row + source.size());
        Ok(())
    }

    pub fn get_any(&self, row: usize) -> Value {
        if self.is_null(row) {
            return Value::Null;
        }
        with_slots!(&self.storage, s => read(s, row))
    }

    /// Re-materialize every row under a new declared type (e.g. Int -> Long or
    /// anything -> Any). Fails if some value cannot be stored as `ty`.
    pub fn retype(&mut self, ty: ResolvedType) -> Result<()> {
        if ty == self.ty {
            return Ok(());
        }
        let mut next = MutableValueVector::new(&self.allocator, ty);
        for row in 0..self.size {
            let value = self.get_any(row);
            if value.is_null() {
                continue;
            }
            next.store("retype", row, value)?;
        }
        next.ensure_size(self.size);
        *self = next;
        Ok(())
    }

    /// Freeze into an immutable vector. Consumes the mutable vector.
    pub fn build(self) -> Result<ValueVector> {
        let size = self.size;
        let valid = self.valid.freeze();
        if valid.count_ones() == 0 {
            return Ok(ValueVector::literal_null(self.ty, size));
        }
        let nulls = (valid.count_ones() < size).then(|| {
            let mut nulls = BitSet::new(size);
            for row in (0..size).filter(|&row| !valid.get(row)) {
                nulls.set(row, true);
            }
            nulls
        });
        let data = with_slots!(self.storage, s => s.into_data(size));
        ValueVector::from_buffer(self.ty, data, nulls)
    }

    fn store(&mut self, op: &str, row: usize, value: Value) -> Result<()> {
        if value.is_null() {
            self.set_null(row);
            return Ok(());
        }
        let ty = &self.ty;
        let stored = with_slots!(&mut self.storage, s => write(s, ty, row, value));
        if !stored {
            return Err(Error::illegal_argument(format!(
                "{op} is not supported by {} of type {}",
                self.storage.name(),
                self.ty
            )));
        }
        self.valid.set(row, true);
        self.ensure_size(row + 1);
        Ok(())
    }
}

impl std::fmt::Debug for MutableValueVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.storage.name())
            .field("ty", &self.ty)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use vecq_core::config::AllocatorSettings;

    use super::*;

    fn allocator() -> BufferAllocator {
        BufferAllocator::new(AllocatorSettings::with_bit_size(1).unwrap())
    }

    #[test]
    fn sparse_rows_default_to_null() {
        let alloc = allocator();
        let mut v = MutableValueVector::new(&alloc, ResolvedType::Long);
        assert!(!v.has_nulls());
        v.set_long(3, 9).unwrap();
        assert_eq!(v.size(), 4);
        assert!(v.has_nulls());
        assert!(v.is_null(0));
        let built = v.build().unwrap();
        assert!(built.is_null(2));
        assert_eq!(built.get_long(3), 9);
    }

    #[test]
    fn overwrite_with_null_clears_value() {
        let alloc = allocator();
        let mut v = MutableValueVector::new(&alloc, ResolvedType::Int);
        v.set_int(0, 1).unwrap();
        v.set_null(0);
        assert!(v.is_null(0));
        let built = v.build().unwrap();
        assert!(built.is_literal());
        assert!(built.is_null(0));
    }

    #[test]
    fn truncate_drops_trailing_rows() {
        let alloc = allocator();
        let mut v = MutableValueVector::new(&alloc, ResolvedType::Int);
        v.set_int(0, 1).unwrap();
        v.set_int(2, 3).unwrap();
        v.truncate(1);
        assert_eq!(v.size(), 1);
        v.ensure_size(3);
        assert!(v.is_null(2));
        assert_eq!(v.get_any(0), Value::Int(1));
    }

    #[test]
    fn retype_widens_existing_rows() {
        let alloc = allocator();
        let mut v = MutableValueVector::new(&alloc, ResolvedType::Int);
        v.set_int(0, 1).unwrap();
        v.set_null(1);
        v.set_int(2, 3).unwrap();
        v.retype(ResolvedType::Double).unwrap();
        v.set_double(3, 0.5).unwrap();
        let built = v.build().unwrap();
        assert_eq!(built.ty(), &ResolvedType::Double);
        assert_eq!(built.get_double(2), 3.0);
        assert!(built.is_null(1));
        assert_eq!(built.get_double(3), 0.5);
    }
}
