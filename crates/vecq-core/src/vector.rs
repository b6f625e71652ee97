//! Immutable columnar vectors.
//!
//! `ValueVector` is a closed enum of two representations:
//! - `Literal`: one value (or null) repeated `size` times, no per-row storage;
//! - `Buffer`: per-row data in a `ColumnData` plus an optional null mask.
//!
//! Builders pick the representation at build time; it affects memory only,
//! never semantics. Typed accessors must not be relied on for null rows (they
//! return a default value) and never panic on a type mismatch.

use std::sync::Arc;

use bigdecimal::BigDecimal;

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::schema::{ResolvedType, StorageKind};
use crate::tuple::TupleVector;
use crate::value::{ObjectValue, Value};

/// Per-row payload of a buffer-backed vector.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Boolean(BitSet),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Decimal(Vec<BigDecimal>),
    /// Entries at null rows are placeholders; the null mask is authoritative.
    Object(Vec<Value>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Boolean(b) => b.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Long(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Double(v) => v.len(),
            ColumnData::Decimal(v) => v.len(),
            ColumnData::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn storage(&self) -> StorageKind {
        match self {
            ColumnData::Boolean(_) => StorageKind::Boolean,
            ColumnData::Int(_) => StorageKind::Int,
            ColumnData::Long(_) => StorageKind::Long,
            ColumnData::Float(_) => StorageKind::Float,
            ColumnData::Double(_) => StorageKind::Double,
            ColumnData::Decimal(_) => StorageKind::Decimal,
            ColumnData::Object(_) => StorageKind::Object,
        }
    }

    fn get(&self, row: usize) -> Value {
        match self {
            ColumnData::Boolean(b) => Value::Boolean(b.get(row)),
            ColumnData::Int(v) => v.get(row).map_or(Value::Null, |x| Value::Int(*x)),
            ColumnData::Long(v) => v.get(row).map_or(Value::Null, |x| Value::Long(*x)),
            ColumnData::Float(v) => v.get(row).map_or(Value::Null, |x| Value::Float(*x)),
            ColumnData::Double(v) => v.get(row).map_or(Value::Null, |x| Value::Double(*x)),
            ColumnData::Decimal(v) => v.get(row).map_or(Value::Null, |x| Value::Decimal(x.clone())),
            ColumnData::Object(v) => v.get(row).cloned().unwrap_or(Value::Null),
        }
    }
}

/// One value (or null) repeated `size` times.
#[derive(Debug, Clone)]
pub struct LiteralVector {
    ty: ResolvedType,
    value: Box<Value>,
    size: usize,
}

impl LiteralVector {
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Buffer-backed vector; data and mask are shared read-only between clones.
#[derive(Debug, Clone)]
pub struct BufferVector {
    ty: ResolvedType,
    data: Arc<ColumnData>,
    /// Set bit = null row. `None` means no nulls.
    nulls: Option<Arc<BitSet>>,
    size: usize,
}

impl BufferVector {
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn nulls(&self) -> Option<&BitSet> {
        self.nulls.as_deref()
    }
}

#[derive(Debug, Clone)]
pub enum ValueVector {
    Literal(LiteralVector),
    Buffer(BufferVector),
}

macro_rules! literal_ctor {
    ($($name:ident($t:ty) => $variant:ident, $ty:ident;)*) => {
        $(
            pub fn $name(value: $t, size: usize) -> Self {
                ValueVector::Literal(LiteralVector {
                    ty: ResolvedType::$ty,
                    value: Box::new(Value::$variant(value.into())),
                    size,
                })
            }
        )*
    };
}

impl ValueVector {
    literal_ctor! {
        literal_boolean(bool) => Boolean, Boolean;
        literal_int(i32) => Int, Int;
        literal_long(i64) => Long, Long;
        literal_float(f32) => Float, Float;
        literal_double(f64) => Double, Double;
        literal_decimal(BigDecimal) => Decimal, Decimal;
        literal_string(&str) => String, String;
        literal_datetime(i64) => DateTime, DateTime;
    }

    /// All-null vector of `ty`.
    pub fn literal_null(ty: ResolvedType, size: usize) -> Self {
        ValueVector::Literal(LiteralVector {
            ty,
            value: Box::new(Value::Null),
            size,
        })
    }

    /// Any-typed literal holding an arbitrary boxed value.
    pub fn literal_any(value: Value, size: usize) -> Self {
        ValueVector::Literal(LiteralVector {
            ty: ResolvedType::Any,
            value: Box::new(value),
            size,
        })
    }

    pub fn literal_array(value: ValueVector, size: usize) -> Self {
        let ty = ResolvedType::array(value.ty().clone());
        ValueVector::Literal(LiteralVector {
            ty,
            value: Box::new(Value::Array(value)),
            size,
        })
    }

    pub fn literal_table(value: TupleVector, size: usize) -> Self {
        let ty = ResolvedType::Table(value.schema().clone());
        ValueVector::Literal(LiteralVector {
            ty,
            value: Box::new(Value::Table(value)),
            size,
        })
    }

    /// Literal of a declared type; fails when the value does not conform.
    pub fn literal(value: Value, ty: ResolvedType, size: usize) -> Result<Self> {
        if !value.conforms_to(&ty) {
            return Err(Error::illegal_argument(format!(
                "literal value {value} does not conform to type {ty}"
            )));
        }
        Ok(ValueVector::Literal(LiteralVector {
            ty,
            value: Box::new(value),
            size,
        }))
    }

    /// Zero-length vector of `ty`.
    pub fn empty(ty: ResolvedType) -> Self {
        Self::literal_null(ty, 0)
    }

    /// Buffer-backed vector over `data`. Storage must match the declared type and
    /// every non-null object must conform to it.
    pub fn from_buffer(ty: ResolvedType, data: ColumnData, nulls: Option<BitSet>) -> Result<Self> {
        if data.storage() != ty.storage() {
            return Err(Error::illegal_argument(format!(
                "{:?} storage cannot back a vector of type {ty}",
                data.storage()
            )));
        }
        let size = data.len();
        let mut nulls = match nulls {
            Some(mut mask) if mask.len() <= size => {
                mask.resize(size);
                Some(mask)
            }
            Some(mask) => {
                return Err(Error::illegal_argument(format!(
                    "null mask of {} rows exceeds data of {size} rows",
                    mask.len()
                )))
            }
            None => None,
        };
        if let ColumnData::Object(values) = &data {
            for (row, value) in values.iter().enumerate() {
                if nulls.as_ref().is_some_and(|m| m.get(row)) {
                    continue;
                }
                if value.is_null() {
                    nulls.get_or_insert_with(|| BitSet::new(size)).set(row, true);
                } else if !value.conforms_to(&ty) {
                    return Err(Error::illegal_argument(format!(
                        "value {value} at row {row} does not conform to type {ty}"
                    )));
                }
            }
        }
        let nulls = nulls.filter(BitSet::any).map(Arc::new);
        Ok(ValueVector::Buffer(BufferVector {
            ty,
            data: Arc::new(data),
            nulls,
            size,
        }))
    }

    /// Buffer-backed vector from boxed values, widening numerics to `ty`.
    pub fn from_values(ty: ResolvedType, values: Vec<Value>) -> Result<Self> {
        let mut nulls = BitSet::new(values.len());
        for (row, v) in values.iter().enumerate() {
            if v.is_null() {
                nulls.set(row, true);
            } else if ty.storage() != StorageKind::Object
                && !v.runtime_type().can_widen_to(&ty)
            {
                return Err(Error::illegal_argument(format!(
                    "value {v} at row {row} cannot be stored as {ty}"
                )));
            }
        }
        let data = match ty.storage() {
            StorageKind::Boolean => ColumnData::Boolean(BitSet::from_bools(
                &values.iter().map(|v| v.as_bool().unwrap_or(false)).collect::<Vec<_>>(),
            )),
            StorageKind::Int => {
                ColumnData::Int(values.iter().map(|v| v.as_i32().unwrap_or_default()).collect())
            }
            StorageKind::Long => {
                ColumnData::Long(values.iter().map(|v| v.as_i64().unwrap_or_default()).collect())
            }
            StorageKind::Float => {
                ColumnData::Float(values.iter().map(|v| v.as_f32().unwrap_or_default()).collect())
            }
            StorageKind::Double => {
                ColumnData::Double(values.iter().map(|v| v.as_f64().unwrap_or_default()).collect())
            }
            StorageKind::Decimal => ColumnData::Decimal(
                values.iter().map(|v| v.as_decimal().unwrap_or_default()).collect(),
            ),
            StorageKind::Object => ColumnData::Object(values),
        };
        Self::from_buffer(ty, data, Some(nulls))
    }

    pub fn ty(&self) -> &ResolvedType {
        match self {
            ValueVector::Literal(l) => &l.ty,
            ValueVector::Buffer(b) => &b.ty,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            ValueVector::Literal(l) => l.size,
            ValueVector::Buffer(b) => b.size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, ValueVector::Literal(_))
    }

    /// The repeated value of a literal vector.
    pub fn literal_value(&self) -> Option<&Value> {
        match self {
            ValueVector::Literal(l) => Some(l.value()),
            ValueVector::Buffer(_) => None,
        }
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            ValueVector::Literal(l) => l.value.is_null(),
            ValueVector::Buffer(b) => b.nulls.as_ref().is_some_and(|m| m.get(row)),
        }
    }

    pub fn has_nulls(&self) -> bool {
        match self {
            ValueVector::Literal(l) => l.size > 0 && l.value.is_null(),
            ValueVector::Buffer(b) => b.nulls.is_some(),
        }
    }

    pub fn get_boolean(&self, row: usize) -> bool {
        match self {
            ValueVector::Literal(l) => l.value.as_bool().unwrap_or(false),
            ValueVector::Buffer(b) => match b.data.as_ref() {
                ColumnData::Boolean(bits) => bits.get(row),
                data => data.get(row).as_bool().unwrap_or(false),
            },
        }
    }

    pub fn get_int(&self, row: usize) -> i32 {
        match self {
            ValueVector::Literal(l) => l.value.as_i32().unwrap_or_default(),
            ValueVector::Buffer(b) => match b.data.as_ref() {
                ColumnData::Int(v) => v.get(row).copied().unwrap_or_default(),
                data => data.get(row).as_i32().unwrap_or_default(),
            },
        }
    }

    pub fn get_long(&self, row: usize) -> i64 {
        match self {
            ValueVector::Literal(l) => l.value.as_i64().unwrap_or_default(),
            ValueVector::Buffer(b) => match b.data.as_ref() {
                ColumnData::Long(v) => v.get(row).copied().unwrap_or_default(),
                ColumnData::Int(v) => v.get(row).map_or(0, |x| i64::from(*x)),
                data => data.get(row).as_i64().unwrap_or_default(),
            },
        }
    }

    pub fn get_float(&self, row: usize) -> f32 {
        match self {
            ValueVector::Literal(l) => l.value.as_f32().unwrap_or_default(),
            ValueVector::Buffer(b) => match b.data.as_ref() {
                ColumnData::Float(v) => v.get(row).copied().unwrap_or_default(),
                data => data.get(row).as_f32().unwrap_or_default(),
            },
        }
    }

    pub fn get_double(&self, row: usize) -> f64 {
        match self {
            ValueVector::Literal(l) => l.value.as_f64().unwrap_or_default(),
            ValueVector::Buffer(b) => match b.data.as_ref() {
                ColumnData::Double(v) => v.get(row).copied().unwrap_or_default(),
                ColumnData::Float(v) => v.get(row).map_or(0.0, |x| f64::from(*x)),
                data => data.get(row).as_f64().unwrap_or_default(),
            },
        }
    }

    pub fn get_decimal(&self, row: usize) -> BigDecimal {
        match self {
            ValueVector::Literal(l) => l.value.as_decimal().unwrap_or_default(),
            ValueVector::Buffer(b) => match b.data.as_ref() {
                ColumnData::Decimal(v) => v.get(row).cloned().unwrap_or_default(),
                data => data.get(row).as_decimal().unwrap_or_default(),
            },
        }
    }

    pub fn get_datetime(&self, row: usize) -> i64 {
        self.get_long(row)
    }

    /// String rows are returned as-is; other values render through `Display`.
    pub fn get_string(&self, row: usize) -> Arc<str> {
        match self.get_any(row) {
            Value::Null => Arc::from(""),
            Value::String(s) => s,
            other => Arc::from(other.to_string()),
        }
    }

    pub fn get_array(&self, row: usize) -> Option<ValueVector> {
        match self.get_any(row) {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_table(&self, row: usize) -> Option<TupleVector> {
        match self.get_any(row) {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn get_object(&self, row: usize) -> Option<ObjectValue> {
        match self.get_any(row) {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Boxed value of a row; `Value::Null` for null rows.
    pub fn get_any(&self, row: usize) -> Value {
        if self.is_null(row) {
            return Value::Null;
        }
        match self {
            ValueVector::Literal(l) => l.value().clone(),
            ValueVector::Buffer(b) => b.data.get(row),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.size()).map(move |row| self.get_any(row))
    }

    /// Row-wise equality, ignoring the declared type and representation.
    pub fn rows_equal(&self, other: &ValueVector) -> bool {
        if self.size() != other.size() {
            return false;
        }
        if let (Some(a), Some(b)) = (self.literal_value(), other.literal_value()) {
            return a == b;
        }
        (0..self.size()).all(|row| self.get_any(row) == other.get_any(row))
    }
}

/// Same declared type and same rows; literal and buffer representations of the
/// same rows are equal.
impl PartialEq for ValueVector {
    fn eq(&self, other: &Self) -> bool {
        self.ty() == other.ty() && self.rows_equal(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_has_no_per_row_storage() {
        let v = ValueVector::literal_int(7, 1_000_000);
        assert!(v.is_literal());
        assert_eq!(v.size(), 1_000_000);
        assert_eq!(v.get_int(999_999), 7);
        assert_eq!(v.get_long(3), 7);
        assert!(!v.has_nulls());

        let nulls = ValueVector::literal_null(ResolvedType::String, 3);
        assert!(nulls.is_null(2));
        assert!(nulls.has_nulls());
        assert_eq!(nulls.get_any(1), Value::Null);
    }

    #[test]
    fn buffer_rejects_mismatched_storage() {
        let err = ValueVector::from_buffer(ResolvedType::Long, ColumnData::Int(vec![1]), None);
        assert!(matches!(err, Err(Error::IllegalArgument(_))));

        let err = ValueVector::from_buffer(
            ResolvedType::String,
            ColumnData::Object(vec![Value::Int(1)]),
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn object_null_entries_become_mask_bits() {
        let v = ValueVector::from_buffer(
            ResolvedType::String,
            ColumnData::Object(vec![Value::from("a"), Value::Null]),
            None,
        )
        .unwrap();
        assert!(!v.is_null(0));
        assert!(v.is_null(1));
        assert_eq!(&*v.get_string(0), "a");
    }

    #[test]
    fn accessors_widen_and_default_on_null() {
        let v = ValueVector::from_values(
            ResolvedType::Double,
            vec![Value::Float(1.5), Value::Null, Value::Int(3)],
        )
        .unwrap();
        assert_eq!(v.get_double(0), 1.5);
        assert!(v.is_null(1));
        assert_eq!(v.get_double(1), 0.0);
        assert_eq!(v.get_double(2), 3.0);
        assert_eq!(v.get_any(2), Value::Double(3.0));
    }

    #[test]
    fn literal_and_buffer_compare_equal() {
        let lit = ValueVector::literal_long(5, 3);
        let buf = ValueVector::from_buffer(ResolvedType::Long, ColumnData::Long(vec![5; 3]), None)
            .unwrap();
        assert_eq!(lit, buf);
        assert_ne!(lit, ValueVector::literal_int(5, 3));
        assert!(lit.rows_equal(&ValueVector::literal_long(5, 3)));
    }

    #[test]
    fn literals_nest_inside_literals() {
        let inner = ValueVector::literal_long(2, 3);
        let outer = ValueVector::literal_array(inner.clone(), 2);
        let wrapped = ValueVector::literal_any(Value::Array(outer.clone()), 4);

        let row = wrapped.get_array(3).unwrap();
        assert_eq!(row, outer);
        assert_eq!(row.get_array(1).unwrap(), inner);
        assert_eq!(outer.literal_value(), Some(&Value::Array(inner)));
    }
}
