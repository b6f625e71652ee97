//! Boxed runtime values, as read through `ValueVector::get_any` or written into
//! Any/Object-typed vectors.
//!
//! Every string-like input (`&str`, `String`, `Box<str>`, `Cow<str>`) normalizes
//! to `Arc<str>` so that logically equal strings compare, hash and serialize the
//! same regardless of where they came from.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_traits::{FromPrimitive, ToPrimitive};

use crate::error::{Error, Result};
use crate::schema::{Column, ResolvedType, Schema};
use crate::tuple::TupleVector;
use crate::vector::ValueVector;

/// A value that knows how to serialize itself for output writers.
pub trait OutputWritable: fmt::Debug + Send + Sync {
    fn to_json(&self) -> serde_json::Value;
}

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
    String(Arc<str>),
    /// Epoch milliseconds, UTC.
    DateTime(i64),
    Array(ValueVector),
    Table(TupleVector),
    Object(ObjectValue),
    Writable(Arc<dyn OutputWritable>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The narrowest type describing this value. Null reports `Any`.
    pub fn runtime_type(&self) -> ResolvedType {
        match self {
            Value::Null => ResolvedType::Any,
            Value::Boolean(_) => ResolvedType::Boolean,
            Value::Int(_) => ResolvedType::Int,
            Value::Long(_) => ResolvedType::Long,
            Value::Float(_) => ResolvedType::Float,
            Value::Double(_) => ResolvedType::Double,
            Value::Decimal(_) => ResolvedType::Decimal,
            Value::String(_) => ResolvedType::String,
            Value::DateTime(_) => ResolvedType::DateTime,
            Value::Array(v) => ResolvedType::array(v.ty().clone()),
            Value::Table(t) => ResolvedType::Table(t.schema().clone()),
            Value::Object(o) => ResolvedType::Object(o.schema().clone()),
            Value::Writable(_) => ResolvedType::OutputWritable,
        }
    }

    /// Whether this value may be stored in a column declared as `ty`.
    pub fn conforms_to(&self, ty: &ResolvedType) -> bool {
        match (self, ty) {
            (Value::Null, _) | (_, ResolvedType::Any) => true,
            (Value::Boolean(_), ResolvedType::Boolean)
            | (Value::Int(_), ResolvedType::Int)
            | (Value::Long(_), ResolvedType::Long)
            | (Value::Float(_), ResolvedType::Float)
            | (Value::Double(_), ResolvedType::Double)
            | (Value::Decimal(_), ResolvedType::Decimal)
            | (Value::String(_), ResolvedType::String)
            | (Value::DateTime(_), ResolvedType::DateTime)
            | (Value::Writable(_), ResolvedType::OutputWritable) => true,
            (Value::Array(v), ResolvedType::Array(element)) => element.is_assignable_from(v.ty()),
            (Value::Table(t), ResolvedType::Table(schema)) => schema.is_assignable_from(t.schema()),
            (Value::Object(o), ResolvedType::Object(schema)) => {
                schema.is_assignable_from(o.schema())
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Long(v) => Some(*v as i32),
            Value::Float(v) => Some(*v as i32),
            Value::Double(v) => Some(*v as i32),
            Value::Decimal(d) => d.to_i32(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::Float(v) => Some(*v as i64),
            Value::Double(v) => Some(*v as i64),
            Value::Decimal(d) => d.to_i64(),
            Value::DateTime(ms) => Some(*ms),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Int(v) => Some(*v as f32),
            Value::Long(v) => Some(*v as f32),
            Value::Float(v) => Some(*v),
            Value::Double(v) => Some(*v as f32),
            Value::Decimal(d) => d.to_f32(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(f64::from(*v)),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<BigDecimal> {
        match self {
            Value::Int(v) => Some(BigDecimal::from(*v)),
            Value::Long(v) => Some(BigDecimal::from(*v)),
            Value::Float(v) => decimal_from_float(f64::from(*v)),
            Value::Double(v) => decimal_from_float(*v),
            Value::Decimal(d) => Some(d.clone()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Total order used by sorting and min/max: nulls first, numbers compared
    /// after widening, then by kind.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => compare_numeric(a, b),
            _ => kind_order(self).cmp(&kind_order(other)),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_) | Value::Decimal(_)
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Int(v) => Json::from(*v),
            Value::Long(v) => Json::from(*v),
            Value::Float(v) => Json::from(f64::from(*v)),
            Value::Double(v) => Json::from(*v),
            Value::Decimal(d) => d
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(Json::Number)
                .unwrap_or_else(|| Json::String(d.to_string())),
            Value::String(s) => Json::String(s.to_string()),
            Value::DateTime(ms) => Json::from(*ms),
            Value::Array(v) => Json::Array(v.iter().map(|x| x.to_json()).collect()),
            Value::Table(t) => Json::Array(
                (0..t.row_count())
                    .map(|row| ObjectValue::new(t.clone(), row).to_json())
                    .collect(),
            ),
            Value::Object(o) => o.to_json(),
            Value::Writable(w) => w.to_json(),
        }
    }
}

/// Decimal view of a float using its shortest round-trip text, so 0.1 stays 0.1.
pub fn decimal_from_float(v: f64) -> Option<BigDecimal> {
    if !v.is_finite() {
        return None;
    }
    v.to_string()
        .parse::<BigDecimal>()
        .ok()
        .or_else(|| BigDecimal::from_f64(v))
}

fn compare_numeric(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Long(_) | Value::Int(_), Value::Long(_) | Value::Int(_)) => {
            a.as_i64().cmp(&b.as_i64())
        }
        (Value::Decimal(_), _) | (_, Value::Decimal(_)) => match (a.as_decimal(), b.as_decimal()) {
            (Some(x), Some(y)) => x.cmp(&y),
            // NaN/infinite floats have no decimal form; fall back to float order.
            _ => float_cmp(a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN)),
        },
        _ => float_cmp(a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN)),
    }
}

fn float_cmp(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

fn kind_order(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Boolean(_) => 1,
        Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_) | Value::Decimal(_) => 2,
        Value::String(_) => 3,
        Value::DateTime(_) => 4,
        Value::Array(_) => 5,
        Value::Table(_) => 6,
        Value::Object(_) => 7,
        Value::Writable(_) => 8,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Writable(a), Value::Writable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::String(s) => write!(f, "{s}"),
            Value::DateTime(ms) => write!(f, "{ms}"),
            Value::Array(_) | Value::Table(_) | Value::Object(_) | Value::Writable(_) => {
                write!(f, "{}", self.to_json())
            }
        }
    }
}

macro_rules! value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from!(
    bool => Boolean,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    BigDecimal => Decimal,
    ValueVector => Array,
    TupleVector => Table,
    ObjectValue => Object,
);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Box<str>> for Value {
    fn from(s: Box<str>) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(s: Cow<'_, str>) -> Self {
        Value::String(Arc::from(s.as_ref()))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One row of a `TupleVector`: the value representation of an Object(Schema).
#[derive(Debug, Clone)]
pub struct ObjectValue {
    tuple: TupleVector,
    row: usize,
}

impl ObjectValue {
    pub fn new(tuple: TupleVector, row: usize) -> Self {
        Self { tuple, row }
    }

    /// Build a single-row object from key/value pairs; each value becomes a
    /// one-row literal column typed by its runtime type.
    pub fn from_pairs<K: Into<String>>(pairs: Vec<(K, Value)>) -> Result<Self> {
        let mut columns = Vec::with_capacity(pairs.len());
        let mut vectors = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let ty = value.runtime_type();
            columns.push(Column::new(key, ty.clone()));
            vectors.push(ValueVector::literal(value, ty, 1)?);
        }
        Ok(Self::new(TupleVector::of(Schema::new(columns), vectors)?, 0))
    }

    pub fn schema(&self) -> &Schema {
        self.tuple.schema()
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn tuple(&self) -> &TupleVector {
        &self.tuple
    }

    pub fn len(&self) -> usize {
        self.schema().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schema().is_empty()
    }

    /// Value of the first column named `name`; `None` when absent.
    pub fn get(&self, name: &str) -> Option<Value> {
        let idx = self.schema().index_of(name)?;
        self.tuple.column(idx).map(|c| c.get_any(self.row))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.schema()
            .iter()
            .zip(self.tuple.columns())
            .map(move |(c, v)| (c.name.as_str(), v.get_any(self.row)))
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in self.iter() {
            map.insert(name.to_string(), value.to_json());
        }
        serde_json::Value::Object(map)
    }
}

impl PartialEq for ObjectValue {
    fn eq(&self, other: &Self) -> bool {
        self.schema() == other.schema() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

/// Parse a decimal literal, naming the raw text on failure.
pub fn parse_decimal(text: &str) -> Result<BigDecimal> {
    text.trim()
        .parse::<BigDecimal>()
        .map_err(|e| Error::illegal_argument(format!("cannot parse '{text}' as decimal: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_normalize_to_one_representation() {
        let owned = Value::from(String::from("abc"));
        let borrowed = Value::from("abc");
        let cow = Value::from(Cow::Borrowed("abc"));
        let boxed = Value::from(Box::<str>::from("abc"));
        assert_eq!(owned, borrowed);
        assert_eq!(cow, boxed);
        assert!(matches!(owned, Value::String(_)));
    }

    #[test]
    fn default_value_is_null() {
        assert!(Value::default().is_null());
        assert_eq!(Value::from(None::<i32>), Value::default());
    }

    #[test]
    fn numeric_compare_widens() {
        assert_eq!(Value::Int(3).compare(&Value::Long(3)), Ordering::Equal);
        assert_eq!(Value::Float(2.5).compare(&Value::Int(3)), Ordering::Less);
        let dec = Value::Decimal(parse_decimal("0.1").unwrap());
        assert_eq!(dec.compare(&Value::Double(0.1)), Ordering::Equal);
        assert_eq!(Value::Null.compare(&Value::Int(i32::MIN)), Ordering::Less);
    }

    #[test]
    fn conforms_respects_declared_type() {
        assert!(Value::Int(1).conforms_to(&ResolvedType::Any));
        assert!(Value::Null.conforms_to(&ResolvedType::Int));
        assert!(!Value::from("x").conforms_to(&ResolvedType::Int));
    }

    #[test]
    fn object_from_pairs_reads_back() {
        let obj = ObjectValue::from_pairs(vec![("a", Value::Int(1)), ("b", Value::from("x"))])
            .unwrap();
        assert_eq!(obj.get("a"), Some(Value::Int(1)));
        assert_eq!(obj.get("b"), Some(Value::from("x")));
        assert_eq!(obj.get("c"), None);
        assert_eq!(obj.to_json(), serde_json::json!({"a": 1, "b": "x"}));
    }
}
