//! Resolved types, columns and schemas. Pure data.
//!
//! A `ResolvedType` is a closed tag over the primitive kinds plus the nested
//! Array/Table/Object kinds, each of which carries its element type or schema.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolvedType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    String,
    /// Epoch milliseconds, UTC.
    DateTime,
    Any,
    Array(Box<ResolvedType>),
    Table(Schema),
    Object(Schema),
    OutputWritable,
}

/// Physical storage used by a buffer-backed vector of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    /// Boxed `Value`s (strings, date-times, nested and any-typed values).
    Object,
}

impl ResolvedType {
    pub fn array(element: ResolvedType) -> Self {
        ResolvedType::Array(Box::new(element))
    }

    pub fn storage(&self) -> StorageKind {
        match self {
            ResolvedType::Boolean => StorageKind::Boolean,
            ResolvedType::Int => StorageKind::Int,
            ResolvedType::Long => StorageKind::Long,
            ResolvedType::Float => StorageKind::Float,
            ResolvedType::Double => StorageKind::Double,
            ResolvedType::Decimal => StorageKind::Decimal,
            _ => StorageKind::Object,
        }
    }

    /// Position in the widening order Int < Long < Float < Double < Decimal.
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            ResolvedType::Int => Some(0),
            ResolvedType::Long => Some(1),
            ResolvedType::Float => Some(2),
            ResolvedType::Double => Some(3),
            ResolvedType::Decimal => Some(4),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    pub fn is_nested(&self) -> bool {
        matches!(
            self,
            ResolvedType::Array(_) | ResolvedType::Table(_) | ResolvedType::Object(_)
        )
    }

    /// Static numeric widening of two types, `None` when either is not numeric.
    pub fn widen(a: &ResolvedType, b: &ResolvedType) -> Option<ResolvedType> {
        let (ra, rb) = (a.numeric_rank()?, b.numeric_rank()?);
        Some(if ra >= rb { a.clone() } else { b.clone() })
    }

    /// True when values of `self` can be copied into `target` by numeric widening
    /// (or exact match).
    pub fn can_widen_to(&self, target: &ResolvedType) -> bool {
        if self == target {
            return true;
        }
        match (self.numeric_rank(), target.numeric_rank()) {
            (Some(from), Some(to)) => from <= to,
            _ => false,
        }
    }

    /// Common supertype used when two sources disagree: numeric widening,
    /// otherwise `Any`.
    pub fn common_type(a: &ResolvedType, b: &ResolvedType) -> ResolvedType {
        if a == b {
            return a.clone();
        }
        ResolvedType::widen(a, b).unwrap_or(ResolvedType::Any)
    }

    /// Whether a column declared as `self` may hold a runtime vector of type
    /// `actual`. Primitives require an exact match; `Any` accepts everything and
    /// nested types are compared structurally. Never the reverse (a declared Int
    /// does not accept an actual Any).
    pub fn is_assignable_from(&self, actual: &ResolvedType) -> bool {
        if self == actual || *self == ResolvedType::Any {
            return true;
        }
        match (self, actual) {
            (ResolvedType::Array(declared), ResolvedType::Array(actual)) => {
                declared.is_assignable_from(actual)
            }
            (ResolvedType::Table(declared), ResolvedType::Table(actual))
            | (ResolvedType::Object(declared), ResolvedType::Object(actual)) => {
                declared.is_assignable_from(actual)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Boolean => write!(f, "Boolean"),
            ResolvedType::Int => write!(f, "Int"),
            ResolvedType::Long => write!(f, "Long"),
            ResolvedType::Float => write!(f, "Float"),
            ResolvedType::Double => write!(f, "Double"),
            ResolvedType::Decimal => write!(f, "Decimal"),
            ResolvedType::String => write!(f, "String"),
            ResolvedType::DateTime => write!(f, "DateTime"),
            ResolvedType::Any => write!(f, "Any"),
            ResolvedType::Array(element) => write!(f, "Array<{element}>"),
            ResolvedType::Table(schema) => write!(f, "Table{schema}"),
            ResolvedType::Object(schema) => write!(f, "Object{schema}"),
            ResolvedType::OutputWritable => write!(f, "OutputWritable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: ResolvedType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: ResolvedType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered columns. Names need not be unique; lookups pick the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub const EMPTY: Schema = Schema {
        columns: Vec::new(),
    };

    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn of<const N: usize>(columns: [(&str, ResolvedType); N]) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, ty)| Column::new(name, ty))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Same column count and names, each declared type assignable from the other's.
    pub fn is_assignable_from(&self, actual: &Schema) -> bool {
        self.columns.len() == actual.columns.len()
            && self
                .columns
                .iter()
                .zip(actual.columns.iter())
                .all(|(d, a)| d.name == a.name && d.data_type.is_assignable_from(&a.data_type))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", c.name, c.data_type)?;
        }
        write!(f, ")")
    }
}

impl FromIterator<Column> for Schema {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Schema::new(iter.into_iter().collect())
    }
}
