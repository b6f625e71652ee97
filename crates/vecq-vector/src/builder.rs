//! Append-only typed builders.
//!
//! A builder starts out literal: as long as every appended row equals the
//! first one (or every row is null) it only keeps that value and a count. The
//! first differing row materializes the run into allocator-issued buffers and
//! the builder continues row by row. `build` picks the representation.

use std::mem;

use bigdecimal::BigDecimal;
use vecq_core::prelude::*;
use vecq_mem::{BitBuffer, BufferAllocator, ObjectBuffer, PrimitiveBuffer};

use crate::slots::Slots;

/// Sequential writer producing one immutable `ValueVector`.
pub trait ValueVectorBuilder {
    /// Declared type of the vector being built.
    fn ty(&self) -> &ResolvedType;

    /// Rows appended so far.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put_null(&mut self);

    fn put_boolean(&mut self, value: bool) -> Result<()>;
    fn put_int(&mut self, value: i32) -> Result<()>;
    fn put_long(&mut self, value: i64) -> Result<()>;
    fn put_float(&mut self, value: f32) -> Result<()>;
    fn put_double(&mut self, value: f64) -> Result<()>;
    fn put_decimal(&mut self, value: BigDecimal) -> Result<()>;

    /// Append a boxed value; `Value::Null` appends a null row.
    fn put_any(&mut self, value: Value) -> Result<()>;

    /// Append every row of `source`, nulls included.
    fn copy(&mut self, source: &ValueVector) -> Result<()>;

    /// Append one row of `source`.
    fn copy_row(&mut self, source: &ValueVector, row: usize) -> Result<()>;

    /// Freeze the appended rows and reset the builder to empty.
    fn build(&mut self) -> Result<ValueVector>;
}

enum State<S: Slots> {
    Empty,
    Literal {
        value: Option<S::Item>,
        count: usize,
    },
    Buffer {
        slots: S,
        nulls: Option<BitBuffer>,
        len: usize,
    },
}

pub struct TypedBuilder<S: Slots> {
    allocator: BufferAllocator,
    ty: ResolvedType,
    state: State<S>,
}

pub type BooleanVectorBuilder = TypedBuilder<BitBuffer>;
pub type IntVectorBuilder = TypedBuilder<PrimitiveBuffer<i32>>;
pub type LongVectorBuilder = TypedBuilder<PrimitiveBuffer<i64>>;
pub type FloatVectorBuilder = TypedBuilder<PrimitiveBuffer<f32>>;
pub type DoubleVectorBuilder = TypedBuilder<PrimitiveBuffer<f64>>;
pub type DecimalVectorBuilder = TypedBuilder<ObjectBuffer<BigDecimal>>;
pub type ObjectVectorBuilder = TypedBuilder<ObjectBuffer<Value>>;

impl<S: Slots> TypedBuilder<S> {
    pub fn new(allocator: &BufferAllocator) -> Self {
        Self::with_type(allocator, S::default_type())
    }

    /// Builder with an explicit declared type. Only meaningful for the object
    /// builder (String, DateTime, Any and nested types).
    pub fn with_type(allocator: &BufferAllocator, ty: ResolvedType) -> Self {
        Self {
            allocator: allocator.clone(),
            ty,
            state: State::Empty,
        }
    }

    /// Whether the rows appended so far are held as a single literal run.
    pub fn is_literal(&self) -> bool {
        !matches!(self.state, State::Buffer { .. })
    }

    fn mismatch(&self, op: &str) -> Error {
        Error::illegal_argument(format!(
            "{op} is not supported by {} of type {}",
            S::NAME,
            self.ty
        ))
    }

    fn put_value(&mut self, op: &str, value: Value) -> Result<()> {
        if value.is_null() {
            self.push_run(None, 1);
            return Ok(());
        }
        match S::convert(&self.ty, value) {
            Some(item) => {
                self.push_run(Some(item), 1);
                Ok(())
            }
            None => Err(self.mismatch(op)),
        }
    }

    /// Append `count` copies of `item` (`None` = null).
    fn push_run(&mut self, item: Option<S::Item>, count: usize) {
        if count == 0 {
            return;
        }
        match &mut self.state {
            State::Empty => {
                self.state = State::Literal { value: item, count };
                return;
            }
            State::Literal { value, count: n } if same::<S>(value, &item) => {
                *n += count;
                return;
            }
            State::Literal { .. } => self.materialize(),
            State::Buffer { .. } => {}
        }
        if let State::Buffer { slots, nulls, len } = &mut self.state {
            for _ in 0..count {
                match &item {
                    Some(v) => slots.set(*len, v.clone()),
                    None => nulls
                        .get_or_insert_with(|| self.allocator.bits())
                        .set(*len, true),
                }
                *len += 1;
            }
        }
    }

    /// Turn the literal run into buffers.
    fn materialize(&mut self) {
        let State::Literal { value, count } = mem::replace(&mut self.state, State::Empty) else {
            return;
        };
        let mut slots = S::allocate(&self.allocator);
        let mut nulls = None;
        match value {
            Some(v) => {
                for row in 0..count {
                    slots.set(row, v.clone());
                }
            }
            None => {
                let mut mask = self.allocator.bits();
                mask.set_len(count);
                for row in 0..count {
                    mask.set(row, true);
                }
                nulls = Some(mask);
            }
        }
        self.state = State::Buffer {
            slots,
            nulls,
            len: count,
        };
    }

    fn check_source(&self, op: &str, source: &ValueVector) -> Result<()> {
        let src = source.ty();
        let compatible = if self.ty.storage() == StorageKind::Object {
            self.ty.is_assignable_from(src)
        } else {
            src.can_widen_to(&self.ty)
        };
        if compatible {
            Ok(())
        } else {
            Err(Error::illegal_argument(format!(
                "{op} of a {src} vector is not supported by {} of type {}",
                S::NAME,
                self.ty
            )))
        }
    }
}

fn same<S: Slots>(a: &Option<S::Item>, b: &Option<S::Item>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => S::same(a, b),
        _ => false,
    }
}

impl<S: Slots> ValueVectorBuilder for TypedBuilder<S> {
    fn ty(&self) -> &ResolvedType {
        &self.ty
    }

    fn len(&self) -> usize {
        match &self.state {
            State::Empty => 0,
            State::Literal { count, .. } => *count,
            State::Buffer { len, .. } => *len,
        }
    }

    fn put_null(&mut self) {
        self.push_run(None, 1);
    }

    fn put_boolean(&mut self, value: bool) -> Result<()> {
        self.put_value("put_boolean", Value::Boolean(value))
    }

    fn put_int(&mut self, value: i32) -> Result<()> {
        self.put_value("put_int", Value::Int(value))
    }

    fn put_long(&mut self, value: i64) -> Result<()> {
        self.put_value("put_long", Value::Long(value))
    }

    fn put_float(&mut self, value: f32) -> Result<()> {
        self.put_value("put_float", Value::Float(value))
    }

    fn put_double(&mut self, value: f64) -> Result<()> {
        self.put_value("put_double", Value::Double(value))
    }

    fn put_decimal(&mut self, value: BigDecimal) -> Result<()> {
        self.put_value("put_decimal", Value::Decimal(value))
    }

    fn put_any(&mut self, value: Value) -> Result<()> {
        self.put_value("put_any", value)
    }

    fn copy(&mut self, source: &ValueVector) -> Result<()> {
        self.check_source("copy", source)?;
        if let Some(value) = source.literal_value() {
            let item = if value.is_null() {
                None
            } else {
                Some(S::convert(&self.ty, value.clone()).ok_or_else(|| self.mismatch("copy"))?)
            };
            self.push_run(item, source.size());
            return Ok(());
        }
        for row in 0..source.size() {
            self.put_value("copy", source.get_any(row))?;
        }
        Ok(())
    }

    fn copy_row(&mut self, source: &ValueVector, row: usize) -> Result<()> {
        self.check_source("copy_row", source)?;
        self.put_value("copy_row", source.get_any(row))
    }

    fn build(&mut self) -> Result<ValueVector> {
        match mem::replace(&mut self.state, State::Empty) {
            State::Empty => Ok(ValueVector::empty(self.ty.clone())),
            State::Literal { value: None, count } => {
                Ok(ValueVector::literal_null(self.ty.clone(), count))
            }
            State::Literal {
                value: Some(v),
                count,
            } => ValueVector::literal(S::to_value(v), self.ty.clone(), count),
            State::Buffer { slots, nulls, len } => {
                let nulls = nulls.map(|mut mask| {
                    mask.set_len(len);
                    mask.freeze()
                });
                ValueVector::from_buffer(self.ty.clone(), slots.into_data(len), nulls)
            }
        }
    }
}
