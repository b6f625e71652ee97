//! Shared fixtures for integration tests.

#![allow(dead_code)]

use bigdecimal::BigDecimal;
use vecq_core::config::AllocatorSettings;
use vecq_core::prelude::*;
use vecq_core::value::parse_decimal;
use vecq_mem::BufferAllocator;

/// Allocator with a small allocation granularity so growth is observable.
pub fn small_allocator(bit_size: usize) -> BufferAllocator {
    BufferAllocator::new(AllocatorSettings::with_bit_size(bit_size).expect("bit size"))
}

pub fn decimal(text: &str) -> BigDecimal {
    parse_decimal(text).expect("decimal literal")
}

pub fn vector(ty: ResolvedType, values: Vec<Value>) -> ValueVector {
    ValueVector::from_values(ty, values).expect("vector from values")
}

pub fn ints(values: &[Option<i32>]) -> ValueVector {
    vector(
        ResolvedType::Int,
        values.iter().map(|v| Value::from(*v)).collect(),
    )
}

pub fn longs(values: &[Option<i64>]) -> ValueVector {
    vector(
        ResolvedType::Long,
        values.iter().map(|v| Value::from(*v)).collect(),
    )
}

pub fn floats(values: &[Option<f32>]) -> ValueVector {
    vector(
        ResolvedType::Float,
        values.iter().map(|v| Value::from(*v)).collect(),
    )
}

pub fn booleans(values: &[Option<bool>]) -> ValueVector {
    vector(
        ResolvedType::Boolean,
        values.iter().map(|v| Value::from(*v)).collect(),
    )
}

/// Tuple whose schema is taken from the columns' own types.
pub fn tuple(columns: Vec<(&str, ValueVector)>) -> TupleVector {
    let schema = columns
        .iter()
        .map(|(name, v)| Column::new(*name, v.ty().clone()))
        .collect();
    let vectors = columns.into_iter().map(|(_, v)| v).collect();
    TupleVector::of(schema, vectors).expect("tuple vector")
}

/// Rows `0..n` of `column` as boxed values.
pub fn column_values(tuple: &TupleVector, name: &str) -> Vec<Value> {
    tuple
        .column_by_name(name)
        .expect("column present")
        .iter()
        .collect()
}
