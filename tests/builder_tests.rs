//! Typed builder tests (literal collapse, copy, widening, setter mismatch)

mod test_data_gen;

use vecq_core::prelude::*;
use vecq_mem::BufferAllocator;
use vecq_vector::{
    BooleanVectorBuilder, DoubleVectorBuilder, IntVectorBuilder, ObjectVectorBuilder,
    ValueVectorBuilder, VectorFactory,
};
use test_data_gen::{booleans, floats, ints, longs, small_allocator, vector};

#[test]
fn test_equal_values_collapse_to_literal() {
    let allocator = small_allocator(1);
    let mut builder = IntVectorBuilder::new(&allocator);
    for _ in 0..5 {
        builder.put_int(42).expect("put_int");
    }
    let built = builder.build().expect("build");

    assert!(built.is_literal(), "repeated value should stay literal");
    assert_eq!(built.size(), 5);
    assert!((0..5).all(|row| built.get_int(row) == 42));
    assert_eq!(allocator.statistics().primitive_allocation_count, 0);
}

#[test]
fn test_all_nulls_collapse_to_literal_null() {
    let allocator = small_allocator(1);
    let mut builder = ObjectVectorBuilder::with_type(&allocator, ResolvedType::String);
    builder.put_null();
    builder.put_null();
    let built = builder.build().expect("build");

    assert!(built.is_literal());
    assert!(built.is_null(0) && built.is_null(1));
    assert_eq!(allocator.statistics().object_allocation_count, 0);
}

#[test]
fn test_mixed_nulls_and_values_use_buffer() {
    let mut builder = IntVectorBuilder::new(&BufferAllocator::default());
    builder.put_int(7).expect("put_int");
    builder.put_null();
    builder.put_int(7).expect("put_int");
    let built = builder.build().expect("build");

    assert!(!built.is_literal());
    assert_eq!(built.get_int(0), 7);
    assert!(built.is_null(1));
    assert_eq!(built.get_int(2), 7);
}

#[test]
fn test_copy_round_trip_preserves_nulls() {
    let factory = VectorFactory::new(small_allocator(2));
    let sources = vec![
        booleans(&[Some(true), None, Some(false), Some(true)]),
        ints(&[Some(1), None, Some(-3), None]),
        longs(&[None, Some(i64::MAX), Some(0)]),
        floats(&[Some(1.5), None, Some(-0.25)]),
        vector(
            ResolvedType::Double,
            vec![Value::Double(2.0), Value::Null, Value::Double(f64::MIN)],
        ),
        vector(
            ResolvedType::Any,
            vec![Value::from("a"), Value::Null, Value::Int(3), Value::Boolean(false)],
        ),
    ];

    for source in sources {
        let mut builder = factory.builder(source.ty());
        builder.copy(&source).expect("copy");
        let copied = builder.build().expect("build");
        assert_eq!(copied, source, "round trip of {} vector", source.ty());
    }
}

#[test]
fn test_copy_of_literal_source_stays_literal() {
    let mut builder = IntVectorBuilder::new(&BufferAllocator::default());
    builder
        .copy(&ValueVector::literal_int(9, 1000))
        .expect("copy literal");
    let built = builder.build().expect("build");
    assert!(built.is_literal());
    assert_eq!(built.size(), 1000);
}

#[test]
fn test_float_copied_into_double_builder_widens() {
    let source = floats(&[Some(0.1), None, Some(-3.5)]);
    let mut builder = DoubleVectorBuilder::new(&BufferAllocator::default());
    builder.copy(&source).expect("copy float into double");
    let widened = builder.build().expect("build");

    assert_eq!(widened.ty(), &ResolvedType::Double);
    assert_eq!(widened.size(), 3);
    assert_eq!(widened.get_double(0), f64::from(0.1f32));
    assert!(widened.is_null(1));
    assert_eq!(widened.get_double(2), -3.5);
}

#[test]
fn test_narrowing_copy_is_rejected() {
    let mut builder = IntVectorBuilder::new(&BufferAllocator::default());
    let err = builder
        .copy(&longs(&[Some(1)]))
        .expect_err("long into int must fail");
    assert!(matches!(err, Error::IllegalArgument(_)));
}

#[test]
fn test_setter_type_mismatch_names_builder() {
    let mut builder = BooleanVectorBuilder::new(&BufferAllocator::default());
    let err = builder.put_int(1).expect_err("int into boolean must fail");
    match err {
        Error::IllegalArgument(msg) => {
            assert!(msg.contains("put_int"), "{msg}");
            assert!(msg.contains("BooleanVectorBuilder"), "{msg}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_build_resets_for_reuse() {
    let mut builder = IntVectorBuilder::new(&BufferAllocator::default());
    builder.put_int(1).expect("put_int");
    builder.put_int(2).expect("put_int");
    let first = builder.build().expect("first build");
    assert_eq!(first.size(), 2);

    assert!(builder.is_empty());
    builder.put_int(3).expect("put_int");
    let second = builder.build().expect("second build");
    assert_eq!(second.size(), 1);
    assert_eq!(second.get_int(0), 3);
}
