use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vecq_core::prelude::*;
use vecq_functions::aggregate::Sum;
use vecq_functions::{AggregateMode, ExecutionContext, Expression, ScalarFunction};
use vecq_vector::{ValueVectorBuilder, VectorFactory};

const ROWS: usize = 4096;
const GROUPS: usize = 16;

fn make_batch(rows: usize) -> TupleVector {
    let factory = VectorFactory::default();
    let mut ids = factory.builder(&ResolvedType::Int);
    let mut values = factory.builder(&ResolvedType::Double);
    for i in 0..rows {
        ids.put_int(i as i32).unwrap();
        if i % 7 == 0 {
            values.put_null();
        } else {
            values.put_double((i % 10) as f64).unwrap();
        }
    }
    TupleVector::of(
        Schema::of([("id", ResolvedType::Int), ("value", ResolvedType::Double)]),
        vec![ids.build().unwrap(), values.build().unwrap()],
    )
    .unwrap()
}

fn bench_builder(c: &mut Criterion) {
    let factory = VectorFactory::default();
    c.bench_function("long_builder_4k", |b| {
        b.iter(|| {
            let mut builder = factory.builder(&ResolvedType::Long);
            for i in 0..ROWS as i64 {
                builder.put_long(black_box(i)).unwrap();
            }
            builder.build().unwrap()
        })
    });

    let batch = make_batch(ROWS);
    c.bench_function("tuple_builder_append_4k", |b| {
        b.iter(|| {
            let mut builder = factory.tuple_builder();
            builder.append(black_box(&batch)).unwrap();
            builder.build().unwrap()
        })
    });
}

fn bench_grouped_sum(c: &mut Criterion) {
    let batch = make_batch(ROWS);
    let mut groups = GroupIndices::new();
    for g in 0..GROUPS {
        groups.push_group((g..ROWS).step_by(GROUPS).map(|r| r as u32));
    }
    let base_rows = ValueVector::from_values(
        ResolvedType::Int,
        (0..GROUPS as i32).map(Value::Int).collect(),
    )
    .unwrap();
    let ctx = ExecutionContext::default();
    let arguments = [Expression::column("value")];

    c.bench_function("grouped_sum_4k_16", |b| {
        b.iter(|| {
            let mut aggregator = Sum
                .create_aggregator(AggregateMode::All, None, &arguments)
                .unwrap();
            aggregator
                .append_group(&ctx, &batch, &base_rows, &groups)
                .unwrap();
            aggregator.combine(&ctx).unwrap()
        })
    });
}

criterion_group!(vectors, bench_builder, bench_grouped_sum);
criterion_main!(vectors);
