//! Grouped aggregation tests (promotion, overflow, null policy, modes)

mod test_data_gen;

use vecq_core::prelude::*;
use vecq_functions::aggregate::{Avg, Count, Max, Min, Sum};
use vecq_functions::{AggregateMode, ExecutionContext, Expression, FunctionError, ScalarFunction};
use test_data_gen::{decimal, ints, tuple, vector};

/// `[10, 20, -20F, -200D, 10000000 x4, null x4, 100.10, -200.10, 2000.10, null]`
fn mixed_input() -> TupleVector {
    let mut values = vec![
        Value::Int(10),
        Value::Int(20),
        Value::Float(-20.0),
        Value::Double(-200.0),
    ];
    values.extend(std::iter::repeat(Value::Int(10_000_000)).take(4));
    values.extend(std::iter::repeat(Value::Null).take(4));
    values.extend([
        Value::Decimal(decimal("100.10")),
        Value::Decimal(decimal("-200.10")),
        Value::Decimal(decimal("2000.10")),
        Value::Null,
    ]);
    tuple(vec![("v", vector(ResolvedType::Any, values))])
}

fn base_rows(groups: &GroupIndices) -> ValueVector {
    let bases: Vec<Option<i32>> = groups
        .iter()
        .map(|rows| Some(rows.first().map_or(0, |&r| r as i32)))
        .collect();
    ints(&bases)
}

fn four_groups() -> GroupIndices {
    GroupIndices::from_groups(&[&[0, 1, 2, 3], &[4, 5, 6, 7], &[8, 9, 10, 11], &[12, 13, 14, 15]])
}

#[test]
fn test_average_promotes_per_group() {
    let ctx = ExecutionContext::default();
    let input = mixed_input();
    let groups = four_groups();
    let mut aggregator = Avg
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("avg aggregator");
    aggregator
        .append_group(&ctx, &input, &base_rows(&groups), &groups)
        .expect("append_group");
    let result = aggregator.combine(&ctx).expect("combine");

    assert_eq!(result.size(), 4);
    assert_eq!(result.get_any(0), Value::Double(-47.5));
    assert_eq!(result.get_any(1), Value::Int(10_000_000));
    assert!(result.is_null(2));
    match result.get_any(3) {
        Value::Decimal(avg) => assert_eq!(avg.to_string(), "633.37"),
        other => panic!("expected a decimal average, got {other}"),
    }
}

#[test]
fn test_second_append_folds_into_new_group() {
    let ctx = ExecutionContext::default();
    let input = mixed_input();
    let mut aggregator = Avg
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("avg aggregator");

    let first = four_groups();
    aggregator
        .append_group(&ctx, &input, &base_rows(&first), &first)
        .expect("first append");

    // Same input, different grouping: ordinals 0..3 get nothing new, ordinal 4
    // is a fresh group over rows without any decimal.
    let second = GroupIndices::from_groups(&[&[], &[], &[], &[], &[0, 2, 3]]);
    aggregator
        .append_group(&ctx, &input, &base_rows(&second), &second)
        .expect("second append");
    let result = aggregator.combine(&ctx).expect("combine");

    assert_eq!(result.size(), 5);
    assert_eq!(result.get_any(0), Value::Double(-47.5));
    assert_eq!(result.get_any(1), Value::Int(10_000_000));
    assert!(result.is_null(2));
    assert_eq!(result.get_any(4), Value::Double(-70.0));
}

#[test]
fn test_second_append_folds_into_existing_group() {
    let ctx = ExecutionContext::default();
    let input = tuple(vec![(
        "v",
        vector(
            ResolvedType::Double,
            vec![Value::Double(0.1), Value::Double(488.5), Value::Double(244.3)],
        ),
    )]);
    let mut aggregator = Avg
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("avg aggregator");
    let first = GroupIndices::from_groups(&[&[0, 1]]);
    aggregator
        .append_group(&ctx, &input, &base_rows(&first), &first)
        .expect("first append");
    let second = GroupIndices::from_groups(&[&[2]]);
    aggregator
        .append_group(&ctx, &input, &base_rows(&second), &second)
        .expect("second append");
    let result = aggregator.combine(&ctx).expect("combine");

    let expected = (0.1 + 488.5 + 244.3) / 3.0;
    assert!((result.get_double(0) - expected).abs() < 1e-9);
}

#[test]
fn test_int_sum_overflow_fails() {
    let ctx = ExecutionContext::default();
    let third = i32::MAX / 3;
    let input = tuple(vec![(
        "v",
        ints(&[Some(third), Some(third), Some(third), Some(third)]),
    )]);
    let groups = GroupIndices::from_groups(&[&[0, 1, 2, 3]]);
    let mut aggregator = Sum
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("sum aggregator");
    let err = aggregator
        .append_group(&ctx, &input, &base_rows(&groups), &groups)
        .expect_err("overflow");
    assert!(matches!(err, FunctionError::Arithmetic(_)), "{err}");
}

#[test]
fn test_int_sum_within_range() {
    let ctx = ExecutionContext::default();
    let third = i32::MAX / 3;
    let input = tuple(vec![("v", ints(&[Some(third), Some(third), Some(third)]))]);
    let groups = GroupIndices::from_groups(&[&[0, 1, 2]]);
    let mut aggregator = Sum
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("sum aggregator");
    aggregator
        .append_group(&ctx, &input, &base_rows(&groups), &groups)
        .expect("append_group");
    let result = aggregator.combine(&ctx).expect("combine");
    assert_eq!(result.ty(), &ResolvedType::Int);
    assert_eq!(result.get_int(0), third * 3);
}

#[test]
fn test_long_literal_sum_overflow_fails_without_iterating() {
    let ctx = ExecutionContext::default();
    let rows = i32::MAX as usize;
    let input = tuple(vec![(
        "xs",
        ValueVector::literal_array(ValueVector::literal_long(i64::MAX, rows), 1),
    )]);
    let err = Sum
        .eval_scalar(&ctx, &input, None, &[Expression::column("xs")])
        .expect_err("overflow");
    assert!(matches!(err, FunctionError::Arithmetic(_)), "{err}");
}

#[test]
fn test_count_null_policy() {
    let ctx = ExecutionContext::default();
    let input = mixed_input();
    let groups = four_groups();

    let mut by_column = Count
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("count(v)");
    by_column
        .append_group(&ctx, &input, &base_rows(&groups), &groups)
        .expect("append_group");
    let counts = by_column.combine(&ctx).expect("combine");
    let counts: Vec<i64> = (0..4).map(|g| counts.get_long(g)).collect();
    assert_eq!(counts, vec![4, 4, 0, 3]);

    let mut rows = Count
        .create_aggregator(AggregateMode::All, None, &[Expression::Asterisk])
        .expect("count(*)");
    rows.append_group(&ctx, &input, &base_rows(&groups), &groups)
        .expect("append_group");
    let rows = rows.combine(&ctx).expect("combine");
    assert!((0..4).all(|g| rows.get_long(g) == 4));
}

#[test]
fn test_count_distinct() {
    let ctx = ExecutionContext::default();
    let input = tuple(vec![(
        "v",
        vector(
            ResolvedType::Any,
            vec![
                Value::Int(1),
                Value::Long(1),
                Value::from("a"),
                Value::Null,
                Value::from("a"),
                Value::Double(2.5),
            ],
        ),
    )]);
    let groups = GroupIndices::from_groups(&[&[0, 1, 2, 3, 4, 5]]);
    let mut aggregator = Count
        .create_aggregator(AggregateMode::Distinct, None, &[Expression::column("v")])
        .expect("count distinct");
    aggregator
        .append_group(&ctx, &input, &base_rows(&groups), &groups)
        .expect("append_group");
    let result = aggregator.combine(&ctx).expect("combine");
    // 1 and 1L compare equal after widening
    assert_eq!(result.get_long(0), 3);
}

#[test]
fn test_distinct_unsupported_before_data() {
    let args = [Expression::column("v")];
    for function in [
        &Sum as &dyn ScalarFunction,
        &Avg as &dyn ScalarFunction,
        &Min as &dyn ScalarFunction,
        &Max as &dyn ScalarFunction,
    ] {
        let err = function
            .create_aggregator(AggregateMode::Distinct, None, &args)
            .err()
            .expect("distinct must be rejected");
        assert!(matches!(err, FunctionError::Unsupported(_)), "{}", function.name());
    }
}

#[test]
fn test_min_max_skip_nulls_and_widen() {
    let ctx = ExecutionContext::default();
    let input = mixed_input();
    let groups = four_groups();
    let mut min = Min
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("min");
    let mut max = Max
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("max");
    for aggregator in [&mut min, &mut max] {
        aggregator
            .append_group(&ctx, &input, &base_rows(&groups), &groups)
            .expect("append_group");
    }
    let min = min.combine(&ctx).expect("combine min");
    let max = max.combine(&ctx).expect("combine max");

    assert_eq!(min.get_any(0), Value::Double(-200.0));
    assert_eq!(max.get_any(0), Value::Int(20));
    assert!(min.is_null(2) && max.is_null(2));
    assert_eq!(max.get_any(3), Value::Decimal(decimal("2000.10")));
}

#[test]
fn test_group_base_rows_must_match_group_count() {
    let ctx = ExecutionContext::default();
    let input = mixed_input();
    let groups = four_groups();
    let mut aggregator = Sum
        .create_aggregator(AggregateMode::All, None, &[Expression::column("v")])
        .expect("sum aggregator");
    let err = aggregator
        .append_group(&ctx, &input, &ints(&[Some(0)]), &groups)
        .expect_err("one base row for four groups");
    assert!(matches!(err, FunctionError::Argument(_)));
}
