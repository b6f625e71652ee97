//! CSV and JSON Lines reader/writer tests

mod test_data_gen;

use std::io::Cursor;

use vecq_core::prelude::*;
use vecq_functions::{AggregateMode, ExecutionContext, Expression, ScalarFunction};
use vecq_functions::aggregate::Sum;
use vecq_io::{CsvOptions, CsvReader, IoError, JsonLinesReader, JsonlWriter};
use vecq_vector::VectorFactory;
use test_data_gen::{column_values, decimal, ints};

const ORDERS: &str = "\
id,qty,price,note
1,3,9.99,first
2,,0.50,
3,4,12.00,\"quoted, note\"
";

fn order_schema() -> Schema {
    Schema::of([
        ("id", ResolvedType::Int),
        ("qty", ResolvedType::Long),
        ("price", ResolvedType::Decimal),
        ("note", ResolvedType::String),
    ])
}

#[test]
fn test_csv_typed_columns_and_batching() {
    let options = CsvOptions::default()
        .with_schema(order_schema())
        .with_batch_size(2);
    let reader = CsvReader::from_reader(ORDERS.as_bytes(), options, VectorFactory::default())
        .expect("reader");
    let batches: Vec<TupleVector> = reader.collect::<vecq_io::Result<_>>().expect("read all");

    assert_eq!(batches.iter().map(|b| b.row_count()).collect::<Vec<_>>(), vec![2, 1]);
    let first = &batches[0];
    assert_eq!(first.schema(), &order_schema());
    assert_eq!(column_values(first, "qty"), vec![Value::Long(3), Value::Null]);
    assert_eq!(first.columns()[2].get_decimal(1), decimal("0.50"));
    // String columns keep empty fields as empty strings
    assert_eq!(column_values(first, "note"), vec![Value::from("first"), Value::from("")]);
    assert_eq!(&*batches[1].columns()[3].get_string(0), "quoted, note");
}

#[test]
fn test_csv_schema_must_match_header() {
    let options = CsvOptions::default().with_schema(Schema::of([("id", ResolvedType::Int)]));
    let err = CsvReader::from_reader(ORDERS.as_bytes(), options, VectorFactory::default())
        .err()
        .expect("column count mismatch");
    assert!(matches!(err, IoError::Data(_)), "{err}");
}

#[test]
fn test_csv_zero_batch_size_is_config_error() {
    let options = CsvOptions::default().with_batch_size(0);
    let err = CsvReader::from_reader(ORDERS.as_bytes(), options, VectorFactory::default())
        .err()
        .expect("zero batch size");
    assert!(matches!(err, IoError::Core(Error::Config(_))), "{err}");
}

#[test]
fn test_csv_batch_feeds_aggregation() {
    let options = CsvOptions::default().with_schema(order_schema());
    let mut reader = CsvReader::from_reader(ORDERS.as_bytes(), options, VectorFactory::default())
        .expect("reader");
    let batch = reader.next_batch().expect("read").expect("batch");

    let ctx = ExecutionContext::default();
    let groups = GroupIndices::from_groups(&[&[0, 1, 2]]);
    let mut total = Sum
        .create_aggregator(AggregateMode::All, None, &[Expression::column("price")])
        .expect("sum");
    total
        .append_group(&ctx, &batch, &ints(&[Some(0)]), &groups)
        .expect("append_group");
    let total = total.combine(&ctx).expect("combine");
    assert_eq!(total.get_decimal(0), decimal("22.49"));
}

#[test]
fn test_jsonl_schema_evolves_across_lines() {
    let text = "{\"a\":1}\n\n{\"b\":\"x\",\"a\":2.5}\n{\"c\":[1,2]}\n";
    let mut reader = JsonLinesReader::new(Cursor::new(text), VectorFactory::default());
    let batch = reader.next_batch().expect("read").expect("batch");
    assert!(reader.next_batch().expect("eof").is_none());

    assert_eq!(batch.row_count(), 3);
    assert_eq!(batch.schema().column_names(), vec!["a", "b", "c"]);
    assert_eq!(
        column_values(&batch, "a"),
        vec![Value::Long(1), Value::Double(2.5), Value::Null]
    );
    assert_eq!(
        column_values(&batch, "b"),
        vec![Value::Null, Value::from("x"), Value::Null]
    );
    let tags = batch.column_by_name("c").expect("c").get_array(2).expect("array");
    assert_eq!(tags.iter().collect::<Vec<_>>(), vec![Value::Long(1), Value::Long(2)]);
}

#[test]
fn test_jsonl_rejects_non_objects_with_line_number() {
    let text = "{\"a\":1}\n[1,2]\n";
    let mut reader = JsonLinesReader::new(Cursor::new(text), VectorFactory::default());
    match reader.next_batch() {
        Err(IoError::Data(msg)) => {
            assert!(msg.contains("line 2"), "{msg}");
            assert!(msg.contains("[1,2]"), "{msg}");
        }
        other => panic!("expected a data error, got {other:?}"),
    }
}

#[test]
fn test_jsonl_batches_respect_batch_size() {
    let text: String = (0..5).map(|i| format!("{{\"n\":{i}}}\n")).collect();
    let reader = JsonLinesReader::new(Cursor::new(text), VectorFactory::default())
        .with_batch_size(2);
    let sizes: Vec<usize> = reader
        .map(|batch| batch.expect("batch").row_count())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);
}

#[test]
fn test_jsonl_write_then_read_back() {
    let path = std::env::temp_dir().join(format!("vecq-io-{}.jsonl", std::process::id()));
    let text = "{\"id\":1,\"tags\":[\"x\"]}\n{\"id\":2,\"tags\":null}\n";
    let batch = JsonLinesReader::new(Cursor::new(text), VectorFactory::default())
        .next_batch()
        .expect("read")
        .expect("batch");

    let mut writer = JsonlWriter::to_path(&path).expect("create");
    writer.write_batch(&batch).expect("write");
    assert_eq!(writer.rows_written(), 2);
    drop(writer);

    let written = std::fs::read_to_string(&path).expect("read file");
    assert_eq!(written, text);

    let reread = JsonLinesReader::from_path(&path, VectorFactory::default())
        .expect("open")
        .next_batch()
        .expect("read")
        .expect("batch");
    assert_eq!(column_values(&reread, "id"), column_values(&batch, "id"));
    std::fs::remove_file(&path).expect("cleanup");
}
