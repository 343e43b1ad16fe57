use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use tabconv::io::csv::DecodeOptions;
use tabconv::testing::*;
use tabconv::{
    check_schema, infer_schema, schemas_match, validate_batch_schema, MismatchKind,
    SchemaMismatch, TarArchive,
};

fn schema(fields: &[(&str, DataType)]) -> Schema {
    Schema::new(
        fields
            .iter()
            .map(|(n, t)| Field::new(*n, t.clone(), true))
            .collect::<Vec<_>>(),
    )
}

#[test]
fn equality_is_reflexive() {
    let s = schema(&[("id", DataType::Int64), ("name", DataType::Utf8)]);
    assert!(schemas_match(&s, &s));
}

#[test]
fn equality_is_order_sensitive() {
    let a = schema(&[("id", DataType::Int64), ("name", DataType::Utf8)]);
    let b = schema(&[("name", DataType::Utf8), ("id", DataType::Int64)]);
    let err = check_schema(&b, &a).unwrap_err();
    assert_eq!(err.kind, MismatchKind::ColumnName);
    assert_eq!(err.position, Some(0));
}

#[test]
fn count_is_checked_first() {
    let expected = schema(&[("id", DataType::Int64), ("v", DataType::Int64)]);
    let actual = schema(&[("x", DataType::Utf8)]);
    let err = check_schema(&actual, &expected).unwrap_err();
    assert_eq!(err.kind, MismatchKind::ColumnCount);
    assert_eq!(err.position, None);
    assert_eq!(
        err.to_string(),
        "schema column count mismatch: expected 2 columns, got 1"
    );
}

#[test]
fn names_are_checked_before_types() {
    let expected = schema(&[("id", DataType::Int64), ("v", DataType::Int64)]);
    let actual = schema(&[("id", DataType::Utf8), ("w", DataType::Int64)]);
    let err = check_schema(&actual, &expected).unwrap_err();
    assert_eq!(err.kind, MismatchKind::ColumnName);
    assert_eq!(err.position, Some(1));
    assert_eq!(
        err.to_string(),
        "schema column name mismatch at position 1: expected 'v', got 'w'"
    );
}

#[test]
fn type_mismatch_reports_column() {
    let expected = schema(&[("id", DataType::Int64), ("v", DataType::Int64)]);
    let actual = schema(&[("id", DataType::Int64), ("v", DataType::Utf8)]);
    let err = check_schema(&actual, &expected).unwrap_err();
    assert_eq!(err.kind, MismatchKind::ColumnType);
    assert_eq!(err.position, Some(1));
    assert_eq!(
        err.to_string(),
        "schema type mismatch for column 'v': expected Int64, got Utf8"
    );
    assert_eq!(err.expected.fields().len(), 2);
}

#[test]
fn nullability_is_ignored() {
    let a = Schema::new(vec![Field::new("id", DataType::Int64, true)]);
    let b = Schema::new(vec![Field::new("id", DataType::Int64, false)]);
    assert!(schemas_match(&a, &b));
}

#[test]
fn batch_validation_downcasts() -> anyhow::Result<()> {
    let s = Arc::new(schema(&[("id", DataType::Int64), ("name", DataType::Utf8)]));
    let batch = RecordBatch::try_new(
        s.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec!["a", "b"])),
        ],
    )?;
    validate_batch_schema(&batch, &s)?;

    let other = schema(&[("id", DataType::Int64)]);
    let err = validate_batch_schema(&batch, &other).unwrap_err();
    let mismatch = err.downcast_ref::<SchemaMismatch>().expect("typed error");
    assert_eq!(mismatch.kind, MismatchKind::ColumnCount);
    Ok(())
}

#[test]
fn infers_from_first_rows_only() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("a.tar.gz");
    // the sixth row would widen `id` to text if it were sampled
    let csv = "id,v\n1,a\n2,b\n3,c\n4,d\n5,e\nnot-a-number,f\n";
    build_tar_gz(&path, &[("a.csv", csv.as_bytes())])?;

    let archive = TarArchive::open(&path)?;
    let s = infer_schema(&archive, "a.csv", 5, DecodeOptions::default())?;
    assert_eq!(s.field(0).name(), "id");
    assert_eq!(s.field(0).data_type(), &DataType::Int64);
    assert_eq!(s.field(1).data_type(), &DataType::Utf8);

    let s = infer_schema(&archive, "a.csv", 1000, DecodeOptions::default())?;
    assert_eq!(s.field(0).data_type(), &DataType::Utf8);
    Ok(())
}

#[test]
fn header_only_member_falls_back_to_header_names() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("a.tar.gz");
    build_tar_gz(&path, &[("a.csv", b"id,name,score\n")])?;

    let archive = TarArchive::open(&path)?;
    let s = infer_schema(&archive, "a.csv", 10, DecodeOptions::default())?;
    let names: Vec<&str> = s.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, ["id", "name", "score"]);
    // empty columns are read as text, never as the null type
    assert!(s.fields().iter().all(|f| f.data_type() == &DataType::Utf8));
    Ok(())
}
