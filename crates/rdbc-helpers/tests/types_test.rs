//! Unit tests for rdbc-helpers values and records

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rdbc_helpers::record::{Group, GroupMode, GroupedResult, Record};
use rdbc_helpers::types::{column_index, ColumnMetadata, TemporalKind, Value};
use rust_decimal::Decimal;
use std::str::FromStr;

fn ts(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").unwrap()
}

#[test]
fn test_value_null() {
    let v = Value::Null;
    assert!(v.is_null());
    assert_eq!(v.to_string(), "");
    assert_eq!(v.to_json(), serde_json::Value::Null);
}

#[test]
fn test_value_integer_widths() {
    assert_eq!(Value::Int8(42).to_json(), serde_json::json!(42));
    assert_eq!(Value::Int16(-100).to_string(), "-100");
    assert_eq!(Value::Int32(1_000_000).normalize(), Value::Int32(1_000_000));
    assert_eq!(
        Value::Int64(80_000_000_000).to_json(),
        serde_json::json!(80_000_000_000_i64)
    );
}

#[test]
fn test_temporal_kind() {
    let d = NaiveDate::from_ymd_opt(2016, 7, 1).unwrap();
    assert_eq!(Value::Date(d).temporal_kind(), Some(TemporalKind::Date));
    assert_eq!(
        Value::DateTime(ts("2016-07-01T23:23:23")).temporal_kind(),
        Some(TemporalKind::Timestamp)
    );
    assert_eq!(
        Value::DateTimeTz(Utc.with_ymd_and_hms(2016, 7, 1, 23, 23, 23).unwrap()).temporal_kind(),
        Some(TemporalKind::TimestampTz)
    );
    assert_eq!(
        Value::Time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()).temporal_kind(),
        None
    );
    assert_eq!(Value::from("2016-07-01").temporal_kind(), None);
}

#[test]
fn test_normalize_temporal_values() {
    let d = NaiveDate::from_ymd_opt(2016, 7, 1).unwrap();
    assert_eq!(Value::Date(d).normalize(), Value::from("2016-07-01"));
    assert_eq!(
        Value::DateTime(ts("2016-07-01T23:23:23")).normalize(),
        Value::from("2016-07-01T23:23:23.000")
    );
    assert_eq!(
        Value::DateTime(ts("2016-07-01T23:23:23.123456")).normalize(),
        Value::from("2016-07-01T23:23:23.123456")
    );
    assert_eq!(
        Value::DateTimeTz(Utc.with_ymd_and_hms(2016, 7, 1, 23, 23, 23).unwrap()).normalize(),
        Value::from("2016-07-01T23:23:23.000Z")
    );
}

#[test]
fn test_normalize_leaves_other_values() {
    let time = NaiveTime::from_hms_opt(12, 30, 0).unwrap();
    assert_eq!(Value::Time(time).normalize(), Value::Time(time));
    assert_eq!(Value::Int64(7).normalize(), Value::Int64(7));
    assert_eq!(Value::Null.normalize(), Value::Null);
    assert_eq!(Value::Bool(true).normalize(), Value::Bool(true));
}

#[test]
fn test_value_to_json() {
    use serde_json::json;

    assert_eq!(Value::Null.to_json(), json!(null));
    assert_eq!(Value::Int64(12345).to_json(), json!(12345));
    assert_eq!(Value::from("turkey").to_json(), json!("turkey"));
    assert_eq!(Value::Float64(f64::NAN).to_json(), json!(null));
    assert_eq!(
        Value::Decimal(Decimal::from_str("12.50").unwrap()).to_json(),
        json!("12.50")
    );
    assert_eq!(Value::Bytes(b"hi".to_vec()).to_json(), json!("aGk="));
    assert_eq!(
        Value::DateTime(ts("2016-07-01T23:23:23")).to_json(),
        json!("2016-07-01T23:23:23.000")
    );
}

#[test]
fn test_value_from_option() {
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some("x")), Value::from("x"));
}

#[test]
fn test_column_index_lookup() {
    let columns = vec![
        ColumnMetadata::new("id", "INTEGER", 1),
        ColumnMetadata::new("Name", "VARCHAR", 2),
        ColumnMetadata::new("name", "VARCHAR", 3),
    ];
    assert_eq!(column_index(&columns, "id"), Some(0));
    assert_eq!(column_index(&columns, "name"), Some(2));
    assert_eq!(column_index(&columns, "NAME"), Some(1));
    assert_eq!(column_index(&columns, "missing"), None);
}

#[test]
fn test_record_from_row_normalizes() {
    let columns = vec![
        ColumnMetadata::new("a", "INTEGER", 1),
        ColumnMetadata::new("d", "DATE", 2),
    ];
    let record = Record::from_row(
        &columns,
        vec![
            Value::Int64(1),
            Value::Date(NaiveDate::from_ymd_opt(2016, 7, 1).unwrap()),
        ],
    )
    .unwrap();

    assert_eq!(record.columns().collect::<Vec<_>>(), vec!["a", "d"]);
    assert_eq!(record["d"], Value::from("2016-07-01"));
    assert_eq!(record.get("missing"), None);
    assert_eq!(
        record.to_json_string().unwrap(),
        r#"{"a":1,"d":"2016-07-01"}"#
    );
}

#[test]
fn test_record_duplicate_column_keeps_last_value() {
    let columns = vec![
        ColumnMetadata::new("x", "", 1),
        ColumnMetadata::new("x", "", 2),
    ];
    let record = Record::from_row(&columns, vec![Value::Int64(1), Value::Int64(2)]).unwrap();
    assert_eq!(record.len(), 1);
    assert_eq!(record["x"], Value::Int64(2));
}

#[test]
fn test_grouped_result_multi() {
    let mut grouped = GroupedResult::new(GroupMode::Multi);
    grouped.push(Some("b".into()), Record::from_iter([("v", 1_i64)]));
    grouped.push(Some("a".into()), Record::from_iter([("v", 2_i64)]));
    grouped.push(Some("b".into()), Record::from_iter([("v", 3_i64)]));

    assert_eq!(grouped.keys().collect::<Vec<_>>(), vec![Some("b"), Some("a")]);
    let b = grouped.get("b").unwrap();
    assert_eq!(b.len(), 2);
    assert_eq!(b.records()[1]["v"], Value::Int64(3));
}

#[test]
fn test_grouped_result_single() {
    let mut grouped = GroupedResult::new(GroupMode::Single);
    grouped.push(Some("k".into()), Record::from_iter([("v", 1_i64)]));
    grouped.push(None, Record::from_iter([("v", 2_i64)]));
    grouped.push(Some("k".into()), Record::from_iter([("v", 3_i64)]));

    assert_eq!(grouped.keys().collect::<Vec<_>>(), vec![Some("k"), None]);
    match grouped.get("k") {
        Some(Group::Single(record)) => assert_eq!(record["v"], Value::Int64(3)),
        other => panic!("unexpected group: {:?}", other),
    }
    assert_eq!(grouped.get_null().map(Group::len), Some(1));
}

#[test]
fn test_record_from_short_row_is_schema_error() {
    let columns = vec![
        ColumnMetadata::new("a", "", 1),
        ColumnMetadata::new("b", "", 2),
    ];
    let err = Record::from_row(&columns, vec![Value::Int64(1)]).unwrap_err();
    assert_eq!(err.category(), rdbc_helpers::error::ErrorCategory::Schema);
}

#[test]
#[should_panic]
fn test_record_index_panics_on_missing_column() {
    let record = Record::from_iter([("a", 1_i64)]);
    let _ = &record["b"];
}
