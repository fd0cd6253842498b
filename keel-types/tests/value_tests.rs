use chrono::{TimeZone, Utc};
use keel_types::{Value, ValueKind, compare};
use proptest::prelude::*;
use std::cmp::Ordering;
use uuid::Uuid;

// ── Wire shape ───────────────────────────────────────────────────

#[test]
fn deserializes_json_scalars() {
    let v: Value = serde_json::from_str("null").unwrap();
    assert_eq!(v, Value::Null);
    let v: Value = serde_json::from_str("true").unwrap();
    assert_eq!(v, Value::Bool(true));
    let v: Value = serde_json::from_str("42").unwrap();
    assert_eq!(v, Value::Int(42));
    let v: Value = serde_json::from_str("4.5").unwrap();
    assert_eq!(v, Value::Float(4.5));
    let v: Value = serde_json::from_str(r#""Alice""#).unwrap();
    assert_eq!(v, Value::Text("Alice".into()));
}

#[test]
fn strings_stay_text_even_when_uuid_shaped() {
    let raw = "\"67e55044-10b1-426f-9247-bb680e5fe0c8\"";
    let v: Value = serde_json::from_str(raw).unwrap();
    assert_eq!(v.kind(), ValueKind::Text);
}

#[test]
fn deserializes_nested_list() {
    let v: Value = serde_json::from_str("[1, \"a\", null]").unwrap();
    assert_eq!(
        v,
        Value::List(vec![Value::Int(1), Value::Text("a".into()), Value::Null])
    );
}

#[test]
fn uuid_serializes_as_canonical_string() {
    let id = Uuid::nil();
    let json = serde_json::to_string(&Value::Uuid(id)).unwrap();
    assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
}

// ── Conversions ──────────────────────────────────────────────────

#[test]
fn option_none_becomes_null() {
    let v: Value = Option::<i64>::None.into();
    assert!(v.is_null());
    let v: Value = Some("x").into();
    assert_eq!(v.as_str(), Some("x"));
}

#[test]
fn vec_becomes_list() {
    let v: Value = vec![1i64, 2, 3].into();
    assert_eq!(v.as_list().map(<[Value]>::len), Some(3));
}

// ── Comparison ───────────────────────────────────────────────────

#[test]
fn int_and_float_compare_numerically() {
    assert_eq!(compare(&Value::Int(2), &Value::Float(2.0)), Some(Ordering::Equal));
    assert_eq!(compare(&Value::Float(1.5), &Value::Int(2)), Some(Ordering::Less));
}

#[test]
fn cross_kind_is_incomparable() {
    assert_eq!(compare(&Value::Int(1), &Value::Text("1".into())), None);
    assert_eq!(compare(&Value::Null, &Value::Int(1)), None);
    assert_eq!(compare(&Value::List(vec![]), &Value::List(vec![])), None);
}

#[test]
fn datetimes_compare_chronologically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let b = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    assert_eq!(compare(&a.into(), &b.into()), Some(Ordering::Less));
}

#[test]
fn display_is_readable() {
    assert_eq!(Value::Text("a".into()).to_string(), "\"a\"");
    assert_eq!(Value::List(vec![1.into(), Value::Null]).to_string(), "[1, null]");
}

proptest! {
    #[test]
    fn int_compare_matches_native(a in any::<i64>(), b in any::<i64>()) {
        prop_assert_eq!(compare(&Value::Int(a), &Value::Int(b)), Some(a.cmp(&b)));
    }

    #[test]
    fn compare_is_antisymmetric(a in -1000i64..1000, b in -1000.0f64..1000.0) {
        let l = compare(&Value::Int(a), &Value::Float(b));
        let r = compare(&Value::Float(b), &Value::Int(a));
        prop_assert_eq!(l.map(Ordering::reverse), r);
    }
}
