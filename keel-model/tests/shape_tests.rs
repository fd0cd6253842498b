use keel_model::{
    Cardinality, CoercionError, FieldKind, PathError, RecordShape, ScalarType,
};
use keel_types::{Value, ValueKind};
use pretty_assertions::assert_eq;
use std::sync::OnceLock;
use uuid::Uuid;

fn author() -> &'static RecordShape {
    static SHAPE: OnceLock<RecordShape> = OnceLock::new();
    SHAPE.get_or_init(|| {
        RecordShape::builder("author", "id", ScalarType::Uuid)
            .field("name", ScalarType::Text)
            .many("books", book)
            .build()
    })
}

fn book() -> &'static RecordShape {
    static SHAPE: OnceLock<RecordShape> = OnceLock::new();
    SHAPE.get_or_init(|| {
        RecordShape::builder("book", "id", ScalarType::Int)
            .field("title", ScalarType::Text)
            .nullable("pages", ScalarType::Int)
            .read_only("published", ScalarType::DateTime)
            .one("author", author)
            .build()
    })
}

// ── Builder ──────────────────────────────────────────────────────

#[test]
fn key_field_comes_first() {
    let shape = book();
    let key = shape.key_field();
    assert_eq!(key.name, "id");
    assert!(key.key);
    assert_eq!(key.kind.scalar(), Some(ScalarType::Int));
    assert_eq!(shape.fields().next().map(|f| f.name.as_str()), Some("id"));
}

#[test]
fn field_flags() {
    let shape = book();
    assert!(shape.field("pages").unwrap().nullable);
    assert!(!shape.field("title").unwrap().nullable);
    assert!(shape.field("published").unwrap().read_only);
    assert!(!shape.field("published").unwrap().is_mutable());
    assert!(!shape.field("id").unwrap().is_mutable());
    assert!(!shape.field("author").unwrap().is_mutable());
    assert!(shape.field("title").unwrap().is_mutable());
}

#[test]
fn relation_fields_know_their_target() {
    let (target, cardinality) = book().field("author").unwrap().kind.relation().unwrap();
    assert_eq!(target.name(), "author");
    assert_eq!(cardinality, Cardinality::One);
    assert_eq!(book().relations().count(), 1);
}

#[test]
fn field_kind_equality_by_target_name() {
    let a = book().field("author").unwrap().kind;
    let b = book().field("author").unwrap().kind;
    assert_eq!(a, b);
    assert_ne!(a, FieldKind::Scalar(ScalarType::Text));
}

#[test]
fn unknown_field_lookup() {
    assert!(book().field("isbn").is_none());
}

#[test]
#[should_panic(expected = "duplicate field `title` on `book`")]
fn duplicate_field_names_panic() {
    let _ = RecordShape::builder("book", "id", ScalarType::Int)
        .field("title", ScalarType::Text)
        .nullable("title", ScalarType::Text)
        .build();
}

#[test]
#[should_panic(expected = "duplicate field `id`")]
fn field_may_not_shadow_the_key() {
    let _ = RecordShape::builder("book", "id", ScalarType::Int)
        .field("id", ScalarType::Text)
        .build();
}

// ── Path resolution ──────────────────────────────────────────────

#[test]
fn resolves_plain_field() {
    let path = book().resolve("title").unwrap();
    assert!(path.hops.is_empty());
    assert_eq!(path.scalar(), Some(ScalarType::Text));
}

#[test]
fn resolves_through_relations() {
    let path = book().resolve("author.books.title").unwrap();
    assert_eq!(path.hops.len(), 2);
    assert_eq!(path.hops[1].cardinality, Cardinality::Many);
    assert_eq!(path.scalar(), Some(ScalarType::Text));
    assert!(!path.is_single_valued());
}

#[test]
fn path_may_end_on_relation() {
    let path = book().resolve("author").unwrap();
    assert_eq!(path.scalar(), None);
}

#[test]
fn unknown_segment_is_reported() {
    let err = book().resolve("author.nickname").unwrap_err();
    assert_eq!(
        err,
        PathError::UnknownField {
            path: "author.nickname".into(),
            segment: "nickname".into(),
            shape: "author",
        }
    );
    assert_eq!(err.path(), "author.nickname");
}

#[test]
fn traversing_a_scalar_is_rejected() {
    let err = book().resolve("title.length").unwrap_err();
    assert!(matches!(err, PathError::NotRelation { ref segment, .. } if segment == "title"));
}

#[test]
fn empty_path_is_unknown() {
    assert!(matches!(book().resolve(""), Err(PathError::UnknownField { .. })));
    assert!(matches!(book().resolve("author..name"), Err(PathError::UnknownField { .. })));
}

// ── Coercion ─────────────────────────────────────────────────────

#[test]
fn int_widens_to_float() {
    assert_eq!(ScalarType::Float.coerce(&Value::Int(3)), Ok(Value::Float(3.0)));
}

#[test]
fn integral_float_narrows_to_int() {
    assert_eq!(ScalarType::Int.coerce(&Value::Float(18.0)), Ok(Value::Int(18)));
}

#[test]
fn fractional_float_does_not_narrow() {
    assert_eq!(
        ScalarType::Int.coerce(&Value::Float(18.5)),
        Err(CoercionError::Mismatch {
            expected: ScalarType::Int,
            found: ValueKind::Float,
        })
    );
    assert!(ScalarType::Int.coerce(&Value::Float(f64::NAN)).is_err());
    assert!(ScalarType::Int.coerce(&Value::Float(1e20)).is_err());
}

#[test]
fn text_is_not_numeric() {
    assert!(matches!(
        ScalarType::Int.coerce(&Value::Text("18".into())),
        Err(CoercionError::Mismatch { .. })
    ));
}

#[test]
fn uuid_from_canonical_string() {
    let id = Uuid::new_v4();
    assert_eq!(
        ScalarType::Uuid.coerce(&Value::Text(id.to_string())),
        Ok(Value::Uuid(id))
    );
    assert!(matches!(
        ScalarType::Uuid.coerce(&Value::Text("not-a-uuid".into())),
        Err(CoercionError::Malformed { .. })
    ));
}

#[test]
fn datetime_from_strings() {
    let rfc = ScalarType::DateTime
        .coerce(&Value::Text("2024-03-01T12:00:00+02:00".into()))
        .unwrap();
    assert_eq!(rfc.to_string(), "2024-03-01T10:00:00+00:00");

    let naive = ScalarType::DateTime
        .coerce(&Value::Text("2024-03-01T12:00:00".into()))
        .unwrap();
    assert_eq!(naive.to_string(), "2024-03-01T12:00:00+00:00");

    let date = ScalarType::DateTime
        .coerce(&Value::Text("2024-03-01".into()))
        .unwrap();
    assert_eq!(date.to_string(), "2024-03-01T00:00:00+00:00");

    assert!(ScalarType::DateTime.coerce(&Value::Text("March".into())).is_err());
}

#[test]
fn bool_from_string() {
    assert_eq!(ScalarType::Bool.coerce(&Value::Text("TRUE".into())), Ok(Value::Bool(true)));
    assert_eq!(ScalarType::Bool.coerce(&Value::Text("false".into())), Ok(Value::Bool(false)));
    assert!(ScalarType::Bool.coerce(&Value::Text("yes".into())).is_err());
}

#[test]
fn null_respects_nullability() {
    let pages = book().field("pages").unwrap();
    assert_eq!(pages.coerce(&Value::Null), Ok(Value::Null));

    let title = book().field("title").unwrap();
    assert_eq!(
        title.coerce(&Value::Null),
        Err(CoercionError::NotNullable {
            expected: ScalarType::Text
        })
    );
}

#[test]
fn relations_reject_literals() {
    let author = book().field("author").unwrap();
    assert_eq!(author.coerce(&Value::Int(1)), Err(CoercionError::NotScalar));
}

#[test]
fn ordered_types() {
    assert!(ScalarType::Int.is_ordered());
    assert!(ScalarType::Text.is_ordered());
    assert!(ScalarType::DateTime.is_ordered());
    assert!(!ScalarType::Bool.is_ordered());
    assert!(!ScalarType::Uuid.is_ordered());
}
