use crate::{CoercionError, RecordShape};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use keel_types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lazily resolved reference to another record type's shape.
///
/// A function pointer rather than a `&'static RecordShape` so that shapes
/// can refer to each other (or to themselves) before either is built.
pub type ShapeRef = fn() -> &'static RecordShape;

/// The primitive type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    Text,
    Uuid,
    DateTime,
}

impl ScalarType {
    /// Whether values of this type have a meaningful total order for
    /// `>`/`<` style comparisons.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(
            self,
            ScalarType::Int | ScalarType::Float | ScalarType::Text | ScalarType::DateTime
        )
    }

    /// Converts a non-null value to this type.
    ///
    /// Integers widen to floats; floats narrow to integers only when they
    /// carry no fractional part. Strings parse into booleans, identifiers
    /// and date-times. Null is rejected here; nullability is decided by
    /// [`FieldDef::coerce`].
    pub fn coerce(self, value: &Value) -> Result<Value, CoercionError> {
        let mismatch = || CoercionError::Mismatch {
            expected: self,
            found: value.kind(),
        };
        let malformed = |input: &str| CoercionError::Malformed {
            expected: self,
            input: input.to_owned(),
        };

        match (self, value) {
            (ScalarType::Bool, Value::Bool(_))
            | (ScalarType::Int, Value::Int(_))
            | (ScalarType::Float, Value::Float(_))
            | (ScalarType::Text, Value::Text(_))
            | (ScalarType::Uuid, Value::Uuid(_))
            | (ScalarType::DateTime, Value::DateTime(_)) => Ok(value.clone()),

            (ScalarType::Bool, Value::Text(s)) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(malformed(s))
                }
            }

            (ScalarType::Int, Value::Float(f)) => {
                // 2^63 is exactly representable; anything at or past it overflows.
                let in_range = *f >= i64::MIN as f64 && *f < i64::MAX as f64;
                if f.fract() == 0.0 && in_range {
                    Ok(Value::Int(*f as i64))
                } else {
                    Err(mismatch())
                }
            }
            (ScalarType::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),

            (ScalarType::Uuid, Value::Text(s)) => Uuid::parse_str(s)
                .map(Value::Uuid)
                .map_err(|_| malformed(s)),

            (ScalarType::DateTime, Value::Text(s)) => {
                parse_datetime(s).map(Value::DateTime).ok_or_else(|| malformed(s))
            }

            _ => Err(mismatch()),
        }
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Text => "text",
            ScalarType::Uuid => "uuid",
            ScalarType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// How many records a relation field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

/// What a field holds.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Scalar(ScalarType),
    Relation {
        target: ShapeRef,
        cardinality: Cardinality,
    },
}

impl FieldKind {
    /// Returns the scalar type, or `None` for relations.
    #[must_use]
    pub const fn scalar(&self) -> Option<ScalarType> {
        match self {
            FieldKind::Scalar(t) => Some(*t),
            FieldKind::Relation { .. } => None,
        }
    }

    /// Returns the target shape and cardinality for relations.
    #[must_use]
    pub fn relation(&self) -> Option<(&'static RecordShape, Cardinality)> {
        match self {
            FieldKind::Scalar(_) => None,
            FieldKind::Relation {
                target,
                cardinality,
            } => Some((target(), *cardinality)),
        }
    }
}

// Relation targets compare by shape name; function pointers have no stable identity.
impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldKind::Scalar(a), FieldKind::Scalar(b)) => a == b,
            (
                FieldKind::Relation {
                    target: ta,
                    cardinality: ca,
                },
                FieldKind::Relation {
                    target: tb,
                    cardinality: cb,
                },
            ) => ca == cb && ta().name() == tb().name(),
            _ => false,
        }
    }
}

impl Eq for FieldKind {}

/// Metadata for one field of a record shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    /// Scalar accepts null. Relations are always optional.
    pub nullable: bool,
    /// This field is the record's identity.
    pub key: bool,
    /// Server-assigned; filterable but never patched.
    pub read_only: bool,
}

impl FieldDef {
    fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            key: false,
            read_only: false,
        }
    }

    /// A non-nullable scalar field.
    pub fn scalar(name: &str, scalar: ScalarType) -> Self {
        Self::new(name, FieldKind::Scalar(scalar))
    }

    /// A relation field pointing at another shape.
    pub fn relation(name: &str, cardinality: Cardinality, target: ShapeRef) -> Self {
        let mut def = Self::new(
            name,
            FieldKind::Relation {
                target,
                cardinality,
            },
        );
        def.nullable = true;
        def
    }

    #[must_use]
    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation { .. })
    }

    /// Whether a patch may write this field.
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        !self.key && !self.read_only && !self.is_relation()
    }

    /// Binds a value to this field's type, honouring nullability.
    pub fn coerce(&self, value: &Value) -> Result<Value, CoercionError> {
        let Some(scalar) = self.kind.scalar() else {
            return Err(CoercionError::NotScalar);
        };
        if value.is_null() {
            return if self.nullable {
                Ok(Value::Null)
            } else {
                Err(CoercionError::NotNullable { expected: scalar })
            };
        }
        scalar.coerce(value)
    }
}
