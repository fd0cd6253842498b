use crate::RecordShape;
use chrono::{DateTime, Utc};
use keel_types::Value;
use std::fmt;
use uuid::Uuid;

/// What a field read returns.
pub enum FieldValue<'a> {
    Scalar(Value),
    /// A to-one relation; `None` when absent or not loaded.
    One(Option<&'a dyn Record>),
    /// A to-many relation; empty when absent or not loaded.
    Many(Vec<&'a dyn Record>),
}

impl FieldValue<'_> {
    /// Wraps anything convertible into a [`Value`].
    pub fn scalar(value: impl Into<Value>) -> Self {
        FieldValue::Scalar(value.into())
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            FieldValue::One(r) => f
                .debug_tuple("One")
                .field(&r.map(|r| r.shape().name()))
                .finish(),
            FieldValue::Many(rs) => f.debug_tuple("Many").field(&rs.len()).finish(),
        }
    }
}

/// Name-addressed access to a record's fields.
///
/// This is the object-safe half of the record capability: filters, sorts
/// and patches operate on `&dyn Record` so they never need the concrete
/// type. Field names are the names declared in the record's shape.
pub trait Record: Send + Sync {
    /// The shape this record conforms to.
    fn shape(&self) -> &'static RecordShape;

    /// Reads a field. Returns `None` for names the record does not know.
    fn get_field(&self, field: &str) -> Option<FieldValue<'_>>;

    /// Writes an already-coerced scalar value.
    ///
    /// Returns `false` when the field is unknown or the value does not fit
    /// the Rust type backing it.
    fn set_field(&mut self, field: &str, value: Value) -> bool;

    /// Drops a loaded relation so it reads as absent.
    fn unload(&mut self, relation: &str) {
        let _ = relation;
    }

    /// Mutable access to the records behind a loaded relation.
    fn related_mut(&mut self, relation: &str) -> Vec<&mut dyn Record> {
        let _ = relation;
        Vec::new()
    }
}

/// The statically registered half of the record capability.
pub trait Describe: Record + Sized {
    /// The Rust type of the key field.
    type Key: Clone + fmt::Debug + Send + Sync + Into<Value>;

    /// The shape of this record type, built once.
    fn describe() -> &'static RecordShape;

    /// This record's identity.
    fn key(&self) -> Self::Key;
}

/// Conversion from a coerced [`Value`] back into a concrete field type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for i32 {
    fn from_value(value: Value) -> Option<Self> {
        value.as_int().and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Option<Self> {
        value.as_uuid()
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Option<Self> {
        value.as_datetime()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

/// Assigns `value` into `slot` when it converts; the building block of
/// [`Record::set_field`] implementations.
pub fn assign<T: FromValue>(slot: &mut T, value: Value) -> bool {
    match T::from_value(value) {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}
