//! Error types for shape resolution and coercion.

use crate::ScalarType;
use keel_types::ValueKind;
use thiserror::Error;

/// A dotted path that does not resolve against a record shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A segment names no field of the shape it is looked up in.
    #[error("unknown field `{segment}` in path `{path}` on `{shape}`")]
    UnknownField {
        path: String,
        segment: String,
        shape: &'static str,
    },

    /// An intermediate segment is a scalar, so the path cannot continue.
    #[error("`{segment}` in path `{path}` is not a relation of `{shape}`")]
    NotRelation {
        path: String,
        segment: String,
        shape: &'static str,
    },
}

impl PathError {
    /// The full path that failed to resolve.
    pub fn path(&self) -> &str {
        match self {
            PathError::UnknownField { path, .. } | PathError::NotRelation { path, .. } => path,
        }
    }
}

/// A value that cannot be bound to a scalar field type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// The value's kind has no conversion to the target type.
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: ScalarType,
        found: ValueKind,
    },

    /// A string literal that does not parse as the target type.
    #[error("malformed {expected} literal: {input:?}")]
    Malformed { expected: ScalarType, input: String },

    /// Null given for a field that does not accept it.
    #[error("{expected} field is not nullable")]
    NotNullable { expected: ScalarType },

    /// Relation fields hold records, not literals.
    #[error("relation fields do not accept literal values")]
    NotScalar,
}
