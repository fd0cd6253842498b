//! Error types for the entity service.

use keel_model::CoercionError;
use keel_query::{CompileError, QueryError, StorageError};
use std::fmt;
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A patch entry that cannot be written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown field `{field}` on `{shape}`")]
    Unknown { field: String, shape: &'static str },

    /// Read-only and relation fields.
    #[error("field `{field}` is not mutable")]
    NotMutable { field: String },

    #[error("invalid value for `{field}`: {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    /// The record refused a value its shape accepted.
    #[error("record rejected the value for `{field}`")]
    Rejected { field: String },

    /// A prepared patch applied to a record of another shape.
    #[error("patch prepared for `{expected}` applied to `{found}`")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl FieldError {
    /// The patch key the error is about, if it concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            FieldError::Unknown { field, .. }
            | FieldError::NotMutable { field }
            | FieldError::Coercion { field, .. }
            | FieldError::Rejected { field } => Some(field),
            FieldError::ShapeMismatch { .. } => None,
        }
    }
}

/// Every failure an [`EntityService`](crate::EntityService) operation can
/// report.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The filter, expand or sort part of a request does not fit the shape.
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("no `{shape}` record with key {key}")]
    NotFound { shape: &'static str, key: String },

    /// Surfaced unchanged from the storage collaborator.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Compile(e) => ServiceError::Compile(e),
            QueryError::Storage(e) => ServiceError::Storage(e),
        }
    }
}

/// Flat classification of a [`ServiceError`], for mapping to transport
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownField,
    TypeMismatch,
    InvalidOperator,
    InvalidArity,
    TooDeep,
    FieldError,
    NotFound,
    Storage,
}

impl ErrorKind {
    /// Whether the caller sent a request that can never succeed as written.
    #[must_use]
    pub fn is_client_error(self) -> bool {
        !matches!(self, ErrorKind::NotFound | ErrorKind::Storage)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnknownField => "unknown_field",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::InvalidOperator => "invalid_operator",
            ErrorKind::InvalidArity => "invalid_arity",
            ErrorKind::TooDeep => "too_deep",
            ErrorKind::FieldError => "field_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Compile(e) => match e {
                CompileError::UnknownField { .. } => ErrorKind::UnknownField,
                CompileError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
                CompileError::InvalidOperator { .. } => ErrorKind::InvalidOperator,
                CompileError::InvalidArity { .. } => ErrorKind::InvalidArity,
                CompileError::TooDeep { .. } => ErrorKind::TooDeep,
            },
            ServiceError::Field(_) => ErrorKind::FieldError,
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::Storage(_) => ErrorKind::Storage,
        }
    }
}
