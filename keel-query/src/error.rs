//! Error types for query compilation and execution.

use crate::Operator;
use keel_model::PathError;
use thiserror::Error;

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Result type for storage collaborator calls.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for compiled-and-executed queries.
pub type QueryResult<T> = Result<T, QueryError>;

/// A filter, expand or sort description that does not fit the record shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A path does not resolve, or resolves to the wrong kind of field.
    #[error("unknown field `{path}`: {detail}")]
    UnknownField { path: String, detail: String },

    /// A literal cannot be coerced to the field's type.
    #[error("type mismatch on `{path}`: {detail}")]
    TypeMismatch { path: String, detail: String },

    /// The operator is not defined for the field's type or literal.
    #[error("operator `{op}` is invalid on `{path}`: {detail}")]
    InvalidOperator {
        path: String,
        op: Operator,
        detail: String,
    },

    /// A combinator has the wrong number of children.
    #[error("`{combinator}` takes exactly {expected} child, found {found}")]
    InvalidArity {
        combinator: &'static str,
        expected: usize,
        found: usize,
    },

    /// The filter tree nests deeper than the compiler accepts.
    #[error("filter nesting exceeds the maximum depth of {max}")]
    TooDeep { max: usize },
}

impl From<PathError> for CompileError {
    fn from(err: PathError) -> Self {
        CompileError::UnknownField {
            path: err.path().to_owned(),
            detail: err.to_string(),
        }
    }
}

/// An opaque failure reported by the storage collaborator.
#[derive(Debug, Error)]
#[error("storage error: {message}")]
pub struct StorageError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying driver error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors from [`page`](crate::page) and other compile-then-execute calls.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
