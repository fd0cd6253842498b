//! Record shape model for keel.
//!
//! Defines the metadata every queryable record type registers once:
//! - [`RecordShape`]: the static field table of one record type
//! - [`FieldDef`] / [`FieldKind`] / [`ScalarType`]: per-field metadata
//! - [`FieldPath`]: a dotted path resolved against a shape
//! - [`Record`] / [`Describe`]: the capability a record type implements so
//!   filters, expands and patches can address its fields by name
//!
//! Nothing here executes storage calls. Shapes are built once (typically
//! behind a `OnceLock` in [`Describe::describe`]) and shared by reference.

mod error;
mod field;
mod record;
mod shape;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::{CoercionError, PathError};
pub use field::{Cardinality, FieldDef, FieldKind, ScalarType, ShapeRef};
pub use record::{Describe, FieldValue, FromValue, Record, assign};
pub use shape::{FieldPath, PathSegment, RecordShape, ShapeBuilder};
