//! Core value model for keel.
//!
//! This crate defines the plain-data values that flow through every layer
//! of the entity-access stack:
//! - [`Value`]: a scalar, null, or list literal as carried by filters,
//!   patches and record field reads
//! - [`ValueKind`]: the discriminant of a [`Value`], used in diagnostics
//!
//! Values are intentionally untyped with respect to record shapes. Binding a
//! value to a field's declared type is the job of `keel-model`'s coercion.

mod value;

pub use value::{Value, ValueKind, compare};
