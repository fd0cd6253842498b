//! Patch merger: sparse field updates applied onto an existing record.

use crate::FieldError;
use keel_model::{Record, RecordShape};
use keel_types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sparse set of field values to write onto a record.
///
/// Serialized as a plain JSON object keyed by field name. Fields absent
/// from the patch are left alone. Key fields are ignored: a record's
/// identity never changes through a patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(BTreeMap<String, Value>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one entry.
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Validates every entry against `shape` and coerces its value.
    ///
    /// Fails on the first entry (in field-name order) that names an unknown
    /// field, a read-only or relation field, or carries a value the field's
    /// type does not accept. Key fields are dropped.
    pub fn prepare(&self, shape: &RecordShape) -> Result<PreparedPatch, FieldError> {
        let mut writes = Vec::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            let field = shape.field(name).ok_or_else(|| FieldError::Unknown {
                field: name.clone(),
                shape: shape.name(),
            })?;
            if field.key {
                continue;
            }
            if !field.is_mutable() {
                return Err(FieldError::NotMutable {
                    field: name.clone(),
                });
            }
            let coerced = field.coerce(value).map_err(|source| FieldError::Coercion {
                field: name.clone(),
                source,
            })?;
            writes.push((name.clone(), coerced));
        }
        Ok(PreparedPatch {
            shape: shape.name(),
            writes,
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Patch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A patch whose entries are known to fit a shape, with values already
/// coerced to their field types.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPatch {
    shape: &'static str,
    writes: Vec<(String, Value)>,
}

impl PreparedPatch {
    /// Number of fields the patch will write.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Writes every entry onto `target`, which must be a record of the
    /// shape the patch was prepared for.
    pub fn apply_to(self, target: &mut dyn Record) -> Result<(), FieldError> {
        let found = target.shape().name();
        if found != self.shape {
            return Err(FieldError::ShapeMismatch {
                expected: self.shape,
                found,
            });
        }
        for (field, value) in self.writes {
            if !target.set_field(&field, value) {
                return Err(FieldError::Rejected { field });
            }
        }
        Ok(())
    }
}

/// Validates `patch` against `target`'s shape, then writes it.
///
/// Nothing is written unless every entry validates.
pub fn apply(patch: &Patch, target: &mut dyn Record) -> Result<(), FieldError> {
    patch.prepare(target.shape())?.apply_to(target)
}
