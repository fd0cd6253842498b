//! Key predicate builder.
//!
//! Selects records by identity over the shape's key field. The typed
//! helpers take the record type's own key type; the shape-level helpers
//! exist for collaborators that only hold a `&RecordShape`.

use crate::{Comparison, Operator, Predicate};
use keel_model::{Describe, FieldPath, RecordShape};
use keel_types::Value;

/// Selects the record whose key equals `key`.
pub fn for_one<R: Describe>(key: &R::Key) -> Predicate {
    one(R::describe(), key.clone().into())
}

/// Selects every record whose key is in `keys`.
///
/// An empty key set matches nothing. A single key produces exactly the
/// predicate [`for_one`] would.
pub fn for_many<R: Describe>(keys: &[R::Key]) -> Predicate {
    many(R::describe(), keys.iter().cloned().map(Into::into).collect())
}

/// Shape-level form of [`for_one`].
pub fn one(shape: &RecordShape, key: Value) -> Predicate {
    Predicate::Compare(Comparison {
        path: key_path(shape),
        op: Operator::Equals,
        value: key,
    })
}

/// Shape-level form of [`for_many`].
pub fn many(shape: &RecordShape, mut keys: Vec<Value>) -> Predicate {
    match keys.len() {
        0 => Predicate::none(),
        1 => one(shape, keys.remove(0)),
        _ => Predicate::Compare(Comparison {
            path: key_path(shape),
            op: Operator::In,
            value: Value::List(keys),
        }),
    }
}

fn key_path(shape: &RecordShape) -> FieldPath {
    FieldPath {
        hops: Vec::new(),
        field: shape.key_field().clone(),
    }
}
