//! Ordering of page results.

use crate::error::CompileResult;
use crate::CompileError;
use keel_model::{FieldPath, Record, RecordShape};
use keel_types::{Value, compare};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One ordering term as sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub path: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// An ordering term resolved against a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub path: FieldPath,
    pub direction: SortDirection,
}

/// Resolves ordering terms. Each path must end on a scalar and may only
/// cross to-one relations.
pub fn compile_sort(shape: &RecordShape, orders: &[OrderBy]) -> CompileResult<Vec<SortKey>> {
    orders
        .iter()
        .map(|order| {
            let path = shape.resolve(&order.path)?;
            if path.scalar().is_none() {
                return Err(CompileError::UnknownField {
                    path: order.path.clone(),
                    detail: format!("cannot order by relation `{}`", path.field.name),
                });
            }
            if !path.is_single_valued() {
                return Err(CompileError::UnknownField {
                    path: order.path.clone(),
                    detail: "cannot order by a path through a to-many relation".into(),
                });
            }
            Ok(SortKey {
                path,
                direction: order.direction,
            })
        })
        .collect()
}

/// Compares two records by `keys`, in order. Nulls sort first when
/// ascending; equal keys leave the pair unordered so stable sorts keep
/// source order.
pub fn compare_records(keys: &[SortKey], a: &dyn Record, b: &dyn Record) -> Ordering {
    for key in keys {
        let left = first_value(&key.path, a);
        let right = first_value(&key.path, b);
        let ord = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => compare(&left, &right).unwrap_or(Ordering::Equal),
        };
        let ord = match key.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn first_value(path: &FieldPath, record: &dyn Record) -> Value {
    path.read(record).into_iter().next().unwrap_or(Value::Null)
}
