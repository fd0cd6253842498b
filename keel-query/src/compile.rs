//! Filter compiler: [`FilterNode`] → [`Predicate`].

use crate::error::CompileResult;
use crate::{Comparison, CompileError, FilterNode, Operator, Predicate};
use keel_model::{FieldPath, RecordShape, ScalarType};
use keel_types::Value;

/// Maximum nesting depth of a filter tree.
pub const MAX_FILTER_DEPTH: usize = 32;

/// Compiles a filter description against `shape`.
///
/// An absent filter compiles to [`Predicate::all`]. Every path is resolved
/// and every literal coerced here, so a compiled predicate never fails at
/// evaluation time.
pub fn compile(shape: &RecordShape, filter: Option<&FilterNode>) -> CompileResult<Predicate> {
    match filter {
        None => Ok(Predicate::all()),
        Some(node) => compile_node(shape, node, 0),
    }
}

fn compile_node(shape: &RecordShape, node: &FilterNode, depth: usize) -> CompileResult<Predicate> {
    if depth >= MAX_FILTER_DEPTH {
        return Err(CompileError::TooDeep {
            max: MAX_FILTER_DEPTH,
        });
    }

    match node {
        FilterNode::Compare { path, op, value } => {
            compile_comparison(shape, path, *op, value).map(Predicate::Compare)
        }
        FilterNode::And { children } => compile_children(shape, children, depth).map(Predicate::And),
        FilterNode::Or { children } => compile_children(shape, children, depth).map(Predicate::Or),
        FilterNode::Not { children } => match children.as_slice() {
            [child] => Ok(Predicate::Not(Box::new(compile_node(shape, child, depth + 1)?))),
            _ => Err(CompileError::InvalidArity {
                combinator: "not",
                expected: 1,
                found: children.len(),
            }),
        },
    }
}

fn compile_children(
    shape: &RecordShape,
    children: &[FilterNode],
    depth: usize,
) -> CompileResult<Vec<Predicate>> {
    children
        .iter()
        .map(|child| compile_node(shape, child, depth + 1))
        .collect()
}

fn compile_comparison(
    shape: &RecordShape,
    path: &str,
    op: Operator,
    literal: &Value,
) -> CompileResult<Comparison> {
    let resolved = shape.resolve(path)?;
    let Some(scalar) = resolved.scalar() else {
        return Err(CompileError::UnknownField {
            path: path.to_owned(),
            detail: format!("`{}` is a relation, not a scalar field", resolved.field.name),
        });
    };

    let invalid = |detail: &str| CompileError::InvalidOperator {
        path: path.to_owned(),
        op,
        detail: detail.to_owned(),
    };

    if literal.is_null() && !op.accepts_null() {
        return Err(invalid("a null literal is only valid with equals or notEquals"));
    }
    if op.is_ordering() && !scalar.is_ordered() {
        return Err(invalid(&format!("{scalar} values have no ordering")));
    }
    if op.is_textual() && scalar != ScalarType::Text {
        return Err(invalid(&format!("{scalar} fields do not support substring matching")));
    }

    let value = match op {
        _ if literal.is_null() => Value::Null,
        Operator::In => {
            let Some(items) = literal.as_list() else {
                return Err(CompileError::TypeMismatch {
                    path: path.to_owned(),
                    detail: format!("`in` expects a list, found {}", literal.kind()),
                });
            };
            let coerced = items
                .iter()
                .map(|item| {
                    if item.is_null() {
                        Ok(Value::Null)
                    } else {
                        coerce_literal(&resolved, scalar, item)
                    }
                })
                .collect::<CompileResult<Vec<_>>>()?;
            Value::List(coerced)
        }
        _ => coerce_literal(&resolved, scalar, literal)?,
    };

    Ok(Comparison {
        path: resolved,
        op,
        value,
    })
}

fn coerce_literal(path: &FieldPath, scalar: ScalarType, literal: &Value) -> CompileResult<Value> {
    scalar
        .coerce(literal)
        .map_err(|err| CompileError::TypeMismatch {
            path: path.to_string(),
            detail: err.to_string(),
        })
}
