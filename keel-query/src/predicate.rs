//! Compiled predicates.

use crate::Operator;
use keel_model::{FieldPath, Record};
use keel_types::{Value, compare};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A filter resolved against a record shape.
///
/// Every path is resolved and every literal already coerced to its field's
/// type, so a storage collaborator can translate the tree into its own
/// query language without consulting the shape again. In-memory sources
/// call [`Predicate::matcher`] once and evaluate the resulting closures.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record (`true`) or none (`false`).
    Const(bool),
    Compare(Comparison),
    /// Empty conjunction matches everything.
    And(Vec<Predicate>),
    /// Empty disjunction matches nothing.
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Matches every record.
    #[must_use]
    pub const fn all() -> Self {
        Predicate::Const(true)
    }

    /// Matches no record.
    #[must_use]
    pub const fn none() -> Self {
        Predicate::Const(false)
    }

    /// Whether this predicate is the constant `true`.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Predicate::Const(true))
    }

    /// Compiles the tree into a closure tree, folding constants.
    #[must_use]
    pub fn matcher(&self) -> Matcher {
        match fold(self) {
            Folded::Const(b) => Matcher::constant(b),
            Folded::Dynamic(m) => m,
        }
    }

    /// Evaluates against a single record.
    ///
    /// Builds a fresh matcher on every call; prefer [`Predicate::matcher`]
    /// when evaluating many records.
    pub fn matches(&self, record: &dyn Record) -> bool {
        self.matcher().test(record)
    }
}

/// A leaf comparison: resolved path, operator, coerced literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub path: FieldPath,
    pub op: Operator,
    /// `Value::List` for [`Operator::In`], `Value::Null` for null checks.
    pub value: Value,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.path, self.op, self.value)
    }
}

type RecordTest = dyn Fn(&dyn Record) -> bool + Send + Sync;
type ValueTest = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// A predicate compiled to closures, cheap to clone and share.
#[derive(Clone)]
pub struct Matcher(Arc<RecordTest>);

impl Matcher {
    fn new(test: impl Fn(&dyn Record) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }

    fn constant(result: bool) -> Self {
        Self::new(move |_| result)
    }

    /// Whether `record` satisfies the predicate.
    pub fn test(&self, record: &dyn Record) -> bool {
        (self.0)(record)
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Matcher(..)")
    }
}

enum Folded {
    Const(bool),
    Dynamic(Matcher),
}

fn fold(predicate: &Predicate) -> Folded {
    match predicate {
        Predicate::Const(b) => Folded::Const(*b),
        Predicate::Compare(cmp) => Folded::Dynamic(compile_comparison(cmp)),
        Predicate::Not(inner) => match fold(inner) {
            Folded::Const(b) => Folded::Const(!b),
            Folded::Dynamic(m) => Folded::Dynamic(Matcher::new(move |r| !m.test(r))),
        },
        Predicate::And(children) => fold_junction(children, true),
        Predicate::Or(children) => fold_junction(children, false),
    }
}

/// Folds AND (`identity = true`) or OR (`identity = false`).
///
/// Children equal to the identity are dropped; a child equal to the
/// absorbing element decides the whole junction.
fn fold_junction(children: &[Predicate], identity: bool) -> Folded {
    let mut dynamic = Vec::with_capacity(children.len());
    for child in children {
        match fold(child) {
            Folded::Const(b) if b == identity => {}
            Folded::Const(_) => return Folded::Const(!identity),
            Folded::Dynamic(m) => dynamic.push(m),
        }
    }

    match dynamic.len() {
        0 => Folded::Const(identity),
        1 => Folded::Dynamic(dynamic.remove(0)),
        _ if identity => Folded::Dynamic(Matcher::new(move |r| dynamic.iter().all(|m| m.test(r)))),
        _ => Folded::Dynamic(Matcher::new(move |r| dynamic.iter().any(|m| m.test(r)))),
    }
}

fn compile_comparison(cmp: &Comparison) -> Matcher {
    let path = cmp.path.clone();
    let test = value_test(cmp.op, cmp.value.clone());
    // Multi-valued paths (through to-many hops) match when any value does.
    Matcher::new(move |record| path.read(record).iter().any(|v| test(v)))
}

fn value_test(op: Operator, literal: Value) -> ValueTest {
    match op {
        Operator::Equals if literal.is_null() => Box::new(Value::is_null),
        Operator::NotEquals if literal.is_null() => Box::new(|v| !v.is_null()),
        Operator::Equals => Box::new(move |v| equal(v, &literal)),
        // Absent values are unequal to any present literal.
        Operator::NotEquals => Box::new(move |v| !equal(v, &literal)),
        Operator::GreaterThan => ordered(literal, |o| o == Ordering::Greater),
        Operator::GreaterOrEqual => ordered(literal, |o| o != Ordering::Less),
        Operator::LessThan => ordered(literal, |o| o == Ordering::Less),
        Operator::LessOrEqual => ordered(literal, |o| o != Ordering::Greater),
        Operator::Contains => textual(literal, |s, needle| s.contains(needle)),
        Operator::StartsWith => textual(literal, |s, needle| s.starts_with(needle)),
        Operator::EndsWith => textual(literal, |s, needle| s.ends_with(needle)),
        Operator::In => {
            let items = match literal {
                Value::List(items) => items,
                other => vec![other],
            };
            Box::new(move |v| {
                items.iter().any(|item| {
                    if item.is_null() {
                        v.is_null()
                    } else {
                        equal(v, item)
                    }
                })
            })
        }
    }
}

fn equal(value: &Value, literal: &Value) -> bool {
    !value.is_null() && compare(value, literal) == Some(Ordering::Equal)
}

fn ordered(literal: Value, accept: fn(Ordering) -> bool) -> ValueTest {
    Box::new(move |v| {
        if v.is_null() {
            return false;
        }
        compare(v, &literal).is_some_and(accept)
    })
}

fn textual(literal: Value, accept: fn(&str, &str) -> bool) -> ValueTest {
    let needle = match literal {
        Value::Text(s) => s,
        _ => return Box::new(|_| false),
    };
    Box::new(move |v| v.as_str().is_some_and(|s| accept(s, &needle)))
}
