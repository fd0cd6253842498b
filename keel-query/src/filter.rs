//! The client-facing filter description.

use keel_types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a filter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    In,
}

impl Operator {
    /// `>`, `>=`, `<`, `<=`.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterOrEqual
                | Operator::LessThan
                | Operator::LessOrEqual
        )
    }

    /// Substring operators, defined on text fields only.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(
            self,
            Operator::Contains | Operator::StartsWith | Operator::EndsWith
        )
    }

    /// Operators that accept a null literal.
    #[must_use]
    pub const fn accepts_null(self) -> bool {
        matches!(self, Operator::Equals | Operator::NotEquals)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterOrEqual => "greaterOrEqual",
            Operator::LessThan => "lessThan",
            Operator::LessOrEqual => "lessOrEqual",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::In => "in",
        };
        f.write_str(name)
    }
}

/// A node of a filter tree.
///
/// On the wire the node is tagged by `type`:
///
/// ```json
/// { "type": "and", "children": [
///     { "type": "compare", "path": "age", "op": "greaterThan", "value": 18 },
///     { "type": "compare", "path": "name", "op": "startsWith", "value": "A" }
/// ] }
/// ```
///
/// `not` carries a `children` list for symmetry with the other combinators
/// but must hold exactly one child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FilterNode {
    Compare {
        path: String,
        op: Operator,
        #[serde(default)]
        value: Value,
    },
    And {
        #[serde(default)]
        children: Vec<FilterNode>,
    },
    Or {
        #[serde(default)]
        children: Vec<FilterNode>,
    },
    Not {
        #[serde(default)]
        children: Vec<FilterNode>,
    },
}

impl FilterNode {
    /// A comparison leaf.
    pub fn compare(path: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        FilterNode::Compare {
            path: path.into(),
            op,
            value: value.into(),
        }
    }

    pub fn equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Operator::Equals, value)
    }

    pub fn not_equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Operator::NotEquals, value)
    }

    pub fn greater_than(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Operator::GreaterThan, value)
    }

    pub fn less_than(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Operator::LessThan, value)
    }

    /// Membership in a literal set.
    pub fn is_in(path: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::compare(path, Operator::In, values)
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::And { children }
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Or { children }
    }

    pub fn negate(child: FilterNode) -> Self {
        FilterNode::Not {
            children: vec![child],
        }
    }
}
