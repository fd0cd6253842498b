//! Expand builder: relation path strings → [`ExpandDirective`].

use crate::error::CompileResult;
use crate::CompileError;
use keel_model::RecordShape;
use std::fmt;

/// A validated chain of relation fields, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationPath {
    segments: Vec<String>,
}

impl RelationPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether `prefix` is a leading run of this path's segments.
    #[must_use]
    pub fn starts_with(&self, prefix: &RelationPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for RelationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// The relations to eager-load alongside queried records.
///
/// Paths are unique and none is a prefix of another: loading `parent.city`
/// already loads `parent`. Order follows first appearance in the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandDirective {
    paths: Vec<RelationPath>,
}

impl ExpandDirective {
    /// Validates `paths` against `shape`.
    ///
    /// Every segment must name a relation field of the shape reached so far.
    pub fn build<S: AsRef<str>>(shape: &RecordShape, paths: &[S]) -> CompileResult<Self> {
        let mut directive = Self::default();
        for raw in paths {
            let raw = raw.as_ref();
            let resolved = shape.resolve(raw)?;
            if !resolved.field.is_relation() {
                return Err(CompileError::UnknownField {
                    path: raw.to_owned(),
                    detail: format!("`{}` is not a relation", resolved.field.name),
                });
            }
            directive.insert(RelationPath {
                segments: resolved.segments().map(str::to_owned).collect(),
            });
        }
        Ok(directive)
    }

    fn insert(&mut self, path: RelationPath) {
        if self.paths.iter().any(|existing| existing.starts_with(&path)) {
            return;
        }
        // At most one existing path can be a prefix of the new one.
        match self.paths.iter().position(|existing| path.starts_with(existing)) {
            Some(i) => self.paths[i] = path,
            None => self.paths.push(path),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn paths(&self) -> &[RelationPath] {
        &self.paths
    }

    /// Whether the directive loads the top-level relation `name`.
    #[must_use]
    pub fn includes(&self, name: &str) -> bool {
        self.paths.iter().any(|p| p.segments[0] == name)
    }

    /// The directive to apply to records reached through `name`.
    #[must_use]
    pub fn nested(&self, name: &str) -> ExpandDirective {
        let paths = self
            .paths
            .iter()
            .filter(|p| p.segments.len() > 1 && p.segments[0] == name)
            .map(|p| RelationPath {
                segments: p.segments[1..].to_vec(),
            })
            .collect();
        ExpandDirective { paths }
    }
}
