use crate::{Cardinality, FieldDef, FieldValue, PathError, Record, ScalarType, ShapeRef};
use keel_types::Value;
use std::collections::HashMap;
use std::fmt;

/// Separator between relation hops in a dotted path.
pub const PATH_SEPARATOR: char = '.';

/// The static field table of one record type.
///
/// Built once per type and then shared by reference. Field order follows
/// declaration order.
#[derive(Debug, Clone)]
pub struct RecordShape {
    name: &'static str,
    key: usize,
    fields: Vec<FieldDef>,
    index: HashMap<String, usize>,
}

impl RecordShape {
    /// Starts a shape declaration. Every shape has exactly one key field.
    pub fn builder(name: &'static str, key: &str, key_type: ScalarType) -> ShapeBuilder {
        let mut key_def = FieldDef::scalar(key, key_type);
        key_def.key = true;
        ShapeBuilder {
            name,
            fields: vec![key_def],
        }
    }

    /// The record type's name, used in diagnostics and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The identity field.
    #[must_use]
    pub fn key_field(&self) -> &FieldDef {
        &self.fields[self.key]
    }

    /// Looks up a field by exact name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter()
    }

    /// Relation fields in declaration order.
    pub fn relations(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_relation())
    }

    /// Resolves a dotted path (`parent.name`) against this shape.
    ///
    /// Every segment but the last must be a relation field; the last must
    /// exist. Whether the leaf may be a relation is the caller's decision.
    pub fn resolve(&self, path: &str) -> Result<FieldPath, PathError> {
        let mut shape = self;
        let mut hops = Vec::new();
        let mut segments = path.split(PATH_SEPARATOR).peekable();

        while let Some(segment) = segments.next() {
            let Some(field) = shape.field(segment) else {
                return Err(PathError::UnknownField {
                    path: path.to_owned(),
                    segment: segment.to_owned(),
                    shape: shape.name,
                });
            };

            if segments.peek().is_none() {
                return Ok(FieldPath {
                    hops,
                    field: field.clone(),
                });
            }

            let Some((target, cardinality)) = field.kind.relation() else {
                return Err(PathError::NotRelation {
                    path: path.to_owned(),
                    segment: segment.to_owned(),
                    shape: shape.name,
                });
            };
            hops.push(PathSegment {
                name: field.name.clone(),
                cardinality,
            });
            shape = target;
        }

        // `split` always yields at least one segment, so the loop returns.
        Err(PathError::UnknownField {
            path: path.to_owned(),
            segment: String::new(),
            shape: self.name,
        })
    }
}

/// Declares the fields of a [`RecordShape`].
#[derive(Debug)]
pub struct ShapeBuilder {
    name: &'static str,
    fields: Vec<FieldDef>,
}

impl ShapeBuilder {
    /// Adds a non-nullable scalar field.
    #[must_use]
    pub fn field(self, name: &str, scalar: ScalarType) -> Self {
        self.push(FieldDef::scalar(name, scalar))
    }

    /// Adds a nullable scalar field.
    #[must_use]
    pub fn nullable(self, name: &str, scalar: ScalarType) -> Self {
        let mut def = FieldDef::scalar(name, scalar);
        def.nullable = true;
        self.push(def)
    }

    /// Adds a server-assigned scalar field that patches may not touch.
    #[must_use]
    pub fn read_only(self, name: &str, scalar: ScalarType) -> Self {
        let mut def = FieldDef::scalar(name, scalar);
        def.read_only = true;
        self.push(def)
    }

    /// Adds a to-one relation.
    #[must_use]
    pub fn one(self, name: &str, target: ShapeRef) -> Self {
        self.push(FieldDef::relation(name, Cardinality::One, target))
    }

    /// Adds a to-many relation.
    #[must_use]
    pub fn many(self, name: &str, target: ShapeRef) -> Self {
        self.push(FieldDef::relation(name, Cardinality::Many, target))
    }

    /// Adds a prepared field definition.
    ///
    /// # Panics
    ///
    /// Panics if the shape already has a field with the same name. Shapes
    /// are static tables, so a duplicate is a bug in the record type.
    #[must_use]
    pub fn push(mut self, def: FieldDef) -> Self {
        assert!(
            self.fields.iter().all(|f| f.name != def.name),
            "duplicate field `{}` on `{}`",
            def.name,
            self.name
        );
        self.fields.push(def);
        self
    }

    pub fn build(self) -> RecordShape {
        let index = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        RecordShape {
            name: self.name,
            key: 0,
            fields: self.fields,
            index,
        }
    }
}

/// One relation hop of a resolved path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub name: String,
    pub cardinality: Cardinality,
}

/// A dotted path resolved against a shape: the relation hops taken and the
/// field the path ends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub hops: Vec<PathSegment>,
    pub field: FieldDef,
}

impl FieldPath {
    /// The scalar type of the leaf, or `None` when the path ends on a relation.
    #[must_use]
    pub fn scalar(&self) -> Option<ScalarType> {
        self.field.kind.scalar()
    }

    /// Whether the path yields at most one value per record.
    #[must_use]
    pub fn is_single_valued(&self) -> bool {
        self.hops.iter().all(|h| h.cardinality == Cardinality::One)
    }

    /// Iterates the segment names, hops first, leaf last.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.hops
            .iter()
            .map(|h| h.name.as_str())
            .chain(std::iter::once(self.field.name.as_str()))
    }

    /// Reads the leaf values reachable from `record`.
    ///
    /// A missing to-one hop contributes a single null (null propagation)
    /// unless a to-many hop follows it. A to-many hop contributes one value
    /// per related record, so an empty collection contributes none.
    pub fn read(&self, record: &dyn Record) -> Vec<Value> {
        let mut out = Vec::new();
        read_into(record, &self.hops, &self.field.name, &mut out);
        out
    }
}

fn read_into(record: &dyn Record, hops: &[PathSegment], leaf: &str, out: &mut Vec<Value>) {
    let Some((hop, rest)) = hops.split_first() else {
        match record.get_field(leaf) {
            Some(FieldValue::Scalar(v)) => out.push(v),
            _ => out.push(Value::Null),
        }
        return;
    };

    match record.get_field(&hop.name) {
        Some(FieldValue::One(Some(related))) => read_into(related, rest, leaf, out),
        Some(FieldValue::Many(related)) => {
            for r in related {
                read_into(r, rest, leaf, out);
            }
        }
        _ => {
            if rest.iter().all(|h| h.cardinality == Cardinality::One) {
                out.push(Value::Null);
            }
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
