//! Sample record types for tests.
//!
//! - [`Person`]: integer key, scalar fields of every type, a to-one `city`
//! - [`City`]: uuid key, a nullable int and a nullable text field
//! - [`TreeItem`]: self-referencing `parent` / `children` relations

use crate::{Describe, FieldValue, Record, RecordShape, ScalarType, assign};
use chrono::{DateTime, Utc};
use keel_types::Value;
use std::sync::OnceLock;
use uuid::Uuid;

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

// ── Person ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub score: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub city_id: Option<Uuid>,
    pub city: Option<Box<City>>,
}

impl Person {
    pub fn new(id: i64, name: &str, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            email: None,
            score: 0.0,
            active: true,
            created_at: epoch(),
            city_id: None,
            city: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: City) -> Self {
        self.city_id = Some(city.id);
        self.city = Some(Box::new(city));
        self
    }
}

impl Record for Person {
    fn shape(&self) -> &'static RecordShape {
        Self::describe()
    }

    fn get_field(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "id" => FieldValue::scalar(self.id),
            "name" => FieldValue::scalar(self.name.clone()),
            "age" => FieldValue::scalar(self.age),
            "email" => FieldValue::scalar(self.email.clone()),
            "score" => FieldValue::scalar(self.score),
            "active" => FieldValue::scalar(self.active),
            "created_at" => FieldValue::scalar(self.created_at),
            "city_id" => FieldValue::scalar(self.city_id),
            "city" => FieldValue::One(self.city.as_deref().map(|c| c as &dyn Record)),
            _ => return None,
        })
    }

    fn set_field(&mut self, field: &str, value: Value) -> bool {
        match field {
            "id" => assign(&mut self.id, value),
            "name" => assign(&mut self.name, value),
            "age" => assign(&mut self.age, value),
            "email" => assign(&mut self.email, value),
            "score" => assign(&mut self.score, value),
            "active" => assign(&mut self.active, value),
            "created_at" => assign(&mut self.created_at, value),
            "city_id" => assign(&mut self.city_id, value),
            _ => false,
        }
    }

    fn unload(&mut self, relation: &str) {
        if relation == "city" {
            self.city = None;
        }
    }

    fn related_mut(&mut self, relation: &str) -> Vec<&mut dyn Record> {
        match relation {
            "city" => self
                .city
                .as_deref_mut()
                .map(|c| c as &mut dyn Record)
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Describe for Person {
    type Key = i64;

    fn describe() -> &'static RecordShape {
        static SHAPE: OnceLock<RecordShape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            RecordShape::builder("person", "id", ScalarType::Int)
                .field("name", ScalarType::Text)
                .field("age", ScalarType::Int)
                .nullable("email", ScalarType::Text)
                .field("score", ScalarType::Float)
                .field("active", ScalarType::Bool)
                .read_only("created_at", ScalarType::DateTime)
                .nullable("city_id", ScalarType::Uuid)
                .one("city", City::describe)
                .build()
        })
    }

    fn key(&self) -> i64 {
        self.id
    }
}

// ── City ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub id: Uuid,
    pub name: String,
    pub population: i64,
    pub demonym: Option<String>,
    pub some_nullable_int: Option<i64>,
}

impl City {
    pub fn new(name: &str, population: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            population,
            demonym: None,
            some_nullable_int: None,
        }
    }
}

impl Record for City {
    fn shape(&self) -> &'static RecordShape {
        Self::describe()
    }

    fn get_field(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "id" => FieldValue::scalar(self.id),
            "name" => FieldValue::scalar(self.name.clone()),
            "population" => FieldValue::scalar(self.population),
            "demonym" => FieldValue::scalar(self.demonym.clone()),
            "some_nullable_int" => FieldValue::scalar(self.some_nullable_int),
            _ => return None,
        })
    }

    fn set_field(&mut self, field: &str, value: Value) -> bool {
        match field {
            "id" => assign(&mut self.id, value),
            "name" => assign(&mut self.name, value),
            "population" => assign(&mut self.population, value),
            "demonym" => assign(&mut self.demonym, value),
            "some_nullable_int" => assign(&mut self.some_nullable_int, value),
            _ => false,
        }
    }
}

impl Describe for City {
    type Key = Uuid;

    fn describe() -> &'static RecordShape {
        static SHAPE: OnceLock<RecordShape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            RecordShape::builder("city", "id", ScalarType::Uuid)
                .field("name", ScalarType::Text)
                .field("population", ScalarType::Int)
                .nullable("demonym", ScalarType::Text)
                .nullable("some_nullable_int", ScalarType::Int)
                .build()
        })
    }

    fn key(&self) -> Uuid {
        self.id
    }
}

// ── TreeItem ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub parent: Option<Box<TreeItem>>,
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            parent: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: TreeItem) -> Self {
        self.parent_id = Some(parent.id);
        self.parent = Some(Box::new(parent));
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<TreeItem>) -> Self {
        self.children = children;
        self
    }
}

impl Record for TreeItem {
    fn shape(&self) -> &'static RecordShape {
        Self::describe()
    }

    fn get_field(&self, field: &str) -> Option<FieldValue<'_>> {
        Some(match field {
            "id" => FieldValue::scalar(self.id),
            "name" => FieldValue::scalar(self.name.clone()),
            "parent_id" => FieldValue::scalar(self.parent_id),
            "parent" => FieldValue::One(self.parent.as_deref().map(|p| p as &dyn Record)),
            "children" => {
                FieldValue::Many(self.children.iter().map(|c| c as &dyn Record).collect())
            }
            _ => return None,
        })
    }

    fn set_field(&mut self, field: &str, value: Value) -> bool {
        match field {
            "id" => assign(&mut self.id, value),
            "name" => assign(&mut self.name, value),
            "parent_id" => assign(&mut self.parent_id, value),
            _ => false,
        }
    }

    fn unload(&mut self, relation: &str) {
        match relation {
            "parent" => self.parent = None,
            "children" => self.children.clear(),
            _ => {}
        }
    }

    fn related_mut(&mut self, relation: &str) -> Vec<&mut dyn Record> {
        match relation {
            "parent" => self
                .parent
                .as_deref_mut()
                .map(|p| p as &mut dyn Record)
                .into_iter()
                .collect(),
            "children" => self
                .children
                .iter_mut()
                .map(|c| c as &mut dyn Record)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Describe for TreeItem {
    type Key = i64;

    fn describe() -> &'static RecordShape {
        static SHAPE: OnceLock<RecordShape> = OnceLock::new();
        SHAPE.get_or_init(|| {
            RecordShape::builder("tree_item", "id", ScalarType::Int)
                .field("name", ScalarType::Text)
                .nullable("parent_id", ScalarType::Int)
                .one("parent", TreeItem::describe)
                .many("children", TreeItem::describe)
                .build()
        })
    }

    fn key(&self) -> i64 {
        self.id
    }
}
