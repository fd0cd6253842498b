//! Shared test helpers for query tests.

#![allow(dead_code)]

use async_trait::async_trait;
use keel_model::Record;
use keel_model::fixtures::Person;
use keel_query::{
    ExpandDirective, Predicate, QueryableSource, SortKey, StorageError, StorageResult,
    compare_records,
};
use std::sync::{Arc, Mutex};

/// A source over an in-memory vector that applies each operator eagerly
/// and records the order operators were applied in.
pub struct VecSource<R> {
    rows: Vec<R>,
    expand: ExpandDirective,
    log: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl<R: Record + Clone> VecSource<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self {
            rows,
            expand: ExpandDirective::default(),
            log: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    /// A source whose terminal operations fail.
    pub fn failing(rows: Vec<R>) -> Self {
        Self {
            fail: true,
            ..Self::new(rows)
        }
    }

    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }

    fn record(&self, op: &str) {
        self.log.lock().unwrap().push(op.to_string());
    }
}

#[async_trait]
impl<R: Record + Clone + 'static> QueryableSource<R> for VecSource<R> {
    fn filter(mut self, predicate: Predicate) -> Self {
        self.record("filter");
        let matcher = predicate.matcher();
        self.rows.retain(|r| matcher.test(r));
        self
    }

    fn order_by(mut self, keys: Vec<SortKey>) -> Self {
        self.record("order_by");
        self.rows.sort_by(|a, b| compare_records(&keys, a, b));
        self
    }

    fn expand(mut self, directive: ExpandDirective) -> Self {
        self.record("expand");
        self.expand = directive;
        self
    }

    fn skip(mut self, count: usize) -> Self {
        self.record("skip");
        let count = count.min(self.rows.len());
        self.rows.drain(..count);
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.record("take");
        self.rows.truncate(count);
        self
    }

    async fn count(&self) -> StorageResult<u64> {
        self.record("count");
        if self.fail {
            return Err(StorageError::new("disk on fire"));
        }
        Ok(self.rows.len() as u64)
    }

    async fn to_list(self) -> StorageResult<Vec<R>> {
        self.record("to_list");
        if self.fail {
            return Err(StorageError::new("disk on fire"));
        }
        Ok(self.rows)
    }
}

/// Alice (20), Bob (30), Amy (15).
pub fn people() -> Vec<Person> {
    vec![
        Person::new(1, "Alice", 20),
        Person::new(2, "Bob", 30),
        Person::new(3, "Amy", 15),
    ]
}

pub fn ids(people: &[Person]) -> Vec<i64> {
    people.iter().map(|p| p.id).collect()
}
