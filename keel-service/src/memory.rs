//! Non-persistent storage collaborators.
//!
//! A [`MemoryStore`] is one unit of work over an in-memory table. Mutations
//! apply to a working copy straight away, so later reads through the same
//! store (or any clone of it) see them; [`UnitOfWork::commit`] publishes
//! the working copy and [`MemoryStore::rollback`] discards it.
//! Stored records keep their whole relation graph; materialization drops
//! every relation the query did not ask to expand.

use crate::{Repository, UnitOfWork};
use async_trait::async_trait;
use keel_model::{Describe, FieldValue, Record};
use keel_query::{
    ExpandDirective, Matcher, Predicate, QueryableSource, SortKey, StorageError, StorageResult,
    compare_records,
};
use keel_types::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

struct State<R> {
    committed: Vec<R>,
    working: Vec<R>,
    /// Mutations applied to `working` since the last commit or rollback.
    pending: usize,
}

/// An in-memory [`Repository`] and [`UnitOfWork`] for records of type `R`.
///
/// Reads see every mutation made through the store, committed or not.
/// Clones share the same table and the same unit of work.
pub struct MemoryStore<R> {
    state: Arc<RwLock<State<R>>>,
}

impl<R> Clone for MemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<R: Describe + Clone + 'static> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Describe + Clone + 'static> MemoryStore<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// A store whose committed state is `records`.
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State {
                working: records.clone(),
                committed: records,
                pending: 0,
            })),
        }
    }

    /// A copy of the committed records, relations included.
    pub async fn snapshot(&self) -> Vec<R> {
        self.state.read().await.committed.clone()
    }

    /// Number of mutations waiting for a commit.
    pub async fn pending(&self) -> usize {
        self.state.read().await.pending
    }

    /// Discards every uncommitted mutation.
    pub async fn rollback(&self) {
        let mut state = self.state.write().await;
        let dropped = state.pending;
        state.working = state.committed.clone();
        state.pending = 0;
        debug!(record = R::describe().name(), dropped, "rolled back");
    }
}

#[async_trait]
impl<R: Describe + Clone + 'static> Repository<R> for MemoryStore<R> {
    type Source = MemorySource<R>;

    /// Fails when a record with the same key is already present.
    async fn add(&self, record: R) -> StorageResult<R> {
        let mut state = self.state.write().await;
        let key = key_of(&record);
        if state.working.iter().any(|r| key_of(r) == key) {
            return Err(StorageError::new(format!(
                "duplicate key {key} in `{}`",
                R::describe().name()
            )));
        }
        state.working.push(record.clone());
        state.pending += 1;
        Ok(record)
    }

    /// Writes the scalar fields of `record` onto the stored record with the
    /// same key. Stored relations are kept: `record` may have been loaded
    /// without them.
    async fn update(&self, record: R) -> StorageResult<R> {
        let mut state = self.state.write().await;
        let key = key_of(&record);
        let Some(stored) = state.working.iter_mut().find(|r| key_of(&**r) == key) else {
            return Err(StorageError::new(format!(
                "no `{}` record with key {key} to update",
                R::describe().name()
            )));
        };
        let mut updated = stored.clone();
        copy_scalars(&record, &mut updated)?;
        *stored = updated;
        state.pending += 1;
        Ok(record)
    }

    async fn delete(&self, predicate: Predicate) -> StorageResult<()> {
        let matcher = predicate.matcher();
        let mut state = self.state.write().await;
        state.working.retain(|r| !matcher.test(r));
        state.pending += 1;
        Ok(())
    }

    fn get_all(&self) -> MemorySource<R> {
        MemorySource {
            state: self.state.clone(),
            ops: Vec::new(),
            expand: ExpandDirective::default(),
        }
    }
}

#[async_trait]
impl<R: Describe + Clone + 'static> UnitOfWork for MemoryStore<R> {
    async fn commit(&self) -> StorageResult<()> {
        let mut state = self.state.write().await;
        if state.pending == 0 {
            return Ok(());
        }
        let changes = state.pending;
        state.committed = state.working.clone();
        state.pending = 0;
        debug!(record = R::describe().name(), changes, "committed");
        Ok(())
    }
}

fn key_of<R: Describe>(record: &R) -> Value {
    record.key().into()
}

/// Writes every scalar field of `from` onto `to`.
fn copy_scalars<R: Describe>(from: &R, to: &mut R) -> StorageResult<()> {
    for field in R::describe().fields().filter(|f| !f.is_relation()) {
        let Some(FieldValue::Scalar(value)) = from.get_field(&field.name) else {
            continue;
        };
        if !to.set_field(&field.name, value) {
            return Err(StorageError::new(format!(
                "field `{}` of `{}` could not be written",
                field.name,
                R::describe().name()
            )));
        }
    }
    Ok(())
}

enum Op {
    Filter(Matcher),
    Order(Vec<SortKey>),
    Skip(usize),
    Take(usize),
}

/// A lazily evaluated query over a [`MemoryStore`].
///
/// Operators are recorded in call order and replayed over the store's
/// current records, uncommitted mutations included, when the query is
/// counted or materialized.
pub struct MemorySource<R> {
    state: Arc<RwLock<State<R>>>,
    ops: Vec<Op>,
    expand: ExpandDirective,
}

impl<R: Describe> MemorySource<R> {
    fn select<'a>(&self, rows: &'a [R]) -> Vec<&'a R> {
        let mut selected: Vec<&R> = rows.iter().collect();
        for op in &self.ops {
            match op {
                Op::Filter(matcher) => selected.retain(|r| matcher.test(*r)),
                Op::Order(keys) => selected.sort_by(|a, b| compare_records(keys, *a, *b)),
                Op::Skip(n) => {
                    let n = (*n).min(selected.len());
                    selected.drain(..n);
                }
                Op::Take(n) => selected.truncate(*n),
            }
        }
        selected
    }
}

#[async_trait]
impl<R: Describe + Clone + 'static> QueryableSource<R> for MemorySource<R> {
    fn filter(mut self, predicate: Predicate) -> Self {
        self.ops.push(Op::Filter(predicate.matcher()));
        self
    }

    fn order_by(mut self, keys: Vec<SortKey>) -> Self {
        if !keys.is_empty() {
            self.ops.push(Op::Order(keys));
        }
        self
    }

    fn expand(mut self, directive: ExpandDirective) -> Self {
        self.expand = directive;
        self
    }

    fn skip(mut self, count: usize) -> Self {
        self.ops.push(Op::Skip(count));
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.ops.push(Op::Take(count));
        self
    }

    async fn count(&self) -> StorageResult<u64> {
        let state = self.state.read().await;
        Ok(self.select(&state.working).len() as u64)
    }

    async fn to_list(self) -> StorageResult<Vec<R>> {
        let state = self.state.read().await;
        let mut records: Vec<R> = self
            .select(&state.working)
            .into_iter()
            .cloned()
            .collect();
        for record in &mut records {
            prune(record, &self.expand);
        }
        Ok(records)
    }
}

/// Drops every relation of `record` that `directive` does not name,
/// recursing into the ones it keeps.
fn prune(record: &mut dyn Record, directive: &ExpandDirective) {
    let shape = record.shape();
    for relation in shape.relations() {
        if directive.includes(&relation.name) {
            let nested = directive.nested(&relation.name);
            for child in record.related_mut(&relation.name) {
                prune(child, &nested);
            }
        } else {
            record.unload(&relation.name);
        }
    }
}
