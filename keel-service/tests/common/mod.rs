//! Shared test helpers for service tests.

#![allow(dead_code)]

use async_trait::async_trait;
use keel_model::Describe;
use keel_model::fixtures::{City, Person};
use keel_query::{Predicate, StorageError, StorageResult};
use keel_service::memory::{MemorySource, MemoryStore};
use keel_service::{ConvertMapper, EntityService, Repository, UnitOfWork};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The external form of a [`Person`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDto {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub city: Option<String>,
}

impl PersonDto {
    pub fn new(id: i64, name: &str, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            email: None,
            city: None,
        }
    }
}

impl From<PersonDto> for Person {
    fn from(dto: PersonDto) -> Self {
        let mut person = Person::new(dto.id, &dto.name, dto.age);
        person.email = dto.email;
        person
    }
}

impl From<&Person> for PersonDto {
    fn from(p: &Person) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            age: p.age,
            email: p.email.clone(),
            city: p.city.as_ref().map(|c| c.name.clone()),
        }
    }
}

pub type PersonService =
    EntityService<PersonDto, Person, MemoryStore<Person>, MemoryStore<Person>, ConvertMapper>;

/// Alice (20), Bob (30), Amy (15). Alice lives in Oslo.
pub fn people() -> Vec<Person> {
    vec![
        Person::new(1, "Alice", 20).with_city(City::new("Oslo", 700_000)),
        Person::new(2, "Bob", 30),
        Person::new(3, "Amy", 15),
    ]
}

/// A service over a store seeded with `records`, plus a handle on the store.
pub fn service_with(records: Vec<Person>) -> (PersonService, MemoryStore<Person>) {
    init_tracing();
    let store = MemoryStore::with_records(records);
    let service = EntityService::new(store.clone(), store.clone(), ConvertMapper);
    (service, store)
}

pub fn ids(dtos: &[PersonDto]) -> Vec<i64> {
    dtos.iter().map(|d| d.id).collect()
}

/// Forwards to a [`MemoryStore`] and counts every storage call.
#[derive(Clone)]
pub struct CountingStore<R> {
    inner: MemoryStore<R>,
    calls: Arc<AtomicUsize>,
}

impl<R: Describe + Clone + 'static> CountingStore<R> {
    pub fn new(inner: MemoryStore<R>) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<R: Describe + Clone + 'static> Repository<R> for CountingStore<R> {
    type Source = MemorySource<R>;

    async fn add(&self, record: R) -> StorageResult<R> {
        self.touch();
        self.inner.add(record).await
    }

    async fn update(&self, record: R) -> StorageResult<R> {
        self.touch();
        self.inner.update(record).await
    }

    async fn delete(&self, predicate: Predicate) -> StorageResult<()> {
        self.touch();
        self.inner.delete(predicate).await
    }

    fn get_all(&self) -> MemorySource<R> {
        self.touch();
        self.inner.get_all()
    }
}

#[async_trait]
impl<R: Describe + Clone + 'static> UnitOfWork for CountingStore<R> {
    async fn commit(&self) -> StorageResult<()> {
        self.touch();
        self.inner.commit().await
    }
}

/// A unit of work whose commit always fails.
pub struct BrokenUnitOfWork;

#[async_trait]
impl UnitOfWork for BrokenUnitOfWork {
    async fn commit(&self) -> StorageResult<()> {
        Err(StorageError::new("connection reset"))
    }
}
