//! Storage collaborator traits.

use async_trait::async_trait;
use keel_model::Describe;
use keel_query::{Predicate, QueryableSource, StorageResult, key};

/// Record persistence for one record type.
///
/// Mutations are staged; they become durable when the paired
/// [`UnitOfWork`] commits.
#[async_trait]
pub trait Repository<R: Describe + 'static>: Send + Sync {
    /// The query object returned by [`get_all`](Self::get_all).
    type Source: QueryableSource<R>;

    /// Stages an insert and returns the record as it will be stored.
    async fn add(&self, record: R) -> StorageResult<R>;

    /// Stages a replacement of the stored record with the same key.
    async fn update(&self, record: R) -> StorageResult<R>;

    /// Stages removal of every record matching `predicate`.
    async fn delete(&self, predicate: Predicate) -> StorageResult<()>;

    /// A query over every stored record.
    fn get_all(&self) -> Self::Source;

    /// Loads the record with `key`, if any.
    async fn get_by_id(&self, key: &R::Key) -> StorageResult<Option<R>> {
        let predicate = self.key_predicate(key);
        self.get_all().filter(predicate).first().await
    }

    fn key_predicate(&self, key: &R::Key) -> Predicate {
        key::for_one::<R>(key)
    }

    fn keys_predicate(&self, keys: &[R::Key]) -> Predicate {
        key::for_many::<R>(keys)
    }
}

/// Transaction boundary over staged repository mutations.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Makes every staged mutation durable, or none of them.
    async fn commit(&self) -> StorageResult<()>;
}
