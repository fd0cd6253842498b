//! The storage collaborator's composable query object.

use crate::error::StorageResult;
use crate::{ExpandDirective, Predicate, SortKey};
use async_trait::async_trait;

/// A lazily executed query over records of type `R`.
///
/// Builder methods consume and return the source so implementations can
/// accumulate operators before anything runs. Nothing touches storage until
/// [`count`](Self::count), [`to_list`](Self::to_list) or
/// [`first`](Self::first) is awaited.
///
/// Operators compose in call order: a `filter` after a `take` filters the
/// truncated set.
#[async_trait]
pub trait QueryableSource<R: Send>: Sized + Send {
    /// Narrows the source to records matching `predicate`.
    fn filter(self, predicate: Predicate) -> Self;

    /// Orders the source. Later calls replace earlier orderings.
    fn order_by(self, keys: Vec<SortKey>) -> Self;

    /// Eager-loads the relations named by `directive`.
    fn expand(self, directive: ExpandDirective) -> Self;

    fn skip(self, count: usize) -> Self;

    fn take(self, count: usize) -> Self;

    /// Counts the records the source currently describes.
    async fn count(&self) -> StorageResult<u64>;

    /// Executes the query.
    async fn to_list(self) -> StorageResult<Vec<R>>;

    /// Executes the query for at most one record.
    async fn first(self) -> StorageResult<Option<R>> {
        Ok(self.take(1).to_list().await?.into_iter().next())
    }
}
