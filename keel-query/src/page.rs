//! Paged query orchestration.

use crate::error::{CompileResult, QueryResult};
use crate::{
    ExpandDirective, FilterNode, OrderBy, Predicate, QueryableSource, SortKey, compile,
    compile_sort,
};
use keel_model::RecordShape;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A request for one page of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_expand<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.expand = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.orders.push(order);
        self
    }

    #[must_use]
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn with_take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }
}

/// One page of results plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// Count of the filtered set before skip/take.
    pub total_items: u64,
}

impl<T> PageResult<T> {
    /// Projects every item, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
        }
    }
}

/// A [`PageRequest`] compiled against a shape, ready to run on a source.
#[derive(Debug, Clone)]
pub struct PagePlan {
    pub predicate: Predicate,
    pub sort: Vec<SortKey>,
    pub expand: ExpandDirective,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

impl PagePlan {
    /// Validates every part of the request. Nothing is executed.
    pub fn compile(shape: &RecordShape, request: &PageRequest) -> CompileResult<Self> {
        let predicate = compile(shape, request.filter.as_ref())?;
        let sort = compile_sort(shape, &request.orders)?;
        let expand = match &request.expand {
            Some(paths) => ExpandDirective::build(shape, paths)?,
            None => ExpandDirective::default(),
        };
        Ok(Self {
            predicate,
            sort,
            expand,
            skip: request.skip,
            take: request.take,
        })
    }

    /// Runs the plan: filter, count the filtered set, then order, expand,
    /// skip, take and materialize.
    pub async fn execute<R, S>(self, source: S) -> QueryResult<PageResult<R>>
    where
        R: Send,
        S: QueryableSource<R>,
    {
        let filtered = if self.predicate.is_all() {
            source
        } else {
            source.filter(self.predicate)
        };

        let total_items = filtered.count().await?;

        let mut query = filtered.order_by(self.sort).expand(self.expand);
        if let Some(skip) = self.skip {
            query = query.skip(skip);
        }
        if let Some(take) = self.take {
            query = query.take(take);
        }
        let items = query.to_list().await?;

        debug!(total_items, returned = items.len(), "page materialized");
        Ok(PageResult { items, total_items })
    }
}

/// Compiles `request` against `shape` and runs it on `source`.
///
/// Compilation completes before the source is touched, so an invalid
/// request never reaches storage.
pub async fn page<R, S>(
    source: S,
    shape: &RecordShape,
    request: &PageRequest,
) -> QueryResult<PageResult<R>>
where
    R: Send,
    S: QueryableSource<R>,
{
    let plan = PagePlan::compile(shape, request)?;
    plan.execute(source).await
}
