//! The entity service.

use crate::{Mapper, Patch, Repository, ServiceConfig, ServiceError, ServiceResult, UnitOfWork};
use keel_model::{Describe, RecordShape};
use keel_query::{ExpandDirective, PagePlan, PageRequest, PageResult, QueryableSource};
use keel_types::Value;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Create, read, page, patch and delete for records of type `R`, exposed
/// as dtos of type `D`.
///
/// Every operation validates its whole request against `R`'s shape before
/// the first storage call, so a rejected request never causes a partial
/// mutation. Mutating operations commit the unit of work when
/// [`ServiceConfig::auto_commit`] is on.
///
/// Updates are last-write-wins: no concurrency token is checked between
/// loading a record and writing it back.
pub struct EntityService<D, R, P, U, M> {
    repository: P,
    unit_of_work: U,
    mapper: M,
    config: ServiceConfig,
    _types: PhantomData<fn(D) -> R>,
}

impl<D, R, P, U, M> EntityService<D, R, P, U, M>
where
    D: Send,
    R: Describe + 'static,
    P: Repository<R>,
    U: UnitOfWork,
    M: Mapper<D, R>,
{
    /// Creates a service with the default configuration.
    pub fn new(repository: P, unit_of_work: U, mapper: M) -> Self {
        Self::with_config(repository, unit_of_work, mapper, ServiceConfig::default())
    }

    pub fn with_config(repository: P, unit_of_work: U, mapper: M, config: ServiceConfig) -> Self {
        Self {
            repository,
            unit_of_work,
            mapper,
            config,
            _types: PhantomData,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Turns per-operation commits on or off.
    pub fn set_auto_commit(&mut self, auto_commit: bool) {
        self.config.auto_commit = auto_commit;
    }

    fn shape() -> &'static RecordShape {
        R::describe()
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Loads the record with `key`, eager-loading the `expand` relations.
    pub async fn get_by_id(&self, key: &R::Key, expand: &[&str]) -> ServiceResult<D> {
        let directive = self.expand_directive("get_by_id", expand)?;
        debug!(record = Self::shape().name(), key = ?key, "get by id");

        let found = self
            .repository
            .get_all()
            .filter(self.repository.key_predicate(key))
            .expand(directive)
            .first()
            .await?;

        match found {
            Some(record) => Ok(self.mapper.to_dto(&record)),
            None => Err(not_found::<R>(key)),
        }
    }

    /// Loads every record whose key is in `keys`.
    ///
    /// Keys with no stored record are skipped, not reported.
    pub async fn get_by_ids(&self, keys: &[R::Key], expand: &[&str]) -> ServiceResult<Vec<D>> {
        let directive = self.expand_directive("get_by_ids", expand)?;
        debug!(record = Self::shape().name(), keys = keys.len(), "get by ids");

        let records = self
            .repository
            .get_all()
            .filter(self.repository.keys_predicate(keys))
            .expand(directive)
            .to_list()
            .await?;

        if records.len() < keys.len() {
            debug!(
                record = Self::shape().name(),
                requested = keys.len(),
                found = records.len(),
                "some keys not found"
            );
        }
        Ok(records.iter().map(|r| self.mapper.to_dto(r)).collect())
    }

    /// Runs a paged query and projects each item.
    pub async fn get_paged(&self, request: &PageRequest) -> ServiceResult<PageResult<D>> {
        let plan = PagePlan::compile(Self::shape(), request)
            .map_err(|e| self.rejected("get_paged", e))?;
        debug!(
            record = Self::shape().name(),
            skip = ?request.skip,
            take = ?request.take,
            "get paged"
        );

        let page = plan.execute(self.repository.get_all()).await?;
        Ok(page.map(|r| self.mapper.to_dto(&r)))
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Stores a new record built from `dto` and returns it projected back.
    pub async fn create(&self, dto: D) -> ServiceResult<D> {
        let record = self.mapper.to_record(dto);
        debug!(record = Self::shape().name(), key = ?record.key(), "create");

        let stored = self.repository.add(record).await?;
        self.commit().await?;
        Ok(self.mapper.to_dto(&stored))
    }

    /// Applies `patch` to the record with `key` and stores the result.
    pub async fn update(&self, key: &R::Key, patch: &Patch) -> ServiceResult<D> {
        let prepared = patch
            .prepare(Self::shape())
            .map_err(|e| self.rejected("update", e))?;
        debug!(
            record = Self::shape().name(),
            key = ?key,
            fields = prepared.len(),
            "update"
        );

        let Some(mut record) = self.repository.get_by_id(key).await? else {
            return Err(not_found::<R>(key));
        };
        prepared.apply_to(&mut record)?;

        let stored = self.repository.update(record).await?;
        self.commit().await?;
        Ok(self.mapper.to_dto(&stored))
    }

    /// Removes the record with `key`. Removing an absent key is not an
    /// error.
    pub async fn delete(&self, key: &R::Key) -> ServiceResult<()> {
        debug!(record = Self::shape().name(), key = ?key, "delete");
        self.repository
            .delete(self.repository.key_predicate(key))
            .await?;
        self.commit().await
    }

    // ── Helpers ──────────────────────────────────────────────────

    async fn commit(&self) -> ServiceResult<()> {
        if !self.config.auto_commit {
            return Ok(());
        }
        debug!(record = Self::shape().name(), "commit");
        self.unit_of_work.commit().await?;
        Ok(())
    }

    fn expand_directive(&self, op: &'static str, paths: &[&str]) -> ServiceResult<ExpandDirective> {
        ExpandDirective::build(Self::shape(), paths).map_err(|e| self.rejected(op, e))
    }

    fn rejected(&self, op: &'static str, err: impl Into<ServiceError>) -> ServiceError {
        let err = err.into();
        warn!(
            record = Self::shape().name(),
            op,
            kind = %err.kind(),
            error = %err,
            "request rejected"
        );
        err
    }
}

fn not_found<R: Describe>(key: &R::Key) -> ServiceError {
    let key: Value = key.clone().into();
    ServiceError::NotFound {
        shape: R::describe().name(),
        key: key.to_string(),
    }
}
