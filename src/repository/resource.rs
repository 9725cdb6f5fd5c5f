use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{Id, PageRequest, PageResult, Summary};

/// A managed entity as the repository layer sees it: an identity, a parent
/// scope, and opaque fields.
///
/// `Draft` carries the caller-supplied fields of a create (parent included),
/// `Changes` those of an update.
pub trait Resource: Clone + Send + Sync + 'static {
    type Draft: Clone + Send + Sync + 'static;
    type Changes: Clone + Send + Sync + 'static;

    /// Human-readable entity name, used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> Id;

    /// The entity that scopes `list`/`list_paginated` (project → owner,
    /// epic → project, user story → epic, ...).
    fn parent_id(&self) -> Id;

    /// Short form for pickers (`list_short`).
    fn summary(&self) -> Summary;

    /// Materialize a new record locally. Only the in-memory store does this;
    /// remote records are built from the server's response.
    fn from_draft(id: Id, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply_changes(&mut self, changes: Self::Changes, now: DateTime<Utc>);
}

/// CRUD + paginated listing for one entity type.
///
/// Implementations normalize failures into [`ClientError`](crate::error::ClientError)
/// and return them; they never swallow an error.
#[async_trait]
pub trait ResourceRepository<T: Resource>: Send + Sync {
    /// Every record under `parent_id`, in store order.
    async fn list(&self, parent_id: Id) -> Result<Vec<T>>;

    async fn list_paginated(&self, parent_id: Id, page: PageRequest) -> Result<PageResult<T>>;

    /// Id, code and name of every record under `parent_id`.
    async fn list_short(&self, parent_id: Id) -> Result<Vec<Summary>> {
        let records = self.list(parent_id).await?;
        Ok(records.iter().map(Resource::summary).collect())
    }

    async fn get(&self, id: Id) -> Result<T>;

    async fn create(&self, draft: T::Draft) -> Result<T>;

    async fn update(&self, id: Id, changes: T::Changes) -> Result<T>;

    async fn delete(&self, id: Id) -> Result<()>;
}
