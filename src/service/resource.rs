use std::sync::Arc;

use crate::error::Result;
use crate::repository::{Resource, ResourceRepository};
use crate::types::{Id, PageRequest, PageResult, Summary};

/// Domain façade over one repository.
///
/// Errors pass through unchanged. Screens hold one of these per aggregate and
/// never see which backend sits underneath.
pub struct ResourceService<T: Resource> {
    repo: Arc<dyn ResourceRepository<T>>,
}

impl<T: Resource> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<T: Resource> ResourceService<T> {
    pub fn new(repo: Arc<dyn ResourceRepository<T>>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, parent_id: Id) -> Result<Vec<T>> {
        self.repo.list(parent_id).await
    }

    pub async fn list_paginated(&self, parent_id: Id, page: PageRequest) -> Result<PageResult<T>> {
        self.repo.list_paginated(parent_id, page).await
    }

    /// Lightweight id/code/name rows for pickers and breadcrumbs.
    pub async fn list_short(&self, parent_id: Id) -> Result<Vec<Summary>> {
        self.repo.list_short(parent_id).await
    }

    pub async fn get(&self, id: Id) -> Result<T> {
        self.repo.get(id).await
    }

    pub async fn create(&self, draft: T::Draft) -> Result<T> {
        let created = self.repo.create(draft).await?;
        tracing::info!("{} {} created", T::KIND, created.id());
        Ok(created)
    }

    pub async fn update(&self, id: Id, changes: T::Changes) -> Result<T> {
        let updated = self.repo.update(id, changes).await?;
        tracing::info!("{} {id} updated", T::KIND);
        Ok(updated)
    }

    /// Hard delete. Deactivation, where the entity supports it, is an
    /// `update` with the active flag cleared.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.repo.delete(id).await?;
        tracing::info!("{} {id} deleted", T::KIND);
        Ok(())
    }
}
