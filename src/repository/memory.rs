use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{ClientError, Result};
use crate::types::{Id, PageRequest, PageResult};

use super::resource::{Resource, ResourceRepository};

/// A process-local fixture store.
///
/// Records keep insertion order. New ids are one past the highest id this
/// store has ever held, so a deleted id is never handed out again. Id
/// assignment assumes a single writer; concurrent creators through separate
/// handles to the same data are not supported.
pub struct InMemoryRepository<T> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    records: Vec<T>,
    high_water: Id,
}

impl<T: Resource> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Resource> InMemoryRepository<T> {
    pub fn new(seed: Vec<T>) -> Self {
        let high_water = seed.iter().map(Resource::id).max().unwrap_or(0);
        Self {
            inner: Mutex::new(Inner {
                records: seed,
                high_water,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn scoped(&self, parent_id: Id) -> Vec<T> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.parent_id() == parent_id)
            .cloned()
            .collect()
    }

    fn not_found(id: Id) -> ClientError {
        ClientError::NotFound {
            entity: T::KIND,
            id,
        }
    }
}

#[async_trait]
impl<T: Resource> ResourceRepository<T> for InMemoryRepository<T> {
    async fn list(&self, parent_id: Id) -> Result<Vec<T>> {
        Ok(self.scoped(parent_id))
    }

    async fn list_paginated(&self, parent_id: Id, page: PageRequest) -> Result<PageResult<T>> {
        Ok(PageResult::from_slice(&self.scoped(parent_id), page))
    }

    async fn get(&self, id: Id) -> Result<T> {
        self.lock()
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, draft: T::Draft) -> Result<T> {
        let mut inner = self.lock();
        let max_existing = inner.records.iter().map(Resource::id).max().unwrap_or(0);
        let id = inner.high_water.max(max_existing) + 1;
        inner.high_water = id;
        let record = T::from_draft(id, draft, Utc::now());
        inner.records.push(record.clone());
        tracing::debug!("memory: created {} {id}", T::KIND);
        Ok(record)
    }

    async fn update(&self, id: Id, changes: T::Changes) -> Result<T> {
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply_changes(changes, Utc::now());
        Ok(record.clone())
    }

    async fn delete(&self, id: Id) -> Result<()> {
        let mut inner = self.lock();
        let before = inner.records.len();
        inner.records.retain(|r| r.id() != id);
        if inner.records.len() == before {
            return Err(Self::not_found(id));
        }
        tracing::debug!("memory: deleted {} {id}", T::KIND);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Project, ProjectChanges, ProjectDraft};

    fn draft(name: &str) -> ProjectDraft {
        ProjectDraft {
            owner_id: 1,
            name: name.to_owned(),
            description: format!("{name} description"),
        }
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let repo = InMemoryRepository::<Project>::default();
        assert_eq!(repo.create(draft("A")).await.unwrap().id, 1);
        assert_eq!(repo.create(draft("B")).await.unwrap().id, 2);
        repo.delete(1).await.unwrap();
        assert_eq!(repo.create(draft("C")).await.unwrap().id, 3);
        repo.delete(3).await.unwrap();
        assert_eq!(repo.create(draft("D")).await.unwrap().id, 4);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = InMemoryRepository::<Project>::default();
        let created = repo.create(draft("Apollo")).await.unwrap();
        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Apollo");
        assert_eq!(fetched.description, "Apollo description");
        assert_eq!(fetched.owner_id, 1);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let repo = InMemoryRepository::<Project>::default();
        let err = repo.get(42).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::NotFound {
                entity: "project",
                id: 42
            }
        );
    }

    #[tokio::test]
    async fn update_twice_is_idempotent_modulo_timestamp() {
        let repo = InMemoryRepository::<Project>::default();
        let created = repo.create(draft("Apollo")).await.unwrap();
        let changes = ProjectChanges {
            name: "Artemis".to_owned(),
            description: "moon again".to_owned(),
            active: Some(false),
        };
        let first = repo.update(created.id, changes.clone()).await.unwrap();
        let second = repo.update(created.id, changes).await.unwrap();
        assert_eq!(
            Project {
                updated_at: None,
                ..first
            },
            Project {
                updated_at: None,
                ..second
            }
        );
    }

    #[tokio::test]
    async fn list_is_scoped_by_parent() {
        let repo = InMemoryRepository::<Project>::default();
        repo.create(draft("mine")).await.unwrap();
        repo.create(ProjectDraft {
            owner_id: 2,
            ..draft("theirs")
        })
        .await
        .unwrap();

        let mine = repo.list(1).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "mine");
        assert!(repo.list(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn paginated_listing_covers_scope() {
        let repo = InMemoryRepository::<Project>::default();
        for i in 0..7 {
            repo.create(draft(&format!("p{i}"))).await.unwrap();
        }
        let first = repo.list_paginated(1, PageRequest::new(1, 3)).await.unwrap();
        assert_eq!(first.total, 7);
        assert_eq!(first.pages, 3);

        let mut names = Vec::new();
        for page in 1..=first.pages {
            let result = repo.list_paginated(1, PageRequest::new(page, 3)).await.unwrap();
            names.extend(result.items.into_iter().map(|p| p.name));
        }
        let expected: Vec<String> = (0..7).map(|i| format!("p{i}")).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn empty_scope_has_one_page() {
        let repo = InMemoryRepository::<Project>::default();
        let result = repo.list_paginated(1, PageRequest::new(1, 10)).await.unwrap();
        assert_eq!(result.pages, 1);
        assert_eq!(result.page, 1);
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn seeded_store_continues_after_highest_id() {
        let repo = InMemoryRepository::new(vec![Project::from_draft(10, draft("old"), Utc::now())]);
        assert_eq!(repo.create(draft("new")).await.unwrap().id, 11);
    }
}
