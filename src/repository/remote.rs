use std::marker::PhantomData;

use async_trait::async_trait;

use crate::error::Result;
use crate::transport::TransportClient;
use crate::types::{Epic, Id, PageRequest, PageResult, Summary};

use super::resource::{Resource, ResourceRepository};
use super::wire::{RawSummary, RemoteResource, WirePage};

/// Generic repository over the tracker service.
///
/// Entity specifics (endpoint, wire shapes, mapping) come from the
/// [`RemoteResource`] impl of `T`; this type only sequences the HTTP call,
/// maps the status into the error taxonomy and decodes the body.
pub struct RemoteRepository<T> {
    client: TransportClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for RemoteRepository<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: RemoteResource> RemoteRepository<T> {
    pub fn new(client: TransportClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    fn failure(action: &str) -> String {
        format!("Failed to {action} {}", T::KIND)
    }
}

#[async_trait]
impl<T: RemoteResource> ResourceRepository<T> for RemoteRepository<T> {
    async fn list(&self, parent_id: Id) -> Result<Vec<T>> {
        let path = T::ENDPOINT.list_path(parent_id);
        let resp = self
            .client
            .get(&path)
            .await?
            .error_for_status(&Self::failure("load"), None)?;
        let raw: Vec<T::Wire> = resp.json()?;
        Ok(raw.into_iter().map(T::from_wire).collect())
    }

    async fn list_paginated(&self, parent_id: Id, page: PageRequest) -> Result<PageResult<T>> {
        let page = PageRequest::new(page.page, page.size);
        let path = T::ENDPOINT.page_path(parent_id, page);
        let resp = self
            .client
            .get(&path)
            .await?
            .error_for_status(&Self::failure("load"), None)?;
        let raw: WirePage<T::Wire> = resp.json()?;
        Ok(raw.into_domain(page, T::from_wire))
    }

    async fn list_short(&self, parent_id: Id) -> Result<Vec<Summary>> {
        let Some(path) = T::ENDPOINT.short_path(parent_id) else {
            let records = self.list(parent_id).await?;
            return Ok(records.iter().map(Resource::summary).collect());
        };
        let resp = self
            .client
            .get(&path)
            .await?
            .error_for_status(&Self::failure("load"), None)?;
        let raw: Vec<RawSummary> = resp.json()?;
        Ok(raw.into_iter().map(Summary::from).collect())
    }

    async fn get(&self, id: Id) -> Result<T> {
        let resp = self
            .client
            .get(&T::ENDPOINT.item_path(id))
            .await?
            .error_for_status(&Self::failure("load"), Some((T::KIND, id)))?;
        Ok(T::from_wire(resp.json()?))
    }

    async fn create(&self, draft: T::Draft) -> Result<T> {
        let body = T::draft_to_wire(&draft);
        let resp = self
            .client
            .post(&T::ENDPOINT.collection_path(), Some(&body))
            .await?
            .error_for_status(&Self::failure("create"), None)?;
        let created = T::from_wire(resp.json()?);
        tracing::debug!("remote: created {} {}", T::KIND, created.id());
        Ok(created)
    }

    async fn update(&self, id: Id, changes: T::Changes) -> Result<T> {
        let body = T::changes_to_wire(&changes);
        let resp = self
            .client
            .put(&T::ENDPOINT.item_path(id), Some(&body))
            .await?
            .error_for_status(&Self::failure("update"), Some((T::KIND, id)))?;
        Ok(T::from_wire(resp.json()?))
    }

    async fn delete(&self, id: Id) -> Result<()> {
        self.client
            .delete(&T::ENDPOINT.item_path(id))
            .await?
            .error_for_status(&Self::failure("delete"), Some((T::KIND, id)))?;
        tracing::debug!("remote: deleted {} {id}", T::KIND);
        Ok(())
    }
}

impl RemoteRepository<Epic> {
    /// Every epic across the projects `user_id` owns.
    pub async fn list_by_user(&self, user_id: Id) -> Result<Vec<Epic>> {
        let resp = self
            .client
            .get(&format!("/{}/user/{user_id}", Epic::ENDPOINT.collection))
            .await?
            .error_for_status(&Self::failure("load"), None)?;
        let raw: Vec<<Epic as RemoteResource>::Wire> = resp.json()?;
        Ok(raw.into_iter().map(Epic::from_wire).collect())
    }
}

impl<T: Resource> std::fmt::Debug for RemoteRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRepository")
            .field("entity", &T::KIND)
            .field("client", &self.client)
            .finish()
    }
}
