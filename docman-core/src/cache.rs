//! Response cache contract and a read-through wrapper around the service.
//!
//! The cache is keyed by document id. It is consulted before `get` and
//! invalidated after every successful mutation made through [`ReadThrough`].
//! Mutations made around the wrapper (directly on the service or the
//! repository) are not seen, so cached entries may go stale; callers that need
//! fresh reads go through the service.

use async_trait::async_trait;
use std::fmt::Debug;
use tracing::debug;

use crate::{
    clock::Clock,
    context::CallContext,
    document::{CreateDocumentRequest, DocumentDto, UpdateRequest},
    error::DocumentStoreResult,
    repository::DocumentRepository,
    service::DocumentService,
};

/// A cache of encoded-ready documents keyed by id.
#[async_trait]
pub trait DocumentCache: Send + Sync + Debug {
    async fn get(&self, id: &str) -> Option<DocumentDto>;

    async fn set(&self, document: DocumentDto);

    async fn invalidate(&self, id: &str);
}

/// Composes a [`DocumentService`] with a [`DocumentCache`].
#[derive(Debug)]
pub struct ReadThrough<'a, R, C, K> {
    service: &'a DocumentService<R, C>,
    cache: &'a K,
}

impl<'a, R, C, K> ReadThrough<'a, R, C, K>
where
    R: DocumentRepository,
    C: Clock,
    K: DocumentCache,
{
    pub fn new(service: &'a DocumentService<R, C>, cache: &'a K) -> Self {
        Self { service, cache }
    }

    /// Returns the cached document, or fetches it and populates the cache.
    pub async fn get(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<DocumentDto> {
        if let Some(hit) = self.cache.get(id).await {
            debug!(id = %id, "Cache hit");
            return Ok(hit);
        }

        let document = self.service.get(ctx, id).await?;
        self.cache.set(document.clone()).await;

        Ok(document)
    }

    pub async fn add(&self, ctx: &CallContext, dto: DocumentDto) -> DocumentStoreResult<()> {
        let id = dto.id.clone();
        self.service.add(ctx, dto).await?;
        self.cache.invalidate(&id).await;

        Ok(())
    }

    pub async fn create(&self, ctx: &CallContext, request: CreateDocumentRequest) -> DocumentStoreResult<()> {
        self.add(ctx, request.into()).await
    }

    pub async fn replace(&self, ctx: &CallContext, id: &str, dto: DocumentDto) -> DocumentStoreResult<()> {
        self.service.replace(ctx, id, dto).await?;
        self.cache.invalidate(id).await;

        Ok(())
    }

    pub async fn merge(&self, ctx: &CallContext, request: UpdateRequest) -> DocumentStoreResult<()> {
        let id = request.id.clone();
        self.service.merge(ctx, request).await?;
        self.cache.invalidate(&id).await;

        Ok(())
    }

    pub async fn delete(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<()> {
        self.service.delete(ctx, id).await?;
        self.cache.invalidate(id).await;

        Ok(())
    }
}
