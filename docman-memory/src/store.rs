//! In-memory repository implementation.
//!
//! Documents live in a sharded concurrent map keyed by id. Each operation
//! touches exactly one shard, so operations on different keys never wait on
//! each other, and operations on the same key are serialized by that shard's
//! lock.

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::Arc;
use tracing::trace;

use docman_core::{
    context::CallContext,
    document::Document,
    error::{DocumentStoreError, DocumentStoreResult},
    repository::{DocumentRepository, RepositoryBuilder},
};

type DocumentMap = DashMap<String, Document>;

/// Thread-safe in-memory document repository.
///
/// # Thread Safety
///
/// `InMemoryRepository` is cloneable and keeps its map behind an `Arc`, so
/// clones share the same documents and can be moved into separate tasks.
///
/// # Example
///
/// ```ignore
/// use docman_memory::InMemoryRepository;
/// use docman::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let repo = InMemoryRepository::new();
///     let ctx = CallContext::new();
///
///     repo.add(&ctx, Document::new("doc1", DataMap::new(), TagSet::new(), chrono::Utc::now())).await?;
///     assert!(repo.contains(&ctx, "doc1").await?);
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryRepository {
    documents: Arc<DocumentMap>,
}

impl InMemoryRepository {
    /// Creates an empty repository with default sizing.
    pub fn new() -> Self {
        Self {
            documents: Arc::new(DocumentMap::new()),
        }
    }

    /// Creates a builder for a repository with custom sizing.
    ///
    /// ```ignore
    /// let repo = InMemoryRepository::builder()
    ///     .capacity(10_000)
    ///     .shard_amount(64)
    ///     .build()
    ///     .await?;
    /// ```
    pub fn builder() -> InMemoryRepositoryBuilder {
        InMemoryRepositoryBuilder::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn get(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<Document> {
        ctx.check()?;

        self.documents
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DocumentStoreError::NotFound(id.to_string()))
    }

    async fn add(&self, ctx: &CallContext, document: Document) -> DocumentStoreResult<()> {
        ctx.check()?;

        // Check and insert under one shard lock.
        match self.documents.entry(document.id.clone()) {
            Entry::Occupied(entry) => {
                trace!(id = %entry.key(), "Rejected duplicate add");
                Err(DocumentStoreError::Conflict(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                entry.insert(document);
                Ok(())
            }
        }
    }

    async fn update(&self, ctx: &CallContext, id: &str, mut document: Document) -> DocumentStoreResult<()> {
        ctx.check()?;

        match self.documents.get_mut(id) {
            Some(mut entry) => {
                document.id = entry.key().clone();
                *entry.value_mut() = document;
                Ok(())
            }
            None => Err(DocumentStoreError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<()> {
        ctx.check()?;

        match self.documents.remove(id) {
            Some(_) => Ok(()),
            None => Err(DocumentStoreError::NotFound(id.to_string())),
        }
    }

    async fn contains(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<bool> {
        ctx.check()?;

        Ok(self.documents.contains_key(id))
    }

    async fn len(&self, ctx: &CallContext) -> DocumentStoreResult<usize> {
        ctx.check()?;

        Ok(self.documents.len())
    }
}

/// Builder for [`InMemoryRepository`] instances.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepositoryBuilder {
    capacity: Option<usize>,
    shard_amount: Option<usize>,
}

impl InMemoryRepositoryBuilder {
    /// Number of documents to reserve room for up front.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Number of shards. Must be a power of two greater than one.
    pub fn shard_amount(mut self, shard_amount: usize) -> Self {
        self.shard_amount = Some(shard_amount);
        self
    }
}

#[async_trait]
impl RepositoryBuilder for InMemoryRepositoryBuilder {
    type Repository = InMemoryRepository;

    /// Builds a fresh, empty repository.
    ///
    /// # Errors
    ///
    /// Fails if the shard amount is not a power of two greater than one.
    async fn build(self) -> DocumentStoreResult<Self::Repository> {
        let capacity = self.capacity.unwrap_or(0);

        let documents = match self.shard_amount {
            Some(shards) if shards < 2 || !shards.is_power_of_two() => {
                return Err(DocumentStoreError::Unexpected(format!(
                    "shard amount must be a power of two greater than one, got {shards}"
                )));
            }
            Some(shards) => DocumentMap::with_capacity_and_shard_amount(capacity, shards),
            None => DocumentMap::with_capacity(capacity),
        };

        Ok(InMemoryRepository {
            documents: Arc::new(documents),
        })
    }
}
