//! Storage abstraction for documents.
//!
//! The [`DocumentRepository`] trait is the keyed container the service layer
//! talks to. Every operation is gated on existence: there is no blind overwrite
//! and no upsert, so each failure maps directly onto one error kind.
//!
//! # Examples
//!
//! ```ignore
//! use docman::{prelude::*, memory::InMemoryRepository};
//!
//! let repo = InMemoryRepository::new();
//! let ctx = CallContext::new();
//!
//! repo.add(&ctx, document).await?;
//! let stored = repo.get(&ctx, "doc1").await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{context::CallContext, document::Document, error::DocumentStoreResult};

/// Abstract interface for document repositories.
///
/// # Thread Safety
///
/// Implementations must support concurrent calls from many tasks. Operations
/// against the same `id` must be linearizable, and [`add`](Self::add) must be a
/// single atomic check-and-insert.
///
/// # Async Runtime
///
/// Methods are async so that backends doing real I/O fit behind the same trait.
/// The in-memory backend never suspends.
///
/// # Cancellation
///
/// Every method checks its [`CallContext`] before doing any work and fails with
/// [`DocumentStoreError::Timeout`](crate::error::DocumentStoreError::Timeout)
/// if the call was cancelled or is past its deadline.
#[async_trait]
pub trait DocumentRepository: Send + Sync + Debug {
    /// Returns a copy of the document stored under `id`.
    ///
    /// # Errors
    ///
    /// [`NotFound`](crate::error::DocumentStoreError::NotFound) if no such document exists.
    async fn get(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<Document>;

    /// Inserts a new document.
    ///
    /// # Errors
    ///
    /// [`Conflict`](crate::error::DocumentStoreError::Conflict) if a document with the
    /// same `id` is already stored. When several callers race to add the same `id`,
    /// exactly one succeeds.
    async fn add(&self, ctx: &CallContext, document: Document) -> DocumentStoreResult<()>;

    /// Replaces the document stored under `id`.
    ///
    /// The stored value's `id` is always `id`, whatever the replacement carried.
    ///
    /// # Errors
    ///
    /// [`NotFound`](crate::error::DocumentStoreError::NotFound) if no such document exists.
    async fn update(&self, ctx: &CallContext, id: &str, document: Document) -> DocumentStoreResult<()>;

    /// Removes the document stored under `id`.
    ///
    /// # Errors
    ///
    /// [`NotFound`](crate::error::DocumentStoreError::NotFound) if no such document exists.
    async fn delete(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<()>;

    /// Returns whether a document is stored under `id`.
    async fn contains(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<bool>;

    /// Returns the number of stored documents.
    async fn len(&self, ctx: &CallContext) -> DocumentStoreResult<usize>;
}

#[async_trait]
impl<R> DocumentRepository for &R
where
    R: DocumentRepository + ?Sized,
{
    async fn get(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<Document> {
        (**self).get(ctx, id).await
    }

    async fn add(&self, ctx: &CallContext, document: Document) -> DocumentStoreResult<()> {
        (**self).add(ctx, document).await
    }

    async fn update(&self, ctx: &CallContext, id: &str, document: Document) -> DocumentStoreResult<()> {
        (**self)
            .update(ctx, id, document)
            .await
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<()> {
        (**self).delete(ctx, id).await
    }

    async fn contains(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<bool> {
        (**self).contains(ctx, id).await
    }

    async fn len(&self, ctx: &CallContext) -> DocumentStoreResult<usize> {
        (**self).len(ctx).await
    }
}

#[async_trait]
impl<R> DocumentRepository for Arc<R>
where
    R: DocumentRepository + ?Sized,
{
    async fn get(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<Document> {
        (**self).get(ctx, id).await
    }

    async fn add(&self, ctx: &CallContext, document: Document) -> DocumentStoreResult<()> {
        (**self).add(ctx, document).await
    }

    async fn update(&self, ctx: &CallContext, id: &str, document: Document) -> DocumentStoreResult<()> {
        (**self)
            .update(ctx, id, document)
            .await
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<()> {
        (**self).delete(ctx, id).await
    }

    async fn contains(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<bool> {
        (**self).contains(ctx, id).await
    }

    async fn len(&self, ctx: &CallContext) -> DocumentStoreResult<usize> {
        (**self).len(ctx).await
    }
}

/// Factory for repository instances.
#[async_trait]
pub trait RepositoryBuilder {
    type Repository: DocumentRepository;

    async fn build(self) -> DocumentStoreResult<Self::Repository>;
}
