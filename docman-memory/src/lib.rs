//! In-memory document repository for docman.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `DocumentRepository` trait, and an in-memory `DocumentCache`.
//!
//! # Features
//!
//! - **Per-key locking** - A sharded concurrent map; different ids never contend
//! - **Atomic add** - Duplicate detection and insertion happen under one lock
//! - **Owned results** - Callers always receive clones, never a handle into the map
//!
//! # Quick Start
//!
//! ```ignore
//! use docman::{prelude::*, memory::InMemoryRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = InMemoryRepository::builder().build().await?;
//!     let service = DocumentService::new(repo);
//!     let ctx = CallContext::new();
//!
//!     service.add(&ctx, DocumentDto::new("doc1")).await?;
//!     let doc = service.get(&ctx, "doc1").await?;
//!     assert_eq!(doc.created, doc.last_updated);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod store;

pub use cache::InMemoryDocumentCache;
pub use store::{InMemoryRepository, InMemoryRepositoryBuilder};
