//! Main docman crate: a concurrent in-memory document store with multi-format
//! wire encodings.
//!
//! This crate is the entry point for users of the docman workspace. It
//! re-exports the core types and the in-memory backend, and provides tracing
//! setup for processes that host the store.
//!
//! # Features
//!
//! - **Existence-gated CRUD** - `add` never overwrites, `update` and `delete` never create
//! - **Partial updates** - Merge requests replace only the fields they carry
//! - **Per-key concurrency** - Atomic adds; different ids never contend
//! - **Wire encodings** - JSON, XML, BSON and MessagePack for the same document
//!
//! # Quick Start
//!
//! ```ignore
//! use docman::{prelude::*, memory::InMemoryRepository};
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let service = DocumentService::new(InMemoryRepository::new());
//!     let ctx = CallContext::with_timeout(std::time::Duration::from_secs(1));
//!
//!     service.add(&ctx, DocumentDto::new("doc1").with_data([("title", "Report")])).await?;
//!
//!     service
//!         .merge(&ctx, UpdateRequest::new("doc1").with_tags(["final"]))
//!         .await?;
//!
//!     let doc = service.get(&ctx, "doc1").await?;
//!     let xml = doc.encode(WireFormat::Xml)?;
//!     println!("{}", String::from_utf8_lossy(&xml));
//!
//!     service.delete(&ctx, "doc1").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Caching
//!
//! A transport layer that keeps a response cache can wrap the service in a
//! [`ReadThrough`](cache::ReadThrough): reads consult the cache first, and
//! successful mutations made through the wrapper invalidate the affected id.
//!
//! ```ignore
//! use docman::{prelude::*, cache::ReadThrough, memory::{InMemoryDocumentCache, InMemoryRepository}};
//!
//! let service = DocumentService::new(InMemoryRepository::new());
//! let cache = InMemoryDocumentCache::new();
//! let documents = ReadThrough::new(&service, &cache);
//!
//! let doc = documents.get(&CallContext::new(), "doc1").await?;
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory repository and cache

pub mod prelude;
pub mod telemetry;

pub use docman_core::{cache, clock, codec, context, document, error, repository, service};

// Re-export BSON for callers building BSON payloads by hand
pub use bson;

/// In-memory backend implementations.
pub mod memory {
    pub use docman_memory::{InMemoryDocumentCache, InMemoryRepository, InMemoryRepositoryBuilder};
}
