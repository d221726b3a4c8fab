//! Core of the docman document store.
//!
//! This crate provides:
//!
//! - **Documents** ([`document`]) - The stored entity, its external representation and request bodies
//! - **Repository abstraction** ([`repository`]) - The existence-gated keyed container the service talks to
//! - **Document service** ([`service`]) - Timestamping, full replace and partial merge
//! - **Wire encodings** ([`codec`]) - JSON, XML, BSON and MessagePack for documents and requests
//! - **Call context** ([`context`]) - Cancellation and deadlines
//! - **Clock** ([`clock`]) - Time source used for stamping
//! - **Cache contract** ([`cache`]) - Read-through caching in front of the service
//! - **Error handling** ([`error`]) - The closed set of error kinds and the result alias
//!
//! # Example
//!
//! ```ignore
//! use docman::{prelude::*, memory::InMemoryRepository};
//!
//! let service = DocumentService::new(InMemoryRepository::new());
//! let ctx = CallContext::new();
//!
//! service.add(&ctx, DocumentDto::new("doc1").with_tags(["draft"])).await?;
//! service.merge(&ctx, UpdateRequest::new("doc1").with_data([("a", "1")])).await?;
//!
//! let doc = service.get(&ctx, "doc1").await?;
//! assert_eq!(doc.data["a"], "1");
//! ```

pub mod cache;
pub mod clock;
pub mod codec;
pub mod context;
pub mod document;
pub mod error;
pub mod repository;
pub mod service;
