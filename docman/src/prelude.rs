//! Convenient re-exports of commonly used types from docman.
//!
//! ```ignore
//! use docman::prelude::*;
//! ```
//!
//! This provides access to:
//! - Documents, DTOs and request bodies
//! - The repository trait and its builder
//! - The document service and its builder
//! - Wire formats and the cache contract
//! - Call contexts, clocks and error types

pub use docman_core::{
    cache::{DocumentCache, ReadThrough},
    clock::{Clock, ManualClock, SystemClock},
    codec::{WireFormat, WireMessage},
    context::{CallContext, CancelHandle},
    document::{CreateDocumentRequest, DataMap, Document, DocumentDto, KeyValueEntry, TagSet, UpdateRequest},
    error::{DocumentStoreError, DocumentStoreResult, ErrorKind},
    repository::{DocumentRepository, RepositoryBuilder},
    service::{DocumentService, DocumentServiceBuilder},
};
