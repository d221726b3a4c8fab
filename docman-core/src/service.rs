//! Document service: timestamping, full replace and partial merge on top of a
//! [`DocumentRepository`].
//!
//! Errors raised by the repository are passed through unchanged. The service
//! logs each operation the way a transport layer would want to see it:
//! successes at `info`, missing or duplicate documents at `warn`, and
//! timeouts or unexpected failures at `error`.

use std::time::Duration;
use tracing::{error, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    context::CallContext,
    document::{CreateDocumentRequest, Document, DocumentDto, UpdateRequest},
    error::{DocumentStoreError, DocumentStoreResult},
    repository::DocumentRepository,
};

/// Orchestrates document operations on top of a repository.
///
/// Construct one per repository and hand it to whatever composes the transport
/// layer; it holds no global state.
///
/// # Consistency
///
/// [`merge`](Self::merge) is a read-modify-write built from a repository `get`
/// followed by an `update`. Another writer may slip in between: its change is
/// then overwritten (last write wins), or, if it deleted the document, the
/// merge fails with `NotFound`.
#[derive(Debug)]
pub struct DocumentService<R, C = SystemClock> {
    repository: R,
    clock: C,
    default_timeout: Option<Duration>,
}

impl<R: DocumentRepository> DocumentService<R, SystemClock> {
    /// Creates a service over `repository` using the system clock and no default timeout.
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            clock: SystemClock,
            default_timeout: None,
        }
    }

    pub fn builder(repository: R) -> DocumentServiceBuilder<R, SystemClock> {
        DocumentServiceBuilder {
            repository,
            clock: SystemClock,
            default_timeout: None,
        }
    }
}

impl<R: DocumentRepository, C: Clock> DocumentService<R, C> {
    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn scoped(&self, ctx: &CallContext) -> CallContext {
        match self.default_timeout {
            Some(timeout) => ctx.or_timeout(timeout),
            None => ctx.clone(),
        }
    }

    /// Fetches a document.
    #[tracing::instrument(name = "document.get", skip(self, ctx))]
    pub async fn get(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<DocumentDto> {
        let ctx = self.scoped(ctx);
        ctx.check().inspect_err(|err| log_failure(id, err))?;

        self.repository
            .get(&ctx, id)
            .await
            .map(DocumentDto::from)
            .inspect_err(|err| log_failure(id, err))
    }

    /// Adds a new document, stamping `created` and `last_updated` with the
    /// current time. Timestamps carried by `dto` are ignored.
    #[tracing::instrument(name = "document.add", skip_all, fields(id = %dto.id))]
    pub async fn add(&self, ctx: &CallContext, dto: DocumentDto) -> DocumentStoreResult<()> {
        let ctx = self.scoped(ctx);
        let id = dto.id.clone();
        ctx.check().inspect_err(|err| log_failure(&id, err))?;

        let now = self.clock.now();
        let mut document = Document::from_dto(dto, now);
        document.created = now;
        document.last_updated = Some(now);

        self.repository
            .add(&ctx, document)
            .await
            .inspect(|_| info!(id = %id, "Document added"))
            .inspect_err(|err| log_failure(&id, err))
    }

    /// Adds a new document from a create request body.
    pub async fn create(&self, ctx: &CallContext, request: CreateDocumentRequest) -> DocumentStoreResult<()> {
        self.add(ctx, request.into()).await
    }

    /// Replaces the document stored under `id` with `dto`.
    ///
    /// This is a full replace: data and tags come from `dto` as given. The
    /// creation time is taken from `dto`, or the current time if it carries
    /// none, and `last_updated` is stamped with the current time.
    #[tracing::instrument(name = "document.replace", skip(self, ctx, dto))]
    pub async fn replace(&self, ctx: &CallContext, id: &str, dto: DocumentDto) -> DocumentStoreResult<()> {
        let ctx = self.scoped(ctx);
        ctx.check().inspect_err(|err| log_failure(id, err))?;

        let now = self.clock.now();
        let mut document = Document::from_dto(dto, now);
        document.last_updated = None;
        document.touch(now);

        self.repository
            .update(&ctx, id, document)
            .await
            .inspect(|_| info!(id = %id, "Document replaced"))
            .inspect_err(|err| log_failure(id, err))
    }

    /// Applies a partial update.
    ///
    /// Each field present in `request` replaces the stored field wholesale;
    /// absent fields are left alone. `last_updated` always advances, even when
    /// the request carries no fields.
    #[tracing::instrument(name = "document.merge", skip_all, fields(id = %request.id))]
    pub async fn merge(&self, ctx: &CallContext, request: UpdateRequest) -> DocumentStoreResult<()> {
        let ctx = self.scoped(ctx);
        let id = request.id.clone();
        ctx.check().inspect_err(|err| log_failure(&id, err))?;

        let mut document = self
            .repository
            .get(&ctx, &id)
            .await
            .inspect_err(|err| log_failure(&id, err))?;

        document.touch(self.clock.now());
        request.apply_to(&mut document);

        self.repository
            .update(&ctx, &id, document)
            .await
            .inspect(|_| info!(id = %id, "Document merged"))
            .inspect_err(|err| log_failure(&id, err))
    }

    /// Deletes a document.
    #[tracing::instrument(name = "document.delete", skip(self, ctx))]
    pub async fn delete(&self, ctx: &CallContext, id: &str) -> DocumentStoreResult<()> {
        let ctx = self.scoped(ctx);
        ctx.check().inspect_err(|err| log_failure(id, err))?;

        self.repository
            .delete(&ctx, id)
            .await
            .inspect(|_| info!(id = %id, "Document deleted"))
            .inspect_err(|err| log_failure(id, err))
    }
}

fn log_failure(id: &str, err: &DocumentStoreError) {
    match err {
        DocumentStoreError::NotFound(_) => warn!(id = %id, "Document not found"),
        DocumentStoreError::Conflict(_) => warn!(id = %id, "Document already exists"),
        DocumentStoreError::Timeout(reason) => error!(id = %id, reason = %reason, "Document operation timed out"),
        DocumentStoreError::Unexpected(detail) => error!(id = %id, error = %detail, "Document operation failed"),
    }
}

/// Builder for [`DocumentService`].
///
/// ```ignore
/// let service = DocumentService::builder(InMemoryRepository::new())
///     .clock(ManualClock::new(Utc::now()))
///     .default_timeout(Duration::from_secs(5))
///     .build();
/// ```
#[derive(Debug)]
pub struct DocumentServiceBuilder<R, C> {
    repository: R,
    clock: C,
    default_timeout: Option<Duration>,
}

impl<R: DocumentRepository, C: Clock> DocumentServiceBuilder<R, C> {
    /// Swaps the time source used for stamping.
    pub fn clock<C2: Clock>(self, clock: C2) -> DocumentServiceBuilder<R, C2> {
        DocumentServiceBuilder {
            repository: self.repository,
            clock,
            default_timeout: self.default_timeout,
        }
    }

    /// Deadline applied to calls whose context carries none.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> DocumentService<R, C> {
        DocumentService {
            repository: self.repository,
            clock: self.clock,
            default_timeout: self.default_timeout,
        }
    }
}
