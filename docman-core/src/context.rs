//! Per-call cancellation and deadline signal.
//!
//! Every repository and service operation takes a [`CallContext`]. Operations
//! call [`CallContext::check`] before starting a unit of work; since the
//! in-memory operations are atomic there is nothing to roll back afterwards.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// A shared flag that cancels every [`CallContext`] holding it.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Cancellation and deadline carried by a single call.
///
/// Cloning is cheap; clones share the cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancelHandle,
}

impl CallContext {
    /// A context that never expires and is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context expiring `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancelHandle::default(),
        }
    }

    /// Binds this context to an externally owned cancellation flag.
    pub fn cancelled_by(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a context with a deadline `timeout` from now, unless this one
    /// already has a deadline.
    pub fn or_timeout(&self, timeout: Duration) -> Self {
        match self.deadline {
            Some(_) => self.clone(),
            None => Self {
                deadline: Some(Instant::now() + timeout),
                cancel: self.cancel.clone(),
            },
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fails with [`DocumentStoreError::Timeout`] if the call was cancelled or
    /// its deadline has passed.
    pub fn check(&self) -> DocumentStoreResult<()> {
        if self.is_cancelled() {
            return Err(DocumentStoreError::Timeout("operation cancelled".to_string()));
        }

        if self.is_expired() {
            return Err(DocumentStoreError::Timeout("deadline exceeded".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_passes() {
        assert!(CallContext::new().check().is_ok());
        assert!(CallContext::with_timeout(Duration::from_secs(60)).check().is_ok());
    }

    #[test]
    fn past_deadline_times_out() {
        let ctx = CallContext::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(ctx.check().unwrap_err().is_timeout());
    }

    #[test]
    fn cancellation_reaches_clones() {
        let ctx = CallContext::new();
        let clone = ctx.clone();

        ctx.cancel_handle().cancel();

        assert!(clone.check().unwrap_err().is_timeout());
    }

    #[test]
    fn or_timeout_keeps_existing_deadline() {
        let deadline = Instant::now() + Duration::from_secs(3600);
        let ctx = CallContext::with_deadline(deadline).or_timeout(Duration::from_millis(1));
        assert_eq!(ctx.deadline(), Some(deadline));

        assert!(CallContext::new().or_timeout(Duration::from_secs(1)).deadline().is_some());
    }
}
