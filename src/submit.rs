use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, ReviewBackend};
use crate::health::HealthStatus;
use crate::review::{self, ReviewError};
use crate::store::{ReviewStore, StoreError};

/// The two views of the review flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Input,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The review was stored; move to the given view.
    Navigate(View),
    /// A submission was already in flight; nothing was sent.
    Ignored,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please enter or upload code for review.")]
    Validation,

    #[error("The review service is down; try again once it is back.")]
    ServiceUnavailable,

    #[error("Error fetching review: {0}")]
    Request(String),

    #[error("Unexpected review format: {0}")]
    Format(String),

    #[error("Failed to store review: {0}")]
    Store(#[from] StoreError),
}

/// Issues at most one review request at a time and hands a successful result
/// to the store before navigating to the result view.
pub struct SubmissionController {
    backend: Arc<dyn ReviewBackend>,
    store: Arc<ReviewStore>,
    health: watch::Receiver<HealthStatus>,
    busy: AtomicBool,
}

/// Clears the busy flag on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SubmissionController {
    pub fn new(
        backend: Arc<dyn ReviewBackend>,
        store: Arc<ReviewStore>,
        health: watch::Receiver<HealthStatus>,
    ) -> Self {
        Self {
            backend,
            store,
            health,
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Whether a submission would currently be accepted.
    pub fn is_enabled(&self) -> bool {
        !self.is_busy() && *self.health.borrow() != HealthStatus::Down
    }

    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    #[instrument(skip_all, fields(code_bytes = code.len()))]
    pub async fn submit(&self, code: &str) -> Result<SubmitOutcome, SubmitError> {
        if code.trim().is_empty() {
            return Err(SubmitError::Validation);
        }
        if *self.health.borrow() == HealthStatus::Down {
            return Err(SubmitError::ServiceUnavailable);
        }
        let Some(_guard) = self.try_acquire() else {
            debug!("review already in flight; ignoring");
            return Ok(SubmitOutcome::Ignored);
        };

        info!("requesting review");
        let body = self.backend.review(code).await.map_err(|e| {
            warn!(error = %e, "review request failed");
            match e {
                ApiError::Body(reason) => SubmitError::Format(reason),
                other => SubmitError::Request(other.user_message()),
            }
        })?;

        let result = review::normalize(body).map_err(|e| {
            warn!(error = %e, "review response rejected");
            match e {
                ReviewError::Format(reason) => SubmitError::Format(reason),
                other => SubmitError::Format(other.to_string()),
            }
        })?;

        self.store.save(code, &result)?;
        info!(metrics = result.metrics.len(), "review stored");
        Ok(SubmitOutcome::Navigate(View::Result))
    }
}
