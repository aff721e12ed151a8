//! Caller deadlines.
//!
//! Every ledger and resolver operation runs under an `OpContext`. Store calls
//! are bounded by the context's deadline; the catalog fetch is additionally
//! bounded by its own, shorter budget (see `ProductResolver`).

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// The caller's deadline expired before the operation finished.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("operation cancelled: caller deadline exceeded")]
pub struct Cancelled;

/// Per-operation execution context.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct OpContext {
    deadline: Option<Instant>,
}

impl OpContext {
    /// No deadline; only dropping the future cancels it.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Deadline for a nested step with its own `budget`: whichever of
    /// `now + budget` and the caller's deadline comes first.
    pub fn sub_deadline(&self, budget: Duration) -> Instant {
        let own = Instant::now() + budget;
        match self.deadline {
            Some(outer) => outer.min(own),
            None => own,
        }
    }

    /// Drive `fut` to completion unless the caller's deadline passes first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| Cancelled),
            None => Ok(fut.await),
        }
    }
}
