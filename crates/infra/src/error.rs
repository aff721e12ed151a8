use thiserror::Error;

use pantry_core::DomainError;

use crate::context::Cancelled;
use crate::store::StoreError;

/// Failure of the thin services around the ledger (alerts, settings).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
