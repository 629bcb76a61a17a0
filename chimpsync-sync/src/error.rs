//! Error types for chimpsync-sync.

use thiserror::Error;

use chimpsync_core::{OrderId, StoreError};

/// Errors that abort a sync run. Only selection can fail the whole batch.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Candidate selection failed (bad filter, unreadable store).
    #[error("order selection failed: {0}")]
    Select(#[from] StoreError),
}

/// Errors a registrar raises for a single order instead of folding them into
/// a `Failed` result. The loop reports these and moves on.
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The order cannot be expressed as a remote record.
    #[error("order {order_id} cannot be registered: {reason}")]
    InvalidOrder { order_id: OrderId, reason: String },

    /// Any other registrar-specific failure.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
