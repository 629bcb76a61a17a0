//! # chimpsync-sync
//!
//! The order-sync reconciliation loop.
//!
//! Call [`pipeline::run`] with an [`OrderSelector`](chimpsync_core::OrderSelector),
//! an [`OrderRegistrar`] and a [`Reporter`]. Per-order failures are reported
//! and contained; only a selection failure aborts the run.

pub mod error;
pub mod pipeline;
pub mod registrar;
pub mod reporter;

pub use error::{RegistrarError, SyncError};
pub use pipeline::{run, SyncSummary, SUCCESS_MESSAGE};
pub use registrar::OrderRegistrar;
pub use reporter::Reporter;
