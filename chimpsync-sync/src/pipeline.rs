//! Order-sync reconciliation loop shared by the CLI and tests.

use chimpsync_core::{OrderSelector, RegistrationResult, SyncFilter};

use crate::error::SyncError;
use crate::registrar::OrderRegistrar;
use crate::reporter::Reporter;

/// Final line of every completed run, whatever the failure count.
pub const SUCCESS_MESSAGE: &str = "The orders have been synchronized successfully.";

/// Outcome counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn succeeded(&self) -> usize {
        self.created + self.updated + self.skipped
    }

    fn record(&mut self, result: &RegistrationResult) {
        match result {
            RegistrationResult::Created { .. } => self.created += 1,
            RegistrationResult::Updated { .. } => self.updated += 1,
            RegistrationResult::Skipped => self.skipped += 1,
            RegistrationResult::Failed { .. } => self.failed += 1,
        }
    }
}

/// Run the loop: select, then register each candidate in order.
///
/// Returns `Err` only when selection fails, in which case nothing has been
/// reported. Every per-order failure is reported as one error line and the
/// loop carries on.
pub fn run<S, R>(
    selector: &S,
    registrar: &R,
    reporter: &mut dyn Reporter,
    filter: &SyncFilter,
) -> Result<SyncSummary, SyncError>
where
    S: OrderSelector + ?Sized,
    R: OrderRegistrar + ?Sized,
{
    let orders = selector.select(filter)?;

    let mut summary = SyncSummary {
        total: orders.len(),
        ..SyncSummary::default()
    };
    reporter.text(&format!("Connecting {} orders.", orders.len()));
    reporter.progress_start(orders.len());

    for order in &orders {
        match registrar.register(order, filter.create_only) {
            Ok(result) => {
                tracing::debug!(order = %order.id, ?result, "order registered");
                if let RegistrationResult::Failed { reason } = &result {
                    reporter.error(&format!("Order {}: {reason}", order.id));
                }
                summary.record(&result);
            }
            Err(err) => {
                tracing::warn!(order = %order.id, error = %err, "registrar error");
                reporter.error(&format!("Order {}: {err}", order.id));
                summary.failed += 1;
            }
        }
        reporter.progress_advance(1);
    }

    reporter.progress_finish();
    reporter.text(&format!(
        "{} created, {} updated, {} skipped, {} failed.",
        summary.created, summary.updated, summary.skipped, summary.failed
    ));
    reporter.success(SUCCESS_MESSAGE);
    Ok(summary)
}
