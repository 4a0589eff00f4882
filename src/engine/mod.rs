//! Reconciliation engine
//!
//! Provides:
//! - Recount-or-reuse decisions per repository
//! - Change summary (new, deleted, changed repositories)
//! - Aggregate line totals over the refreshed cache

mod reconcile;
mod summary;

pub use reconcile::{ReconcileOptions, ReconcileOutcome, Reconciler};
pub use summary::{ChangeSummary, ChangedRepo, LineTotals};
