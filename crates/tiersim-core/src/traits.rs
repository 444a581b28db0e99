//! Core traits for tiersim
//!
//! The Presenter trait is the presentation port: the session driver reports
//! everything through it and never writes to a terminal directly. The
//! simulator itself does not know it exists.

use crate::policy::LifecyclePolicy;
use crate::pricing::{CostEstimate, PriceTable};
use crate::types::Snapshot;

/// Output sink for a simulation session
pub trait Presenter {
    /// Informational log line (uploads, transitions, retrievals)
    fn notice(&mut self, message: &str);

    /// A refused action; nothing was mutated
    fn alert(&mut self, message: &str);

    /// Current file list, tier counts and timeline
    fn snapshot(&mut self, snapshot: &Snapshot);

    /// Result of a cost comparison
    fn estimate(&mut self, estimate: &CostEstimate);

    /// Price tables in use
    fn prices(&mut self, prices: &PriceTable);

    /// Lifecycle policy in use
    fn policy(&mut self, policy: &LifecyclePolicy);
}
