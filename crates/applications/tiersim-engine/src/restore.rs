//! Delayed restore notifications for cold-tier retrievals
//!
//! Retrieving from Glacier or Deep Archive does not complete immediately. Each
//! such retrieval schedules a notice that fires after the tier's restore
//! delay. Notices are delivered through a channel and can be cancelled
//! individually or all at once (on reset).
//!
//! A cancelled notice is never delivered, even if its timer already fired
//! and the notice is sitting in the channel.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use tiersim_core::{FileId, RetrievalLatency, Retrieval};

/// Identifier of a scheduled restore
pub type JobId = u64;

/// A completed restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreNotice {
    pub job: JobId,
    pub file_id: FileId,
    pub name: String,
    pub latency: RetrievalLatency,
}

impl RestoreNotice {
    pub fn message(&self) -> String {
        format!("{} retrieval completed after {}", self.name, self.latency)
    }
}

/// Schedules and tracks pending restore notices.
///
/// Must be used from within a tokio runtime.
pub struct RestoreNotifier {
    tx: mpsc::UnboundedSender<RestoreNotice>,
    rx: mpsc::UnboundedReceiver<RestoreNotice>,
    jobs: HashMap<JobId, JoinHandle<()>>,
    next_job: JobId,
}

impl RestoreNotifier {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            jobs: HashMap::new(),
            next_job: 1,
        }
    }

    /// Schedule the completion notice for a retrieval.
    ///
    /// Returns `None` for tiers that restore instantly.
    pub fn schedule(&mut self, retrieval: &Retrieval) -> Option<JobId> {
        let delay = retrieval.latency.restore_delay()?;
        Some(self.schedule_after(retrieval.file_id, &retrieval.name, retrieval.latency, delay))
    }

    /// Schedule a notice after an explicit delay
    pub fn schedule_after(
        &mut self,
        file_id: FileId,
        name: &str,
        latency: RetrievalLatency,
        delay: Duration,
    ) -> JobId {
        let job = self.next_job;
        self.next_job += 1;

        let notice = RestoreNotice {
            job,
            file_id,
            name: name.to_string(),
            latency,
        };
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // receiver only goes away with the notifier itself
            let _ = tx.send(notice);
        });

        debug!(job, file_id, delay_ms = delay.as_millis() as u64, "Scheduled restore notice");
        self.jobs.insert(job, handle);
        job
    }

    /// Cancel one pending notice. Returns false if it was unknown or already delivered.
    pub fn cancel(&mut self, job: JobId) -> bool {
        match self.jobs.remove(&job) {
            Some(handle) => {
                handle.abort();
                debug!(job, "Cancelled restore notice");
                true
            }
            None => false,
        }
    }

    /// Cancel every pending notice, returning how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let count = self.jobs.len();
        for (_, handle) in self.jobs.drain() {
            handle.abort();
        }
        if count > 0 {
            debug!(count, "Cancelled all restore notices");
        }
        count
    }

    /// Notices scheduled but not yet delivered
    pub fn pending(&self) -> usize {
        self.jobs.len()
    }

    /// Wait for the next live notice. Returns `None` once nothing is pending.
    pub async fn next(&mut self) -> Option<RestoreNotice> {
        while !self.jobs.is_empty() {
            let notice = self.rx.recv().await?;
            if self.jobs.remove(&notice.job).is_some() {
                return Some(notice);
            }
        }
        None
    }

    /// Take a notice that has already fired, without waiting
    pub fn try_next(&mut self) -> Option<RestoreNotice> {
        while let Ok(notice) = self.rx.try_recv() {
            if self.jobs.remove(&notice.job).is_some() {
                return Some(notice);
            }
        }
        None
    }
}

impl Default for RestoreNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RestoreNotifier {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
