//! Tracked background work: notices and the delayed mock-payment confirmation.
//!
//! Jobs are best-effort and at-most-once. A job runs a single time, is never
//! retried, and anything still outstanding when the ledger closes is aborted
//! rather than awaited. Every job that finishes leaves a `JobReport`; only the
//! most recent `MAX_RETAINED_REPORTS` are kept.

use crate::error::{ErrorCode, Result};
use crate::states::UserId;
use log::{debug, warn};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// Reports kept by `DeferredJobs::new`; older ones are dropped first.
pub const MAX_RETAINED_REPORTS: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    PaymentNotice,
    PaymentConfirmation,
    TaskNotice,
}

#[derive(Clone, Debug, PartialEq)]
pub enum JobOutcome {
    Completed,
    Failed(ErrorCode),
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobReport {
    pub kind: JobKind,
    pub user_id: UserId,
    pub outcome: JobOutcome,
}

#[derive(Debug)]
pub struct DeferredJobs {
    handles: Mutex<Vec<JoinHandle<()>>>,
    reports: Arc<Mutex<VecDeque<JobReport>>>,
    report_limit: usize,
}

impl Default for DeferredJobs {
    fn default() -> Self {
        Self::with_report_limit(MAX_RETAINED_REPORTS)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DeferredJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report_limit(report_limit: usize) -> Self {
        Self {
            handles: Mutex::new(Vec::new()),
            reports: Arc::new(Mutex::new(VecDeque::with_capacity(report_limit))),
            report_limit,
        }
    }

    /// Spawns `job` on the current tokio runtime and records how it ends.
    pub fn spawn<F>(&self, kind: JobKind, user_id: UserId, job: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let reports = Arc::clone(&self.reports);
        let limit = self.report_limit;
        let handle = tokio::spawn(async move {
            let outcome = match job.await {
                Ok(()) => {
                    debug!("{:?} job for user {} completed", kind, user_id);
                    JobOutcome::Completed
                }
                Err(err) => {
                    warn!("{:?} job for user {} failed: {}", kind, user_id, err);
                    JobOutcome::Failed(err)
                }
            };
            if limit == 0 {
                return;
            }
            let mut reports = lock(&reports);
            while reports.len() >= limit {
                reports.pop_front();
            }
            reports.push_back(JobReport {
                kind,
                user_id,
                outcome,
            });
        });

        let mut handles = lock(&self.handles);
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of jobs spawned and not yet finished.
    pub fn pending(&self) -> usize {
        lock(&self.handles).iter().filter(|h| !h.is_finished()).count()
    }

    /// Waits until every spawned job, including ones spawned while waiting, is done.
    pub async fn wait_idle(&self) {
        loop {
            let drained: Vec<JoinHandle<()>> = lock(&self.handles).drain(..).collect();
            if drained.is_empty() {
                break;
            }
            for handle in drained {
                let _ = handle.await;
            }
        }
    }

    /// Aborts outstanding jobs. Returns how many were still running.
    pub fn abort_all(&self) -> usize {
        let drained: Vec<JoinHandle<()>> = lock(&self.handles).drain(..).collect();
        let mut aborted = 0;
        for handle in drained {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }

    /// Most recent reports, oldest first.
    pub fn reports(&self) -> Vec<JobReport> {
        lock(&self.reports).iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_keep_only_the_newest() {
        let jobs = DeferredJobs::with_report_limit(3);
        for i in 0..10u64 {
            jobs.spawn(JobKind::TaskNotice, UserId::from(i), async { Ok(()) });
            jobs.wait_idle().await;
        }
        let users: Vec<String> = jobs
            .reports()
            .iter()
            .map(|r| r.user_id.to_string())
            .collect();
        assert_eq!(users, vec!["7", "8", "9"]);
    }

    #[tokio::test]
    async fn test_zero_limit_keeps_no_reports() {
        let jobs = DeferredJobs::with_report_limit(0);
        jobs.spawn(JobKind::PaymentNotice, UserId::from("u1"), async {
            Err(ErrorCode::NotificationDeliveryFailed("offline".to_string()))
        });
        jobs.wait_idle().await;
        assert!(jobs.reports().is_empty());
        assert_eq!(jobs.pending(), 0);
    }
}
