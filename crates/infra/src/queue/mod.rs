mod inmemory;
mod postgres;

use chrono::{DateTime, Duration, Utc};
pub use inmemory::InMemoryJobQueue;
use kopilka_domain::{DedupKey, NotificationJob};
pub use postgres::PostgresJobQueue;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Enqueued,
    /// A job with the same dedup key was submitted before, nothing was added
    Duplicate,
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Job queue is unavailable: {0}")]
    Unavailable(String),
    #[error("Job queue did not answer in time")]
    Timeout,
}

impl From<sqlx::Error> for QueueError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// A job handed to a consumer until its lease runs out
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimedJob {
    pub job: NotificationJob,
    /// Delivery attempts including the current one
    pub attempts: i32,
}

/// Durable store of deferred reminder messages.
///
/// Delivery is at least once: a claimed job that is neither completed nor
/// released becomes claimable again when its lease expires. The dedup key is
/// the identity of a job, submitting a key twice never creates a second job.
#[async_trait::async_trait]
pub trait IJobQueue: Send + Sync {
    async fn submit(&self, job: &NotificationJob) -> Result<SubmitOutcome, QueueError>;
    /// Claims up to `limit` jobs whose `run_at` has passed
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
        lease: Duration,
    ) -> Result<Vec<ClaimedJob>, QueueError>;
    async fn complete(&self, key: &DedupKey, now: DateTime<Utc>) -> Result<(), QueueError>;
    /// Gives a claimed job back so it can be claimed again at `retry_at`
    async fn release(&self, key: &DedupKey, retry_at: DateTime<Utc>) -> Result<(), QueueError>;
    /// Removes jobs completed before `before`. Returns how many were removed.
    async fn purge_completed_before(&self, before: DateTime<Utc>) -> Result<u64, QueueError>;
}

/// Runs a queue call with a deadline, an elapsed deadline is a `QueueError::Timeout`
pub async fn with_timeout<T, F>(timeout: std::time::Duration, call: F) -> Result<T, QueueError>
where
    F: Future<Output = Result<T, QueueError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(res) => res,
        Err(_) => Err(QueueError::Timeout),
    }
}
