use super::{ClaimedJob, IJobQueue, QueueError, SubmitOutcome};
use crate::repos::lock;
use chrono::{DateTime, Duration, Utc};
use kopilka_domain::{DedupKey, NotificationJob};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum JobState {
    Pending { available_at: DateTime<Utc> },
    Claimed { lease_until: DateTime<Utc> },
    Completed { at: DateTime<Utc> },
}

#[derive(Debug, Clone)]
struct StoredJob {
    job: NotificationJob,
    attempts: i32,
    state: JobState,
}

/// Job queue living in process memory, used when no database is configured
pub struct InMemoryJobQueue {
    jobs: Mutex<Vec<StoredJob>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }

    /// Every job currently stored, in submission order
    pub fn jobs(&self) -> Vec<NotificationJob> {
        lock(&self.jobs).iter().map(|j| j.job.clone()).collect()
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IJobQueue for InMemoryJobQueue {
    async fn submit(&self, job: &NotificationJob) -> Result<SubmitOutcome, QueueError> {
        let mut jobs = lock(&self.jobs);
        if jobs.iter().any(|j| j.job.dedup_key == job.dedup_key) {
            return Ok(SubmitOutcome::Duplicate);
        }
        jobs.push(StoredJob {
            job: job.clone(),
            attempts: 0,
            state: JobState::Pending {
                available_at: job.run_at,
            },
        });
        Ok(SubmitOutcome::Enqueued)
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
        lease: Duration,
    ) -> Result<Vec<ClaimedJob>, QueueError> {
        let mut jobs = lock(&self.jobs);
        let mut claimed = Vec::new();
        for stored in jobs.iter_mut() {
            if claimed.len() >= limit {
                break;
            }
            let is_due = match stored.state {
                JobState::Pending { available_at } => available_at <= now,
                JobState::Claimed { lease_until } => lease_until <= now,
                JobState::Completed { .. } => false,
            };
            if !is_due {
                continue;
            }
            stored.attempts += 1;
            stored.state = JobState::Claimed {
                lease_until: now + lease,
            };
            claimed.push(ClaimedJob {
                job: stored.job.clone(),
                attempts: stored.attempts,
            });
        }
        Ok(claimed)
    }

    async fn complete(&self, key: &DedupKey, now: DateTime<Utc>) -> Result<(), QueueError> {
        let mut jobs = lock(&self.jobs);
        if let Some(stored) = jobs.iter_mut().find(|j| j.job.dedup_key == *key) {
            stored.state = JobState::Completed { at: now };
        }
        Ok(())
    }

    async fn release(&self, key: &DedupKey, retry_at: DateTime<Utc>) -> Result<(), QueueError> {
        let mut jobs = lock(&self.jobs);
        if let Some(stored) = jobs.iter_mut().find(|j| j.job.dedup_key == *key) {
            if !matches!(stored.state, JobState::Completed { .. }) {
                stored.state = JobState::Pending {
                    available_at: retry_at,
                };
            }
        }
        Ok(())
    }

    async fn purge_completed_before(&self, before: DateTime<Utc>) -> Result<u64, QueueError> {
        let mut jobs = lock(&self.jobs);
        let count_before = jobs.len();
        jobs.retain(|j| !matches!(j.state, JobState::Completed { at } if at < before));
        Ok((count_before - jobs.len()) as u64)
    }
}
