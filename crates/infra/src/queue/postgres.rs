use super::{ClaimedJob, IJobQueue, QueueError, SubmitOutcome};
use chrono::{DateTime, Duration, Utc};
use kopilka_domain::{DedupKey, NotificationJob};
use sqlx::{FromRow, PgPool};
use tracing::error;

/// Job queue backed by the `notification_jobs` table
pub struct PostgresJobQueue {
    pool: PgPool,
}

impl PostgresJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationJobRaw {
    dedup_key: String,
    chat_id: i64,
    text: String,
    run_at: DateTime<Utc>,
    attempts: i32,
}

impl NotificationJobRaw {
    fn into_claimed(self) -> Option<ClaimedJob> {
        match self.dedup_key.parse::<DedupKey>() {
            Ok(dedup_key) => Some(ClaimedJob {
                job: NotificationJob {
                    dedup_key,
                    chat_id: self.chat_id,
                    text: self.text,
                    run_at: self.run_at,
                },
                attempts: self.attempts,
            }),
            Err(e) => {
                error!("Ignoring notification job: {}", e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl IJobQueue for PostgresJobQueue {
    async fn submit(&self, job: &NotificationJob) -> Result<SubmitOutcome, QueueError> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification_jobs
                (dedup_key, job_type, chat_id, text, run_at, available_at)
            VALUES($1, $2, $3, $4, $5, $5)
            ON CONFLICT (dedup_key) DO NOTHING
            "#,
        )
        .bind(job.dedup_key.to_string())
        .bind(job.job_type())
        .bind(job.chat_id)
        .bind(&job.text)
        .bind(job.run_at)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() > 0 {
            SubmitOutcome::Enqueued
        } else {
            SubmitOutcome::Duplicate
        })
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: usize,
        lease: Duration,
    ) -> Result<Vec<ClaimedJob>, QueueError> {
        let rows: Vec<NotificationJobRaw> = sqlx::query_as(
            r#"
            UPDATE notification_jobs SET
                locked_until = $2,
                attempts = attempts + 1
            WHERE dedup_key IN (
                SELECT j.dedup_key FROM notification_jobs AS j
                WHERE j.completed_at IS NULL
                    AND j.available_at <= $1
                    AND (j.locked_until IS NULL OR j.locked_until <= $1)
                ORDER BY j.available_at
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            RETURNING dedup_key, chat_id, text, run_at, attempts
            "#,
        )
        .bind(now)
        .bind(now + lease)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(NotificationJobRaw::into_claimed)
            .collect())
    }

    async fn complete(&self, key: &DedupKey, now: DateTime<Utc>) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            UPDATE notification_jobs SET completed_at = $2, locked_until = NULL
            WHERE dedup_key = $1
            "#,
        )
        .bind(key.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn release(&self, key: &DedupKey, retry_at: DateTime<Utc>) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            UPDATE notification_jobs SET available_at = $2, locked_until = NULL
            WHERE dedup_key = $1 AND completed_at IS NULL
            "#,
        )
        .bind(key.to_string())
        .bind(retry_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn purge_completed_before(&self, before: DateTime<Utc>) -> Result<u64, QueueError> {
        let result = sqlx::query(
            r#"
            DELETE FROM notification_jobs
            WHERE completed_at < $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
