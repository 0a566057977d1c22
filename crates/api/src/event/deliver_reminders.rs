use crate::shared::usecase::UseCase;
use chrono::Duration;
use kopilka_infra::{with_timeout, KopilkaContext, NotifierError, OutgoingMessage, QueueError};
use thiserror::Error;
use tracing::{error, warn};

/// Jobs still failing after this many attempts are given up
pub const MAX_DELIVERY_ATTEMPTS: i32 = 5;
const CLAIM_BATCH_SIZE: usize = 50;

/// Sends the reminder messages whose delivery time has come.
///
/// A job is completed once the chat api accepted it. Failed sends are released
/// back to the queue and retried after `attempts` minutes.
#[derive(Debug)]
pub struct DeliverDueRemindersUseCase {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub claimed: usize,
    pub delivered: usize,
    pub retried: usize,
    /// Given up after `MAX_DELIVERY_ATTEMPTS`
    pub failed: usize,
}

#[derive(Error, Debug, PartialEq)]
pub enum DeliveryError {
    #[error("Job queue is unavailable: {0}")]
    QueueUnavailable(String),
}

impl From<QueueError> for DeliveryError {
    fn from(e: QueueError) -> Self {
        Self::QueueUnavailable(e.to_string())
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeliverDueRemindersUseCase {
    type Response = DeliveryReport;

    type Errors = DeliveryError;

    const NAME: &'static str = "DeliverDueReminders";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        let timeout = ctx.config.io_timeout;
        let now = ctx.sys.now();
        // The lease has to outlive a send that runs into the timeout
        let lease = std::cmp::max(
            Duration::seconds(3 * timeout.as_secs() as i64),
            Duration::minutes(1),
        );

        let claimed = with_timeout(
            timeout,
            ctx.queue.claim_due(now, CLAIM_BATCH_SIZE, lease),
        )
        .await?;
        let mut report = DeliveryReport {
            claimed: claimed.len(),
            ..Default::default()
        };

        for claimed_job in claimed {
            let job = claimed_job.job;
            let message = OutgoingMessage::text(job.chat_id, job.text.clone());
            let sent = match tokio::time::timeout(timeout, ctx.notifier.send_message(&message))
                .await
            {
                Ok(res) => res,
                Err(_) => Err(NotifierError::Network("Send timed out".into())),
            };

            match sent {
                Ok(()) => {
                    with_timeout(timeout, ctx.queue.complete(&job.dedup_key, now)).await?;
                    report.delivered += 1;
                }
                Err(e) if claimed_job.attempts >= MAX_DELIVERY_ATTEMPTS => {
                    error!(
                        "Giving up on reminder {} to chat {} after {} attempts: {}",
                        job.dedup_key, job.chat_id, claimed_job.attempts, e
                    );
                    with_timeout(timeout, ctx.queue.complete(&job.dedup_key, now)).await?;
                    report.failed += 1;
                }
                Err(e) => {
                    let retry_at = now + Duration::minutes(claimed_job.attempts.max(1) as i64);
                    warn!(
                        "Could not deliver reminder {} (attempt {}), retrying at {}: {}",
                        job.dedup_key, claimed_job.attempts, retry_at, e
                    );
                    with_timeout(timeout, ctx.queue.release(&job.dedup_key, retry_at)).await?;
                    report.retried += 1;
                }
            }
        }

        Ok(report)
    }
}
