use crate::shared::usecase::UseCase;
use kopilka_domain::{date::DayWindow, EventAdvance};
use kopilka_infra::{with_timeout, KopilkaContext, QueueError, SubmitOutcome};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// One scan pass: every event due on the current local day is expanded into
/// its reminder jobs and then moved to its next occurrence or deleted.
///
/// All jobs of the pass are submitted before the store is touched and the
/// store changes are committed in one batch at the end. A failing submission
/// aborts the pass without committing anything, so the events stay due and
/// the next pass expands them again. The dedup keys make that re-expansion
/// harmless for the jobs that did reach the queue.
#[derive(Debug)]
pub struct ScanDueEventsUseCase {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Events found in the day window
    pub due: usize,
    pub rescheduled: usize,
    pub deleted: usize,
    /// Events left untouched for the next pass
    pub skipped: usize,
    /// Newly enqueued jobs, duplicates not included
    pub jobs_submitted: usize,
}

#[derive(Error, Debug, PartialEq)]
pub enum ScanError {
    #[error("Store is unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Job queue is unavailable: {0}")]
    QueueUnavailable(String),
}

impl From<QueueError> for ScanError {
    fn from(e: QueueError) -> Self {
        Self::QueueUnavailable(e.to_string())
    }
}

async fn store_call<T, F>(timeout: Duration, call: F) -> Result<T, ScanError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(res)) => Ok(res),
        Ok(Err(e)) => Err(ScanError::StoreUnavailable(e.to_string())),
        Err(_) => Err(ScanError::StoreUnavailable(
            "Store did not answer in time".into(),
        )),
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ScanDueEventsUseCase {
    type Response = ScanReport;

    type Errors = ScanError;

    const NAME: &'static str = "ScanDueEvents";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        let timeout = ctx.config.io_timeout;
        let tz = ctx.config.timezone;
        let window = DayWindow::containing(ctx.sys.now(), &tz);

        let events = store_call(
            timeout,
            ctx.repos.events.find_in_range(window.start, window.end),
        )
        .await?;
        info!(
            "Found {} due events between {} and {}",
            events.len(),
            window.start,
            window.end
        );

        let mut report = ScanReport {
            due: events.len(),
            ..Default::default()
        };
        let mut changes: Vec<EventAdvance> = Vec::with_capacity(events.len());

        for event in events {
            let user = match store_call(timeout, ctx.repos.users.find(event.user_id)).await? {
                Some(user) => user,
                None => {
                    warn!(
                        "Skipping event {}: its user {} does not exist",
                        event.id, event.user_id
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            // Has to succeed before any job of the event is submitted
            let change = match event.advance(&tz) {
                Ok(change) => change,
                Err(e) => {
                    error!("Skipping event {}: {}", event.id, e);
                    report.skipped += 1;
                    continue;
                }
            };

            for job in event.notification_jobs(user.chat_id, ctx.config.message_spacing) {
                match with_timeout(timeout, ctx.queue.submit(&job)).await? {
                    SubmitOutcome::Enqueued => report.jobs_submitted += 1,
                    SubmitOutcome::Duplicate => {
                        info!("Job {} was already submitted", job.dedup_key)
                    }
                }
            }

            if change.is_delete() {
                report.deleted += 1;
            } else {
                report.rescheduled += 1;
            }
            changes.push(change);
        }

        if !changes.is_empty() {
            let applied =
                store_call(timeout, ctx.repos.events.advance_or_delete(&changes)).await?;
            if applied < changes.len() {
                warn!(
                    "{} of {} events were changed while the scan pass ran and were left as they are",
                    changes.len() - applied,
                    changes.len()
                );
            }
        }

        info!("Scan pass done: {:?}", report);
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::usecase::execute;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use chrono_tz::Europe::Moscow;
    use kopilka_domain::{DedupKey, Event, NotificationJob, RepeatInterval, User, ID};
    use kopilka_infra::{ClaimedJob, IEventRepo, IJobQueue, ISys, InMemoryJobQueue};
    use std::sync::Arc;

    pub struct StaticTimeSys {
        now: DateTime<Utc>,
    }

    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.now.timestamp_millis()
        }
    }

    /// Fails every batch commit, everything else goes to the wrapped repo
    struct FailingCommitEventRepo {
        inner: Arc<dyn IEventRepo>,
    }

    #[async_trait::async_trait]
    impl IEventRepo for FailingCommitEventRepo {
        async fn insert(&self, e: &Event) -> anyhow::Result<Event> {
            self.inner.insert(e).await
        }
        async fn save(&self, e: &Event) -> anyhow::Result<()> {
            self.inner.save(e).await
        }
        async fn find(&self, event_id: ID) -> anyhow::Result<Option<Event>> {
            self.inner.find(event_id).await
        }
        async fn find_by_user(&self, user_id: ID) -> anyhow::Result<Vec<Event>> {
            self.inner.find_by_user(user_id).await
        }
        async fn find_in_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> anyhow::Result<Vec<Event>> {
            self.inner.find_in_range(start, end).await
        }
        async fn delete(&self, event_id: ID) -> anyhow::Result<Option<Event>> {
            self.inner.delete(event_id).await
        }
        async fn advance_or_delete(&self, _changes: &[EventAdvance]) -> anyhow::Result<usize> {
            Err(anyhow::anyhow!("connection reset"))
        }
    }

    struct UnavailableJobQueue {}

    #[async_trait::async_trait]
    impl IJobQueue for UnavailableJobQueue {
        async fn submit(&self, _job: &NotificationJob) -> Result<SubmitOutcome, QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }
        async fn claim_due(
            &self,
            _now: DateTime<Utc>,
            _limit: usize,
            _lease: ChronoDuration,
        ) -> Result<Vec<ClaimedJob>, QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }
        async fn complete(&self, _key: &DedupKey, _now: DateTime<Utc>) -> Result<(), QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }
        async fn release(
            &self,
            _key: &DedupKey,
            _retry_at: DateTime<Utc>,
        ) -> Result<(), QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }
        async fn purge_completed_before(&self, _before: DateTime<Utc>) -> Result<u64, QueueError> {
            Err(QueueError::Unavailable("connection refused".into()))
        }
    }

    struct TestContext {
        ctx: KopilkaContext,
        queue: Arc<InMemoryJobQueue>,
        user: User,
    }

    fn moscow(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Moscow
            .with_ymd_and_hms(2025, 6, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    async fn setup() -> TestContext {
        let mut ctx = KopilkaContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys {
            now: moscow(1, 8, 0),
        });
        ctx.config.timezone = Moscow;
        ctx.config.message_spacing = ChronoDuration::minutes(30);
        let queue = Arc::new(InMemoryJobQueue::new());
        ctx.queue = queue.clone();
        let user = ctx
            .repos
            .users
            .insert(&User::new(1000, 2000, "Anna".into(), None))
            .await
            .unwrap();

        TestContext { ctx, queue, user }
    }

    async fn insert_event(
        ctx: &KopilkaContext,
        user_id: ID,
        at: DateTime<Utc>,
        repeat_interval: Option<RepeatInterval>,
        message_count: i32,
    ) -> Event {
        let event = Event::new(
            user_id,
            "Оплатить интернет".into(),
            at,
            repeat_interval,
            message_count,
            at - ChronoDuration::days(7),
        );
        ctx.repos.events.insert(&event).await.unwrap()
    }

    #[actix_web::main]
    #[test]
    async fn one_shot_event_is_expanded_and_deleted() {
        let TestContext { ctx, queue, user } = setup().await;
        let due_at = moscow(1, 9, 0);
        let event = insert_event(&ctx, user.id, due_at, None, 3).await;

        let report = execute(ScanDueEventsUseCase {}, &ctx).await.unwrap();

        assert_eq!(
            report,
            ScanReport {
                due: 1,
                rescheduled: 0,
                deleted: 1,
                skipped: 0,
                jobs_submitted: 3,
            }
        );
        assert!(ctx.repos.events.find(event.id).await.unwrap().is_none());

        let mut jobs = queue.jobs();
        jobs.sort_by_key(|job| job.dedup_key.sequence);
        assert_eq!(jobs.len(), 3);
        for (sequence, job) in jobs.iter().enumerate() {
            assert_eq!(
                job.dedup_key,
                DedupKey {
                    event_id: event.id,
                    occurrence: due_at.timestamp(),
                    sequence: sequence as u32,
                }
            );
            assert!(job.run_at >= due_at);
            assert_eq!(job.chat_id, user.chat_id);
            assert_eq!(job.text, "Напоминание: Оплатить интернет");
        }
        assert_eq!(jobs[1].run_at, due_at + ChronoDuration::minutes(30));
        assert_eq!(jobs[2].run_at, due_at + ChronoDuration::minutes(60));
    }

    #[actix_web::main]
    #[test]
    async fn recurring_event_is_advanced() {
        let TestContext { ctx, queue, user } = setup().await;
        let due_at = moscow(1, 21, 30);
        let daily = insert_event(&ctx, user.id, due_at, Some(RepeatInterval::Daily), 1).await;
        let monthly =
            insert_event(&ctx, user.id, moscow(1, 0, 0), Some(RepeatInterval::Monthly), 2).await;

        let report = execute(ScanDueEventsUseCase {}, &ctx).await.unwrap();

        assert_eq!(report.due, 2);
        assert_eq!(report.rescheduled, 2);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.jobs_submitted, 3);
        assert_eq!(queue.jobs().len(), 3);

        let daily = ctx.repos.events.find(daily.id).await.unwrap().unwrap();
        assert_eq!(daily.event_datetime, moscow(2, 21, 30));
        let monthly = ctx.repos.events.find(monthly.id).await.unwrap().unwrap();
        assert_eq!(
            monthly.event_datetime,
            Moscow
                .with_ymd_and_hms(2025, 7, 1, 0, 0, 0)
                .unwrap()
                .with_timezone(&Utc)
        );
    }

    #[actix_web::main]
    #[test]
    async fn back_to_back_passes_submit_nothing_new() {
        let TestContext { ctx, queue, user } = setup().await;
        insert_event(&ctx, user.id, moscow(1, 9, 0), None, 3).await;
        insert_event(&ctx, user.id, moscow(1, 12, 0), Some(RepeatInterval::Weekly), 2).await;

        let first = execute(ScanDueEventsUseCase {}, &ctx).await.unwrap();
        assert_eq!(first.jobs_submitted, 5);

        let second = execute(ScanDueEventsUseCase {}, &ctx).await.unwrap();
        assert_eq!(second, ScanReport::default());
        assert_eq!(queue.jobs().len(), 5);
    }

    #[actix_web::main]
    #[test]
    async fn only_events_of_the_current_local_day_are_due() {
        let TestContext { ctx, queue, user } = setup().await;
        let last_second_of_yesterday = moscow(1, 0, 0) - ChronoDuration::seconds(1);
        let yesterday = insert_event(&ctx, user.id, last_second_of_yesterday, None, 1).await;
        let tomorrow = insert_event(&ctx, user.id, moscow(2, 0, 0), None, 1).await;
        insert_event(&ctx, user.id, moscow(1, 23, 59), None, 1).await;

        let report = execute(ScanDueEventsUseCase {}, &ctx).await.unwrap();

        assert_eq!(report.due, 1);
        assert_eq!(queue.jobs().len(), 1);
        assert!(ctx.repos.events.find(yesterday.id).await.unwrap().is_some());
        assert!(ctx.repos.events.find(tomorrow.id).await.unwrap().is_some());
    }

    #[actix_web::main]
    #[test]
    async fn failed_commit_leaves_events_unchanged() {
        let TestContext {
            mut ctx,
            queue,
            user,
        } = setup().await;
        let one_shot = insert_event(&ctx, user.id, moscow(1, 9, 0), None, 3).await;
        let recurring =
            insert_event(&ctx, user.id, moscow(1, 10, 0), Some(RepeatInterval::Daily), 1).await;

        let working_repo = ctx.repos.events.clone();
        ctx.repos.events = Arc::new(FailingCommitEventRepo {
            inner: working_repo.clone(),
        });
        let res = execute(ScanDueEventsUseCase {}, &ctx).await;

        assert!(matches!(res, Err(ScanError::StoreUnavailable(_))));
        assert_eq!(
            working_repo.find(one_shot.id).await.unwrap(),
            Some(one_shot.clone())
        );
        assert_eq!(
            working_repo.find(recurring.id).await.unwrap(),
            Some(recurring.clone())
        );
        // Submitted jobs are not retracted
        assert_eq!(queue.jobs().len(), 4);

        // The next pass expands the same occurrences again without new jobs
        ctx.repos.events = working_repo.clone();
        let report = execute(ScanDueEventsUseCase {}, &ctx).await.unwrap();
        assert_eq!(report.due, 2);
        assert_eq!(report.jobs_submitted, 0);
        assert_eq!(queue.jobs().len(), 4);
        assert!(working_repo.find(one_shot.id).await.unwrap().is_none());
    }

    #[actix_web::main]
    #[test]
    async fn unavailable_queue_aborts_the_pass() {
        let TestContext { mut ctx, user, .. } = setup().await;
        let event = insert_event(&ctx, user.id, moscow(1, 9, 0), None, 3).await;
        ctx.queue = Arc::new(UnavailableJobQueue {});

        let res = execute(ScanDueEventsUseCase {}, &ctx).await;

        assert!(matches!(res, Err(ScanError::QueueUnavailable(_))));
        assert_eq!(ctx.repos.events.find(event.id).await.unwrap(), Some(event));
    }

    #[actix_web::main]
    #[test]
    async fn events_without_user_are_skipped() {
        let TestContext { ctx, queue, .. } = setup().await;
        let orphan = insert_event(&ctx, 9999, moscow(1, 9, 0), None, 3).await;

        let report = execute(ScanDueEventsUseCase {}, &ctx).await.unwrap();

        assert_eq!(report.due, 1);
        assert_eq!(report.skipped, 1);
        assert!(queue.jobs().is_empty());
        assert_eq!(ctx.repos.events.find(orphan.id).await.unwrap(), Some(orphan));
    }

    #[actix_web::main]
    #[test]
    async fn events_that_cannot_advance_are_left_for_the_next_pass() {
        let TestContext {
            mut ctx,
            queue,
            user,
        } = setup().await;
        // No later year can be represented, so the yearly event cannot advance
        let last_day = chrono::NaiveDate::MAX;
        let at = |hour| Utc.from_utc_datetime(&last_day.and_hms_opt(hour, 0, 0).unwrap());
        ctx.config.timezone = chrono_tz::UTC;
        ctx.sys = Arc::new(StaticTimeSys { now: at(8) });
        let one_shot = insert_event(&ctx, user.id, at(9), None, 1).await;
        let yearly = insert_event(&ctx, user.id, at(12), Some(RepeatInterval::Yearly), 3).await;

        let report = execute(ScanDueEventsUseCase {}, &ctx).await.unwrap();

        assert_eq!(
            report,
            ScanReport {
                due: 2,
                rescheduled: 0,
                deleted: 1,
                skipped: 1,
                jobs_submitted: 1,
            }
        );
        assert!(queue
            .jobs()
            .iter()
            .all(|job| job.dedup_key.event_id == one_shot.id));
        assert!(ctx.repos.events.find(one_shot.id).await.unwrap().is_none());
        assert_eq!(ctx.repos.events.find(yearly.id).await.unwrap(), Some(yearly));
    }
}
