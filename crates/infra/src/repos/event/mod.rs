mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryEventRepo;
use kopilka_domain::{Event, EventAdvance, ID};
pub use postgres::PostgresEventRepo;

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    /// Stores a new event and returns it with its assigned id
    async fn insert(&self, e: &Event) -> anyhow::Result<Event>;
    async fn save(&self, e: &Event) -> anyhow::Result<()>;
    async fn find(&self, event_id: ID) -> anyhow::Result<Option<Event>>;
    async fn find_by_user(&self, user_id: ID) -> anyhow::Result<Vec<Event>>;
    /// Events whose `event_datetime` lies in `[start, end]`, both ends inclusive
    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>>;
    async fn delete(&self, event_id: ID) -> anyhow::Result<Option<Event>>;
    /// Applies all changes of a scan pass in one transaction. A change is only
    /// applied while the event still has its `expected` datetime. Returns the
    /// number of changes that were applied.
    async fn advance_or_delete(&self, changes: &[EventAdvance]) -> anyhow::Result<usize>;
}

#[cfg(test)]
mod tests {
    use crate::KopilkaContext;
    use chrono::{Duration, TimeZone, Utc};
    use kopilka_domain::{Event, EventAdvance, RepeatInterval};

    fn generate_event(user_id: i64, hour: u32) -> Event {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, hour, 0, 0).unwrap();
        Event::new(
            user_id,
            format!("Event at {}", hour),
            at,
            None,
            3,
            at - Duration::days(1),
        )
    }

    #[tokio::test]
    async fn create_find_and_delete() {
        let ctx = KopilkaContext::create_inmemory();
        let event = ctx.repos.events.insert(&generate_event(1, 9)).await.unwrap();
        assert!(event.id > 0);

        let found = ctx.repos.events.find(event.id).await.unwrap().unwrap();
        assert_eq!(found, event);
        let by_user = ctx.repos.events.find_by_user(1).await.unwrap();
        assert_eq!(by_user, vec![event.clone()]);
        assert!(ctx.repos.events.find_by_user(2).await.unwrap().is_empty());

        let deleted = ctx.repos.events.delete(event.id).await.unwrap();
        assert_eq!(deleted, Some(event.clone()));
        assert!(ctx.repos.events.find(event.id).await.unwrap().is_none());
        assert!(ctx.repos.events.delete(event.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let ctx = KopilkaContext::create_inmemory();
        let first = ctx.repos.events.insert(&generate_event(1, 9)).await.unwrap();
        ctx.repos.events.delete(first.id).await.unwrap();
        let second = ctx.repos.events.insert(&generate_event(1, 9)).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn range_query_is_inclusive() {
        let ctx = KopilkaContext::create_inmemory();
        for hour in [8, 9, 10, 11] {
            ctx.repos.events.insert(&generate_event(1, hour)).await.unwrap();
        }
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let mut hours = ctx
            .repos
            .events
            .find_in_range(start, end)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.description)
            .collect::<Vec<_>>();
        hours.sort();
        assert_eq!(hours, vec!["Event at 10".to_string(), "Event at 9".to_string()]);
    }

    #[tokio::test]
    async fn advance_or_delete_applies_guarded_changes() {
        let ctx = KopilkaContext::create_inmemory();
        let one_shot = ctx.repos.events.insert(&generate_event(1, 9)).await.unwrap();
        let mut recurring = generate_event(1, 10);
        recurring.repeat_interval = Some(RepeatInterval::Daily);
        let recurring = ctx.repos.events.insert(&recurring).await.unwrap();
        let mut edited = ctx.repos.events.insert(&generate_event(1, 11)).await.unwrap();

        // Edited by the user after the scan read it
        let stale_expected = edited.event_datetime;
        edited.event_datetime = edited.event_datetime + Duration::hours(3);
        ctx.repos.events.save(&edited).await.unwrap();

        let next = recurring.event_datetime + Duration::days(1);
        let changes = vec![
            EventAdvance {
                event_id: one_shot.id,
                expected: one_shot.event_datetime,
                next: None,
            },
            EventAdvance {
                event_id: recurring.id,
                expected: recurring.event_datetime,
                next: Some(next),
            },
            EventAdvance {
                event_id: edited.id,
                expected: stale_expected,
                next: None,
            },
        ];
        assert_eq!(ctx.repos.events.advance_or_delete(&changes).await.unwrap(), 2);

        assert!(ctx.repos.events.find(one_shot.id).await.unwrap().is_none());
        let advanced = ctx.repos.events.find(recurring.id).await.unwrap().unwrap();
        assert_eq!(advanced.event_datetime, next);
        assert_eq!(
            ctx.repos.events.find(edited.id).await.unwrap(),
            Some(edited.clone())
        );

        // Replaying the same batch changes nothing
        assert_eq!(ctx.repos.events.advance_or_delete(&changes).await.unwrap(), 0);
        let advanced = ctx.repos.events.find(recurring.id).await.unwrap().unwrap();
        assert_eq!(advanced.event_datetime, next);
    }
}
