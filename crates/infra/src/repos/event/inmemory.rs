use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use kopilka_domain::{Event, EventAdvance, ID};
use std::sync::Mutex;

pub struct InMemoryEventRepo {
    events: Mutex<Vec<Event>>,
    ids: IdSequence,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            ids: IdSequence::new(),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn insert(&self, e: &Event) -> anyhow::Result<Event> {
        let mut event = e.clone();
        event.id = self.ids.next();
        insert(&event, &self.events);
        Ok(event)
    }

    async fn save(&self, e: &Event) -> anyhow::Result<()> {
        save(e, &self.events);
        Ok(())
    }

    async fn find(&self, event_id: ID) -> anyhow::Result<Option<Event>> {
        Ok(find(event_id, &self.events))
    }

    async fn find_by_user(&self, user_id: ID) -> anyhow::Result<Vec<Event>> {
        let mut events = find_by(&self.events, |e| e.user_id == user_id);
        events.sort_by_key(|e| e.event_datetime);
        Ok(events)
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>> {
        Ok(find_by(&self.events, |e| {
            e.event_datetime >= start && e.event_datetime <= end
        }))
    }

    async fn delete(&self, event_id: ID) -> anyhow::Result<Option<Event>> {
        Ok(delete(event_id, &self.events))
    }

    async fn advance_or_delete(&self, changes: &[EventAdvance]) -> anyhow::Result<usize> {
        // The lock is held for the whole batch which makes it atomic
        let mut events = lock(&self.events);
        let mut applied = 0;
        for change in changes {
            let index = events
                .iter()
                .position(|e| e.id == change.event_id && e.event_datetime == change.expected);
            let index = match index {
                Some(index) => index,
                None => continue,
            };
            match change.next {
                Some(next) => {
                    events[index].event_datetime = next;
                    events[index].updated = Utc::now();
                }
                None => {
                    events.remove(index);
                }
            }
            applied += 1;
        }
        Ok(applied)
    }
}
