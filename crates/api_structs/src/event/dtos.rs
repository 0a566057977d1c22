use chrono::{DateTime, Utc};
use kopilka_domain::{Event, RepeatInterval, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDTO {
    pub id: ID,
    pub user_id: ID,
    pub description: String,
    pub event_datetime: DateTime<Utc>,
    pub repeat_interval: Option<RepeatInterval>,
    pub message_count: i32,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl EventDTO {
    pub fn new(event: Event) -> Self {
        Self {
            id: event.id,
            user_id: event.user_id,
            description: event.description,
            event_datetime: event.event_datetime,
            repeat_interval: event.repeat_interval,
            message_count: event.message_count,
            created: event.created,
            updated: event.updated,
        }
    }
}
