use crate::dtos::EventDTO;
use chrono::{DateTime, Utc};
use kopilka_domain::{Event, RepeatInterval, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event: EventDTO,
}

impl EventResponse {
    pub fn new(event: Event) -> Self {
        Self {
            event: EventDTO::new(event),
        }
    }
}

#[derive(Deserialize)]
pub struct UserPathParams {
    pub telegram_id: i64,
}

#[derive(Deserialize)]
pub struct UserEventPathParams {
    pub telegram_id: i64,
    pub event_id: ID,
}

pub mod create_event {
    use super::*;

    pub type PathParams = UserPathParams;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub description: String,
        pub event_datetime: DateTime<Utc>,
        #[serde(default)]
        pub repeat_interval: Option<RepeatInterval>,
        /// Defaults to 3 messages
        #[serde(default)]
        pub message_count: Option<i32>,
    }

    pub type APIResponse = EventResponse;
}

pub mod get_user_events {
    use super::*;

    pub type PathParams = UserPathParams;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub events: Vec<EventDTO>,
    }

    impl APIResponse {
        pub fn new(events: Vec<Event>) -> Self {
            Self {
                events: events.into_iter().map(EventDTO::new).collect(),
            }
        }
    }
}

pub mod update_event {
    use super::*;

    pub type PathParams = UserEventPathParams;

    /// Replaces the schedule of an event, a missing interval makes it one-shot
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub description: String,
        pub event_datetime: DateTime<Utc>,
        #[serde(default)]
        pub repeat_interval: Option<RepeatInterval>,
        #[serde(default)]
        pub message_count: Option<i32>,
    }

    pub type APIResponse = EventResponse;
}

pub mod delete_event {
    use super::*;

    pub type PathParams = UserEventPathParams;

    pub type APIResponse = EventResponse;
}
