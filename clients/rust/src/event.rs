use crate::{APIResponse, BaseClient};
use chrono::{DateTime, Utc};
use kopilka_api_structs::*;
use kopilka_domain::{RepeatInterval, ID};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct EventClient {
    base: Arc<BaseClient>,
}

pub struct CreateEventInput {
    pub telegram_id: i64,
    pub description: String,
    pub event_datetime: DateTime<Utc>,
    pub repeat_interval: Option<RepeatInterval>,
    pub message_count: Option<i32>,
}

pub struct UpdateEventInput {
    pub telegram_id: i64,
    pub event_id: ID,
    pub description: String,
    pub event_datetime: DateTime<Utc>,
    pub repeat_interval: Option<RepeatInterval>,
    pub message_count: Option<i32>,
}

impl EventClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(&self, input: CreateEventInput) -> APIResponse<create_event::APIResponse> {
        let body = create_event::RequestBody {
            description: input.description,
            event_datetime: input.event_datetime,
            repeat_interval: input.repeat_interval,
            message_count: input.message_count,
        };
        self.base
            .post(
                body,
                format!("user/{}/events", input.telegram_id),
                StatusCode::CREATED,
            )
            .await
    }

    pub async fn get_all(&self, telegram_id: i64) -> APIResponse<get_user_events::APIResponse> {
        self.base
            .get(format!("user/{}/events", telegram_id), StatusCode::OK)
            .await
    }

    pub async fn update(&self, input: UpdateEventInput) -> APIResponse<update_event::APIResponse> {
        let body = update_event::RequestBody {
            description: input.description,
            event_datetime: input.event_datetime,
            repeat_interval: input.repeat_interval,
            message_count: input.message_count,
        };
        self.base
            .put(
                body,
                format!("user/{}/events/{}", input.telegram_id, input.event_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn delete(
        &self,
        telegram_id: i64,
        event_id: ID,
    ) -> APIResponse<delete_event::APIResponse> {
        self.base
            .delete(
                format!("user/{}/events/{}", telegram_id, event_id),
                StatusCode::OK,
            )
            .await
    }
}
