use crate::{APIResponse, BaseClient};
use kopilka_api_structs::get_or_create_user;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserClient {
    base: Arc<BaseClient>,
}

pub struct GetOrCreateUserInput {
    pub telegram_id: i64,
    pub chat_id: i64,
    pub name: String,
    pub lastname: Option<String>,
}

impl UserClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn get_or_create(
        &self,
        input: GetOrCreateUserInput,
    ) -> APIResponse<get_or_create_user::APIResponse> {
        let body = get_or_create_user::RequestBody {
            telegram_id: input.telegram_id,
            chat_id: input.chat_id,
            name: input.name,
            lastname: input.lastname,
        };
        self.base
            .post(body, "users".into(), StatusCode::OK)
            .await
    }
}
