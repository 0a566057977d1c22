use crate::dtos::UserDTO;
use kopilka_domain::User;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user: UserDTO,
}

impl UserResponse {
    pub fn new(user: User) -> Self {
        Self {
            user: UserDTO::new(user),
        }
    }
}

pub mod get_or_create_user {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub telegram_id: i64,
        pub chat_id: i64,
        pub name: String,
        #[serde(default)]
        pub lastname: Option<String>,
    }

    pub type APIResponse = UserResponse;
}
