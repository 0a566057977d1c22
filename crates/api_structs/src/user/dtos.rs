use kopilka_domain::{User, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDTO {
    pub id: ID,
    pub telegram_id: i64,
    pub chat_id: i64,
    pub name: String,
    pub lastname: Option<String>,
    pub is_active: bool,
}

impl UserDTO {
    pub fn new(user: User) -> Self {
        Self {
            id: user.id,
            telegram_id: user.telegram_id,
            chat_id: user.chat_id,
            name: user.name,
            lastname: user.lastname,
            is_active: user.is_active,
        }
    }
}
