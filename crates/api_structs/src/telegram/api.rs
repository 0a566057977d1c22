use serde::{Deserialize, Serialize};

/// The subset of Telegram `Update` objects the bot reacts to
pub mod telegram_webhook {
    use super::*;

    #[derive(Debug, Clone, Deserialize, Serialize)]
    pub struct TelegramUser {
        pub id: i64,
        pub first_name: String,
        #[serde(default)]
        pub last_name: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize, Serialize)]
    pub struct TelegramChat {
        pub id: i64,
    }

    #[derive(Debug, Clone, Deserialize, Serialize)]
    pub struct TelegramMessage {
        pub message_id: i64,
        #[serde(default)]
        pub from: Option<TelegramUser>,
        pub chat: TelegramChat,
        #[serde(default)]
        pub text: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize, Serialize)]
    pub struct RequestBody {
        pub update_id: i64,
        #[serde(default)]
        pub message: Option<TelegramMessage>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub handled: bool,
    }
}
