use super::{INotifier, NotifierError, OutgoingMessage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct KeyboardButton<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ReplyKeyboardMarkup<'a> {
    keyboard: Vec<Vec<KeyboardButton<'a>>>,
    resize_keyboard: bool,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyKeyboardMarkup<'a>>,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through the Telegram Bot API
pub struct TelegramNotifier {
    client: Client,
    token: String,
}

impl TelegramNotifier {
    pub fn new(token: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, token }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", TELEGRAM_API_BASE_URL, self.token, method)
    }
}

#[async_trait::async_trait]
impl INotifier for TelegramNotifier {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), NotifierError> {
        let body = SendMessageRequest {
            chat_id: message.chat_id,
            text: &message.text,
            reply_markup: message.keyboard.as_ref().map(|rows| ReplyKeyboardMarkup {
                keyboard: rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|text| KeyboardButton {
                                text: text.as_str(),
                            })
                            .collect()
                    })
                    .collect(),
                resize_keyboard: true,
            }),
        };

        let res = match self
            .client
            .post(&self.url("sendMessage"))
            .json(&body)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!(
                    "[Network Error] Telegram sendMessage error. Error message: {:?}",
                    e
                );
                return Err(NotifierError::Network(e.to_string()));
            }
        };

        let status = res.status();
        match res.json::<TelegramResponse>().await {
            Ok(TelegramResponse { ok: true, .. }) => Ok(()),
            Ok(TelegramResponse { description, .. }) => {
                let reason = description.unwrap_or_else(|| status.to_string());
                error!(
                    "[Unexpected Response] Telegram sendMessage rejected. Error message: {}",
                    reason
                );
                Err(NotifierError::Rejected(reason))
            }
            Err(e) => {
                error!(
                    "[Unexpected Response] Telegram sendMessage error. Error message: {:?}",
                    e
                );
                Err(NotifierError::Rejected(status.to_string()))
            }
        }
    }
}
