use crate::error::KopilkaError;
use actix_web::HttpRequest;
use kopilka_domain::User;
use kopilka_infra::KopilkaContext;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const TELEGRAM_SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

fn header_matches(http_req: &HttpRequest, name: &str, expected: &str) -> bool {
    http_req
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == expected)
        .unwrap_or(false)
}

/// Only clients that know the api secret key may use the REST api
pub fn protect_api_route(http_req: &HttpRequest, ctx: &KopilkaContext) -> Result<(), KopilkaError> {
    if header_matches(http_req, API_KEY_HEADER, &ctx.config.api_secret_key) {
        Ok(())
    } else {
        Err(KopilkaError::Unauthorized(format!(
            "Missing or invalid `{}` header",
            API_KEY_HEADER
        )))
    }
}

/// Telegram sends the secret configured with `setWebhook` on every update
pub fn protect_telegram_route(
    http_req: &HttpRequest,
    ctx: &KopilkaContext,
) -> Result<(), KopilkaError> {
    if header_matches(
        http_req,
        TELEGRAM_SECRET_HEADER,
        &ctx.config.telegram_webhook_secret,
    ) {
        Ok(())
    } else {
        Err(KopilkaError::Unauthorized(format!(
            "Missing or invalid `{}` header",
            TELEGRAM_SECRET_HEADER
        )))
    }
}

/// Resolves the user addressed by a `/user/{telegram_id}` route
pub async fn find_user_by_telegram_id(
    telegram_id: i64,
    ctx: &KopilkaContext,
) -> Result<User, KopilkaError> {
    match ctx.repos.users.find_by_telegram_id(telegram_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(KopilkaError::NotFound(format!(
            "The user with telegram id: {}, was not found.",
            telegram_id
        ))),
        Err(_) => Err(KopilkaError::InternalError),
    }
}
