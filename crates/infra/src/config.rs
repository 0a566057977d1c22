use chrono_tz::Tz;
use kopilka_utils::create_random_secret;
use std::{fmt::Display, str::FromStr, time::Duration};
use tracing::{info, warn};

/// How the event scan is triggered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTrigger {
    /// In-process timer with a fixed period
    Interval(Duration),
    /// Fires when the wall clock reaches one of these seconds of a minute
    Cron(Vec<u32>),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Telegram bot token. Without one replies and reminders are only logged
    pub telegram_bot_token: Option<String>,
    /// Expected value of the `X-Telegram-Bot-Api-Secret-Token` header on webhook calls
    pub telegram_webhook_secret: String,
    /// Expected value of the `x-api-key` header on the REST api
    pub api_secret_key: String,
    /// Zone of the scan day window and of datetimes typed in chat
    pub timezone: Tz,
    pub scan_trigger: ScanTrigger,
    /// Gap between the staggered messages of one reminder occurrence
    pub message_spacing: chrono::Duration,
    pub dispatch_interval: Duration,
    /// Timeout for store, queue and transport calls
    pub io_timeout: Duration,
    /// Completed jobs are kept this long so that their dedup keys keep working
    pub job_retention: chrono::Duration,
}

const DEFAULT_CRON_SECONDS: [u32; 2] = [1, 30];

fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match std::env::var(name) {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default value: {}.",
                    name, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn secret_from_env(name: &str, purpose: &str) -> String {
    match std::env::var(name) {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            info!(
                "Did not find {} environment variable. Going to create one.",
                name
            );
            let secret = create_random_secret(32);
            info!("Secret for {} was generated and set to: {}", purpose, secret);
            secret
        }
    }
}

pub fn parse_cron_seconds(input: &str) -> Option<Vec<u32>> {
    let mut seconds = input
        .split(',')
        .map(|s| s.trim().parse::<u32>().ok().filter(|s| *s < 60))
        .collect::<Option<Vec<_>>>()?;
    if seconds.is_empty() {
        return None;
    }
    seconds.sort_unstable();
    seconds.dedup();
    Some(seconds)
}

fn scan_trigger_from_env() -> ScanTrigger {
    let trigger = std::env::var("SCAN_TRIGGER").unwrap_or_else(|_| "interval".into());
    match trigger.trim().to_lowercase().as_str() {
        "cron" => {
            let raw = std::env::var("SCAN_CRON_SECONDS").unwrap_or_else(|_| "1,30".into());
            let seconds = parse_cron_seconds(&raw).unwrap_or_else(|| {
                warn!(
                    "The given SCAN_CRON_SECONDS: {} is not valid, falling back to: {:?}.",
                    raw, DEFAULT_CRON_SECONDS
                );
                DEFAULT_CRON_SECONDS.to_vec()
            });
            ScanTrigger::Cron(seconds)
        }
        other => {
            if other != "interval" {
                warn!(
                    "Unknown SCAN_TRIGGER: {}, falling back to the interval trigger.",
                    other
                );
            }
            let secs = env_or("SCAN_INTERVAL_SECS", 30u64).max(1);
            ScanTrigger::Interval(Duration::from_secs(secs))
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let timezone = env_or("TIMEZONE", chrono_tz::Europe::Moscow);
        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());
        if telegram_bot_token.is_none() {
            info!("Did not find TELEGRAM_BOT_TOKEN environment variable. Messages will only be logged.");
        }

        Self {
            port: env_or("PORT", 5000),
            telegram_bot_token,
            telegram_webhook_secret: secret_from_env("TELEGRAM_WEBHOOK_SECRET", "the telegram webhook"),
            api_secret_key: secret_from_env("API_SECRET_KEY", "the REST api"),
            timezone,
            scan_trigger: scan_trigger_from_env(),
            message_spacing: chrono::Duration::minutes(env_or("MESSAGE_SPACING_MINUTES", 30i64).max(0)),
            dispatch_interval: Duration::from_secs(env_or("DISPATCH_INTERVAL_SECS", 10u64).max(1)),
            io_timeout: Duration::from_secs(env_or("IO_TIMEOUT_SECS", 10u64).max(1)),
            job_retention: chrono::Duration::days(env_or("JOB_RETENTION_DAYS", 7i64).max(1)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_cron_seconds() {
        assert_eq!(parse_cron_seconds("1,30"), Some(vec![1, 30]));
        assert_eq!(parse_cron_seconds(" 45, 5 ,5"), Some(vec![5, 45]));
        assert_eq!(parse_cron_seconds("0"), Some(vec![0]));
        assert_eq!(parse_cron_seconds("60"), None);
        assert_eq!(parse_cron_seconds("1,x"), None);
        assert_eq!(parse_cron_seconds(""), None);
    }
}
