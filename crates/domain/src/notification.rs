use crate::shared::entity::ID;
use chrono::prelude::*;
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Job type of every reminder message put on the queue
pub const SEND_REMINDER_JOB: &str = "send_reminder";

pub const REMINDER_LABEL: &str = "Напоминание:";

pub fn reminder_text(description: &str) -> String {
    format!("{} {}", REMINDER_LABEL, description)
}

/// Idempotency key of a single staggered message.
///
/// Re-expanding the same occurrence yields the same keys, while the next
/// occurrence of a recurring event gets new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub event_id: ID,
    /// Unix timestamp of the occurrence the message belongs to
    pub occurrence: i64,
    pub sequence: u32,
}

impl Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.event_id, self.occurrence, self.sequence)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Malformed dedup key: {0}")]
pub struct InvalidDedupKeyError(String);

impl FromStr for DedupKey {
    type Err = InvalidDedupKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidDedupKeyError(s.to_string());
        let mut parts = s.split(':');
        let event_id = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let occurrence = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let sequence = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self {
            event_id,
            occurrence,
            sequence,
        })
    }
}

/// A deferred reminder message: who gets it, what it says and when
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationJob {
    pub dedup_key: DedupKey,
    pub chat_id: i64,
    pub text: String,
    pub run_at: DateTime<Utc>,
}

impl NotificationJob {
    pub fn job_type(&self) -> &'static str {
        SEND_REMINDER_JOB
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dedup_key_is_rendered_and_parsed() {
        let key = DedupKey {
            event_id: 12,
            occurrence: 1748757600,
            sequence: 2,
        };
        assert_eq!(key.to_string(), "12:1748757600:2");
        assert_eq!("12:1748757600:2".parse::<DedupKey>(), Ok(key));
    }

    #[test]
    fn it_rejects_malformed_dedup_keys() {
        for input in ["", "12", "12:1", "12:1:x", "12:1:2:3", "a:b:c"] {
            assert!(input.parse::<DedupKey>().is_err(), "{}", input);
        }
    }

    #[test]
    fn it_prefixes_reminder_text() {
        assert_eq!(reminder_text("Позвонить маме"), "Напоминание: Позвонить маме");
    }
}
