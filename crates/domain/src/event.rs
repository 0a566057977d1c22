use crate::{
    notification::{reminder_text, DedupKey, NotificationJob},
    shared::{
        entity::{Entity, ID},
        recurrence::{next_occurrence, RecurrenceError, RepeatInterval},
    },
};
use chrono::{prelude::*, Duration};
use chrono_tz::Tz;

pub const DEFAULT_MESSAGE_COUNT: i32 = 3;
pub const MAX_MESSAGE_COUNT: i32 = 24;

/// A reminder owned by a `User`.
///
/// `event_datetime` is always the next upcoming occurrence. Recurring events
/// are moved forward in place after each occurrence has been expanded, so the
/// store never holds more than one row per reminder.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: ID,
    pub user_id: ID,
    pub description: String,
    pub event_datetime: DateTime<Utc>,
    pub repeat_interval: Option<RepeatInterval>,
    /// Number of staggered messages sent for each occurrence
    pub message_count: i32,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Entity for Event {
    fn id(&self) -> ID {
        self.id
    }
}

impl Event {
    pub fn new(
        user_id: ID,
        description: String,
        event_datetime: DateTime<Utc>,
        repeat_interval: Option<RepeatInterval>,
        message_count: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            user_id,
            description,
            event_datetime,
            repeat_interval,
            message_count,
            created: now,
            updated: now,
        }
    }

    pub fn is_valid_message_count(count: i32) -> bool {
        (1..=MAX_MESSAGE_COUNT).contains(&count)
    }

    pub fn is_recurring(&self) -> bool {
        self.repeat_interval.is_some()
    }

    /// Delivery instants for the staggered messages of the current occurrence
    pub fn notification_times(&self, spacing: Duration) -> Vec<DateTime<Utc>> {
        (0..self.message_count.max(0))
            .map(|sequence| self.event_datetime + spacing * sequence)
            .collect()
    }

    pub fn notification_jobs(&self, chat_id: i64, spacing: Duration) -> Vec<NotificationJob> {
        let text = reminder_text(&self.description);
        self.notification_times(spacing)
            .into_iter()
            .enumerate()
            .map(|(sequence, run_at)| NotificationJob {
                dedup_key: DedupKey {
                    event_id: self.id,
                    occurrence: self.event_datetime.timestamp(),
                    sequence: sequence as u32,
                },
                chat_id,
                text: text.clone(),
                run_at,
            })
            .collect()
    }

    /// The occurrence after the current one, evaluated on the wall clock of `tz`.
    /// One-shot events have none.
    pub fn next_occurrence(&self, tz: &Tz) -> Result<Option<DateTime<Utc>>, RecurrenceError> {
        match self.repeat_interval {
            Some(interval) => {
                let next = next_occurrence(self.event_datetime.with_timezone(tz), interval)?;
                Ok(Some(next.with_timezone(&Utc)))
            }
            None => Ok(None),
        }
    }

    /// What a scan pass does with this event once its occurrence has been expanded
    pub fn advance(&self, tz: &Tz) -> Result<EventAdvance, RecurrenceError> {
        Ok(EventAdvance {
            event_id: self.id,
            expected: self.event_datetime,
            next: self.next_occurrence(tz)?,
        })
    }
}

/// A pending store mutation produced by a scan pass.
///
/// It only applies while the stored event still has the `expected` datetime, so
/// edits made while the pass ran are kept and replaying a batch does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAdvance {
    pub event_id: ID,
    pub expected: DateTime<Utc>,
    /// `None` deletes the event
    pub next: Option<DateTime<Utc>>,
}

impl EventAdvance {
    pub fn is_delete(&self) -> bool {
        self.next.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono_tz::Europe::Moscow;

    fn event(repeat_interval: Option<RepeatInterval>, message_count: i32) -> Event {
        let at = Moscow
            .with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let mut e = Event::new(
            7,
            "Оплатить интернет".into(),
            at,
            repeat_interval,
            message_count,
            at - Duration::days(1),
        );
        e.id = 42;
        e
    }

    #[test]
    fn it_staggers_notification_times() {
        let e = event(None, 3);
        let times = e.notification_times(Duration::minutes(30));
        assert_eq!(
            times,
            vec![
                e.event_datetime,
                e.event_datetime + Duration::minutes(30),
                e.event_datetime + Duration::minutes(60),
            ]
        );
    }

    #[test]
    fn it_creates_one_job_per_message() {
        let e = event(None, 3);
        let jobs = e.notification_jobs(1001, Duration::minutes(30));
        assert_eq!(jobs.len(), 3);
        for (sequence, job) in jobs.iter().enumerate() {
            assert_eq!(job.dedup_key.event_id, 42);
            assert_eq!(job.dedup_key.sequence, sequence as u32);
            assert_eq!(job.chat_id, 1001);
            assert_eq!(job.text, "Напоминание: Оплатить интернет");
            assert!(job.run_at >= e.event_datetime);
        }
    }

    #[test]
    fn one_shot_events_are_deleted_after_expansion() {
        let e = event(None, 1);
        let advance = e.advance(&Moscow).unwrap();
        assert!(advance.is_delete());
        assert_eq!(advance.expected, e.event_datetime);
    }

    #[test]
    fn recurring_events_move_forward() {
        let e = event(Some(RepeatInterval::Weekly), 1);
        let advance = e.advance(&Moscow).unwrap();
        assert_eq!(advance.next, Some(e.event_datetime + Duration::days(7)));
    }

    #[test]
    fn it_validates_message_count() {
        assert!(!Event::is_valid_message_count(0));
        assert!(Event::is_valid_message_count(1));
        assert!(Event::is_valid_message_count(DEFAULT_MESSAGE_COUNT));
        assert!(!Event::is_valid_message_count(MAX_MESSAGE_COUNT + 1));
    }
}
