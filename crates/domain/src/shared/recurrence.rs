use crate::date::{add_months, resolve_local};
use chrono::{prelude::*, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// How often a reminder repeats. An `Event` without one fires once.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    Daily,
    Weekly,
    Monthly,
    SemiAnnual,
    Yearly,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Unsupported repeat interval: {0}")]
    InvalidInterval(String),
    #[error("Next occurrence is out of the supported date range")]
    OutOfRange,
}

impl RepeatInterval {
    pub const ALL: [RepeatInterval; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::SemiAnnual,
        Self::Yearly,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::SemiAnnual => "semiannual",
            Self::Yearly => "yearly",
        }
    }

    /// Label shown on the chat keyboard
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "ежедневно",
            Self::Weekly => "еженедельно",
            Self::Monthly => "ежемесячно",
            Self::SemiAnnual => "раз в полгода",
            Self::Yearly => "ежегодно",
        }
    }

    fn calendar_months(&self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::SemiAnnual => Some(6),
            Self::Yearly => Some(12),
            Self::Daily | Self::Weekly => None,
        }
    }
}

impl Display for RepeatInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for RepeatInterval {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .find(|interval| interval.code() == normalized || interval.label() == normalized)
            .copied()
            .ok_or_else(|| RecurrenceError::InvalidInterval(s.to_string()))
    }
}

/// Computes the first occurrence strictly after `t`.
///
/// The arithmetic happens on the local wall clock of `t`, so a reminder at
/// 09:00 stays at 09:00 across DST changes. Month based intervals keep the day
/// of month and clamp it to the length of the target month.
pub fn next_occurrence(
    t: DateTime<Tz>,
    interval: RepeatInterval,
) -> Result<DateTime<Tz>, RecurrenceError> {
    let local = t.naive_local();
    let next_local = match interval.calendar_months() {
        Some(months) => add_months(local.date(), months)
            .ok_or(RecurrenceError::OutOfRange)?
            .and_time(local.time()),
        None => {
            let days = if interval == RepeatInterval::Daily { 1 } else { 7 };
            local
                .checked_add_signed(Duration::days(days))
                .ok_or(RecurrenceError::OutOfRange)?
        }
    };

    let next = resolve_local(&t.timezone(), next_local);
    if next <= t {
        return Err(RecurrenceError::OutOfRange);
    }
    Ok(next)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono_tz::Europe::{Moscow, Oslo};

    fn moscow(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Moscow.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn it_parses_codes_and_labels() {
        for interval in RepeatInterval::ALL {
            assert_eq!(interval.code().parse::<RepeatInterval>(), Ok(interval));
            assert_eq!(interval.label().parse::<RepeatInterval>(), Ok(interval));
        }
        assert_eq!(" Monthly ".parse::<RepeatInterval>(), Ok(RepeatInterval::Monthly));
        assert_eq!("Раз в полгода".parse::<RepeatInterval>(), Ok(RepeatInterval::SemiAnnual));
        assert_eq!(
            "fortnightly".parse::<RepeatInterval>(),
            Err(RecurrenceError::InvalidInterval("fortnightly".into()))
        );
        assert!("".parse::<RepeatInterval>().is_err());
    }

    #[test]
    fn it_computes_fixed_length_intervals() {
        let t = moscow(2025, 6, 1, 9, 0);
        assert_eq!(
            next_occurrence(t, RepeatInterval::Daily).unwrap(),
            moscow(2025, 6, 2, 9, 0)
        );
        assert_eq!(
            next_occurrence(t, RepeatInterval::Weekly).unwrap(),
            moscow(2025, 6, 8, 9, 0)
        );
    }

    #[test]
    fn it_clamps_month_end() {
        assert_eq!(
            next_occurrence(moscow(2024, 1, 31, 9, 0), RepeatInterval::Monthly).unwrap(),
            moscow(2024, 2, 29, 9, 0)
        );
        assert_eq!(
            next_occurrence(moscow(2023, 1, 31, 9, 0), RepeatInterval::Monthly).unwrap(),
            moscow(2023, 2, 28, 9, 0)
        );
        assert_eq!(
            next_occurrence(moscow(2024, 8, 31, 12, 30), RepeatInterval::SemiAnnual).unwrap(),
            moscow(2025, 2, 28, 12, 30)
        );
        assert_eq!(
            next_occurrence(moscow(2024, 2, 29, 8, 0), RepeatInterval::Yearly).unwrap(),
            moscow(2025, 2, 28, 8, 0)
        );
    }

    #[test]
    fn it_is_strictly_increasing_by_one_period() {
        let starts = [
            moscow(2024, 1, 15, 0, 0),
            moscow(2023, 12, 31, 23, 59),
            moscow(2025, 6, 1, 9, 0),
        ];
        for t in starts {
            for interval in RepeatInterval::ALL {
                let first = next_occurrence(t, interval).unwrap();
                let second = next_occurrence(first, interval).unwrap();
                assert!(first > t);
                assert!(second > first);
                match interval {
                    RepeatInterval::Daily => assert_eq!(second - first, Duration::days(1)),
                    RepeatInterval::Weekly => assert_eq!(second - first, Duration::days(7)),
                    _ => {
                        let months = interval.calendar_months().unwrap();
                        assert_eq!(
                            second.date_naive(),
                            add_months(first.date_naive(), months).unwrap()
                        );
                        assert_eq!(second.time(), first.time());
                    }
                }
            }
        }
    }

    #[test]
    fn it_keeps_local_time_across_dst() {
        // Oslo switches to summer time on 2025-03-30
        let t = Oslo.with_ymd_and_hms(2025, 3, 29, 9, 0, 0).unwrap();
        let next = next_occurrence(t, RepeatInterval::Daily).unwrap();
        assert_eq!(next, Oslo.with_ymd_and_hms(2025, 3, 30, 9, 0, 0).unwrap());
        assert_eq!(next - t, Duration::hours(23));
    }

    #[test]
    fn it_rejects_overflow() {
        let near_max = NaiveDateTime::MAX - Duration::hours(5);
        let t = Moscow.from_utc_datetime(&near_max);
        assert_eq!(
            next_occurrence(t, RepeatInterval::Yearly),
            Err(RecurrenceError::OutOfRange)
        );
    }
}
