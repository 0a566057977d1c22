use chrono::prelude::*;
use chrono::{Duration, LocalResult};
use chrono_tz::Tz;

/// Input format accepted for reminder datetimes, interpreted in the deployment zone
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Adds calendar months to a date. When the target month is shorter than the
/// day of month of `date` the day is clamped to the last day of that month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(get_month_length(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Maps a wall clock time in `tz` to an instant.
///
/// Ambiguous times (clocks turned back) resolve to the earliest instant and
/// times inside a gap (clocks turned forward) are shifted forward by one hour.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

pub fn parse_local_datetime(input: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(input.trim(), LOCAL_DATETIME_FORMAT)
        .ok()
        .map(|naive| resolve_local(tz, naive).with_timezone(&Utc))
}

pub fn format_local_datetime(dt: &DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format(LOCAL_DATETIME_FORMAT).to_string()
}

/// Start of the local calendar month `months_back` months before the month of `now`
pub fn start_of_month(now: DateTime<Utc>, months_back: u32, tz: &Tz) -> DateTime<Utc> {
    let local = now.with_timezone(tz).date_naive();
    let total = i64::from(local.year()) * 12 + i64::from(local.month0()) - i64::from(months_back);
    let first = i32::try_from(total.div_euclid(12))
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, total.rem_euclid(12) as u32 + 1, 1))
        .unwrap_or(NaiveDate::MIN);
    resolve_local(tz, first.and_time(NaiveTime::MIN)).with_timezone(&Utc)
}

/// The local calendar day, in a fixed zone, that contains an instant.
///
/// Both bounds are inclusive: `end` is one microsecond before the next local
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn containing(now: DateTime<Utc>, tz: &Tz) -> Self {
        let today = now.with_timezone(tz).date_naive();
        let start = resolve_local(tz, today.and_time(NaiveTime::MIN)).with_timezone(&Utc);
        let end = match today.succ_opt() {
            Some(tomorrow) => {
                resolve_local(tz, tomorrow.and_time(NaiveTime::MIN)).with_timezone(&Utc)
                    - Duration::microseconds(1)
            }
            None => DateTime::<Utc>::MAX_UTC,
        };
        Self { start, end }
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono_tz::Europe::Moscow;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn it_knows_month_lengths() {
        assert_eq!(get_month_length(2024, 2), 29);
        assert_eq!(get_month_length(2023, 2), 28);
        assert_eq!(get_month_length(1900, 2), 28);
        assert_eq!(get_month_length(2000, 2), 29);
        assert_eq!(get_month_length(2023, 4), 30);
        assert_eq!(get_month_length(2023, 12), 31);
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
        assert_eq!(add_months(date(2023, 8, 31), 6), Some(date(2024, 2, 29)));
        assert_eq!(add_months(date(2023, 11, 15), 2), Some(date(2024, 1, 15)));
        assert_eq!(add_months(date(2024, 2, 29), 12), Some(date(2025, 2, 28)));
    }

    #[test]
    fn it_parses_local_datetimes() {
        let dt = parse_local_datetime("2025-06-01 09:00", &Moscow).unwrap();
        // Moscow is UTC+3 all year
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap());
        assert_eq!(format_local_datetime(&dt, &Moscow), "2025-06-01 09:00");

        assert!(parse_local_datetime("2025-06-01", &Moscow).is_none());
        assert!(parse_local_datetime("2025-13-01 09:00", &Moscow).is_none());
        assert!(parse_local_datetime("tomorrow", &Moscow).is_none());
    }

    #[test]
    fn day_window_covers_the_local_day() {
        // 23:30 UTC on May 31st is already June 1st in Moscow
        let now = Utc.with_ymd_and_hms(2025, 5, 31, 23, 30, 0).unwrap();
        let window = DayWindow::containing(now, &Moscow);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 5, 31, 21, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(2025, 6, 1, 21, 0, 0).unwrap() - Duration::microseconds(1)
        );
        assert!(window.contains(&now));
        assert!(window.contains(&window.start));
        assert!(window.contains(&window.end));
        assert!(!window.contains(&(window.start - Duration::microseconds(1))));
        assert!(!window.contains(&(window.end + Duration::microseconds(1))));
    }

    #[test]
    fn it_finds_start_of_month() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap();
        assert_eq!(
            start_of_month(now, 0, &Moscow),
            Utc.with_ymd_and_hms(2025, 2, 28, 21, 0, 0).unwrap()
        );
        assert_eq!(
            start_of_month(now, 3, &Moscow),
            Utc.with_ymd_and_hms(2024, 11, 30, 21, 0, 0).unwrap()
        );
    }

    #[test]
    fn it_resolves_dst_gaps_forward() {
        let tz: Tz = "Europe/Oslo".parse().unwrap();
        // 2025-03-30 02:30 does not exist in Oslo
        let naive = date(2025, 3, 30).and_hms_opt(2, 30, 0).unwrap();
        let resolved = resolve_local(&tz, naive);
        assert_eq!(resolved.naive_local(), date(2025, 3, 30).and_hms_opt(3, 30, 0).unwrap());
    }
}
