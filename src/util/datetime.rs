use chrono::{Local, Months, NaiveDateTime};

/// Converts a wall-clock time to Unix seconds as if it were UTC.
///
/// The history endpoint is fed local time without an offset, so a caller in
/// UTC+8 asks for a window eight hours later than the real instant.
pub fn to_unix_timestamp(date_time: NaiveDateTime) -> i64 {
    date_time.and_utc().timestamp()
}

/// 過去一年的查詢區間 (period1, period2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

impl Window {
    /// [now − 12 months, now]
    pub fn one_year_until(now: NaiveDateTime) -> Self {
        let start = now.checked_sub_months(Months::new(12)).unwrap_or(now);

        Window {
            start: to_unix_timestamp(start),
            end: to_unix_timestamp(now),
        }
    }

    pub fn one_year_until_now() -> Self {
        Self::one_year_until(Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const SECONDS_PER_YEAR: i64 = 31_536_000;
    const SECONDS_PER_DAY: i64 = 86_400;

    #[test]
    fn test_to_unix_timestamp() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(to_unix_timestamp(epoch), SECONDS_PER_DAY);

        let dt = NaiveDate::from_ymd_opt(2023, 3, 25)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(to_unix_timestamp(dt), 1_679_745_600);
    }

    #[test]
    fn test_one_year_window_span() {
        let window = Window::one_year_until_now();
        let span = window.end - window.start;

        assert!(
            (span - SECONDS_PER_YEAR).abs() <= 2 * SECONDS_PER_DAY,
            "unexpected span {}",
            span
        );
    }

    #[test]
    fn test_one_year_window_leap_year() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let window = Window::one_year_until(now);

        assert_eq!(window.end, to_unix_timestamp(now));
        assert_eq!(window.end - window.start, SECONDS_PER_YEAR + SECONDS_PER_DAY);
    }

    #[test]
    fn test_one_year_window_end_of_february() {
        let now = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let window = Window::one_year_until(now);
        let expected = NaiveDate::from_ymd_opt(2023, 2, 28)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(window.start, to_unix_timestamp(expected));
    }
}
