use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive instant range with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl DateRange {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_ms: start.timestamp_millis(),
            end_ms: end.timestamp_millis(),
        }
    }

    #[must_use]
    pub const fn from_millis(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Range length in milliseconds; negative for a degenerate range.
    #[must_use]
    pub const fn length_ms(self) -> i64 {
        self.end_ms - self.start_ms
    }

    #[must_use]
    pub const fn is_degenerate(self) -> bool {
        self.end_ms < self.start_ms
    }
}

/// Horizontal extent of the scroll container, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u32) -> Self {
        Self { width }
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.width > 0
    }

    #[must_use]
    pub fn width_px(self) -> f64 {
        f64::from(self.width)
    }
}

/// Position of a day inside the configured week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekdayPosition {
    First,
    Between,
    Last,
}

/// Weekday numbering used across the crate: 1 = Sunday .. 7 = Saturday.
pub const SUNDAY: u8 = 1;
pub const SATURDAY: u8 = 7;

#[must_use]
pub(crate) fn utc_from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Weekday of `at_ms` under a fixed local offset, as 1..=7 with 1 = Sunday.
#[must_use]
pub(crate) fn local_weekday(at_ms: i64, offset_minutes: i32) -> u8 {
    let local = utc_from_ms(at_ms + i64::from(offset_minutes) * 60_000);
    local.weekday().num_days_from_sunday() as u8 + 1
}

/// Local hour-of-day of `at_ms` under a fixed local offset.
#[must_use]
pub(crate) fn local_hour(at_ms: i64, offset_minutes: i32) -> u8 {
    let local = utc_from_ms(at_ms + i64::from(offset_minutes) * 60_000);
    local.hour() as u8
}

#[must_use]
pub(crate) const fn next_weekday(weekday: u8) -> u8 {
    if weekday >= SATURDAY { SUNDAY } else { weekday + 1 }
}

#[must_use]
pub(crate) const fn is_weekend(weekday: u8) -> bool {
    weekday == SUNDAY || weekday == SATURDAY
}

#[must_use]
pub fn weekday_position(weekday: u8, first_day_of_week: u8) -> WeekdayPosition {
    if weekday == first_day_of_week {
        WeekdayPosition::First
    } else if next_weekday(weekday) == first_day_of_week {
        WeekdayPosition::Last
    } else {
        WeekdayPosition::Between
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_range_has_negative_length() {
        let range = DateRange::from_millis(10, 5);
        assert!(range.is_degenerate());
        assert_eq!(range.length_ms(), -5);
    }

    #[test]
    fn weekday_wraps_saturday_to_sunday() {
        assert_eq!(next_weekday(SATURDAY), SUNDAY);
        assert_eq!(next_weekday(3), 4);
    }

    #[test]
    fn weekday_position_honors_first_day_of_week() {
        // Monday-first week: Monday (2) opens it, Sunday (1) closes it.
        assert_eq!(weekday_position(2, 2), WeekdayPosition::First);
        assert_eq!(weekday_position(1, 2), WeekdayPosition::Last);
        assert_eq!(weekday_position(5, 2), WeekdayPosition::Between);
    }

    #[test]
    fn local_weekday_shifts_by_offset() {
        // 1970-01-01 was a Thursday (5); minus two hours lands on Wednesday.
        assert_eq!(local_weekday(0, 0), 5);
        assert_eq!(local_weekday(0, -120), 4);
    }
}
