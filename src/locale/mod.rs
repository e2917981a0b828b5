//! Locale and timezone capability consumed by the tiling core.
//!
//! The core depends only on `offset_minutes`, `first_day_of_week`, and
//! `format_date`; the name tables and clock flag are pass-through display
//! data for hosts rendering the produced rows.

use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::core::dst::UtcOffsetSource;
use crate::error::{TimelineError, TimelineResult};

/// Label patterns the core asks a locale to format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePattern {
    Year,
    MonthOfYear,
    DayOfMonth,
    IsoDate,
    HourOfDay,
}

/// Locale/timezone capability of the host.
pub trait CalendarLocale: UtcOffsetSource {
    fn month_names(&self) -> [&str; 12];

    /// Weekday display names starting from Sunday.
    fn weekday_names(&self) -> [&str; 7];

    /// First day of the configured week, 1..=7 with 1 = Sunday.
    fn first_day_of_week(&self) -> u8;

    fn format_date(&self, at: DateTime<Utc>, pattern: DatePattern) -> String;

    fn is_twelve_hour_clock(&self) -> bool;

    fn time_zone_id(&self) -> &str;
}

/// Display data forwarded to hosts in one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleBundle {
    pub month_names: Vec<String>,
    pub weekday_names: Vec<String>,
    pub first_day_of_week: u8,
    pub twelve_hour_clock: bool,
    pub time_zone_id: String,
}

impl LocaleBundle {
    #[must_use]
    pub fn from_locale<L: CalendarLocale + ?Sized>(locale: &L) -> Self {
        Self {
            month_names: locale.month_names().map(str::to_owned).to_vec(),
            weekday_names: locale.weekday_names().map(str::to_owned).to_vec(),
            first_day_of_week: locale.first_day_of_week(),
            twelve_hour_clock: locale.is_twelve_hour_clock(),
            time_zone_id: locale.time_zone_id().to_owned(),
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// IANA-zone-backed locale with English name tables.
#[derive(Debug, Clone)]
pub struct TzLocale {
    zone: chrono_tz::Tz,
    zone_id: String,
    first_day_of_week: u8,
    twelve_hour_clock: bool,
}

impl TzLocale {
    #[must_use]
    pub fn new(zone: chrono_tz::Tz) -> Self {
        Self {
            zone_id: zone.name().to_owned(),
            zone,
            first_day_of_week: crate::core::types::SUNDAY,
            twelve_hour_clock: false,
        }
    }

    pub fn with_first_day_of_week(mut self, first_day_of_week: u8) -> TimelineResult<Self> {
        if !(1..=7).contains(&first_day_of_week) {
            return Err(TimelineError::InvalidConfig(format!(
                "first day of week must be in 1..=7, got {first_day_of_week}"
            )));
        }
        self.first_day_of_week = first_day_of_week;
        Ok(self)
    }

    #[must_use]
    pub fn with_twelve_hour_clock(mut self, twelve_hour_clock: bool) -> Self {
        self.twelve_hour_clock = twelve_hour_clock;
        self
    }
}

impl UtcOffsetSource for TzLocale {
    fn offset_minutes(&self, at: DateTime<Utc>) -> i32 {
        self.zone
            .offset_from_utc_datetime(&at.naive_utc())
            .fix()
            .local_minus_utc()
            / 60
    }
}

impl CalendarLocale for TzLocale {
    fn month_names(&self) -> [&str; 12] {
        MONTH_NAMES
    }

    fn weekday_names(&self) -> [&str; 7] {
        WEEKDAY_NAMES
    }

    fn first_day_of_week(&self) -> u8 {
        self.first_day_of_week
    }

    fn format_date(&self, at: DateTime<Utc>, pattern: DatePattern) -> String {
        let local = at.with_timezone(&self.zone);
        match pattern {
            DatePattern::Year => local.year().to_string(),
            DatePattern::MonthOfYear => MONTH_NAMES[local.month0() as usize].to_owned(),
            DatePattern::DayOfMonth => local.day().to_string(),
            DatePattern::IsoDate => local.format("%Y-%m-%d").to_string(),
            DatePattern::HourOfDay => {
                if self.twelve_hour_clock {
                    local.format("%l %p").to_string().trim().to_owned()
                } else {
                    local.hour().to_string()
                }
            }
        }
    }

    fn is_twelve_hour_clock(&self) -> bool {
        self.twelve_hour_clock
    }

    fn time_zone_id(&self) -> &str {
        &self.zone_id
    }
}
