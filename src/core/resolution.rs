use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;

pub const MS_PER_HOUR: i64 = 3_600_000;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
pub const HOURS_PER_DAY: u8 = 24;
pub const DAYS_PER_WEEK: u8 = 7;

/// Rendering resolution of the timeline.
///
/// Selects the nominal leaf interval (one hour or one day) and whether leaf
/// blocks are grouped seven at a time into week units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Hour,
    Day,
    Week,
}

impl Resolution {
    /// Nominal wall-clock length of one leaf block.
    #[must_use]
    pub const fn leaf_interval_ms(self) -> i64 {
        match self {
            Self::Hour => MS_PER_HOUR,
            Self::Day | Self::Week => MS_PER_DAY,
        }
    }

    /// Leaf blocks grouped into one resolution block.
    #[must_use]
    pub const fn leaves_per_block(self) -> u8 {
        match self {
            Self::Week => DAYS_PER_WEEK,
            Self::Hour | Self::Day => 1,
        }
    }

    /// The day aggregation row exists only at hour resolution.
    #[must_use]
    pub const fn has_day_row(self) -> bool {
        matches!(self, Self::Hour)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Week => "Week",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = TimelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Hour" | "hour" => Ok(Self::Hour),
            "Day" | "day" => Ok(Self::Day),
            "Week" | "week" => Ok(Self::Week),
            other => Err(TimelineError::UnsupportedResolution(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        for resolution in [Resolution::Hour, Resolution::Day, Resolution::Week] {
            let parsed: Resolution = resolution.as_str().parse().expect("known name");
            assert_eq!(parsed, resolution);
        }
    }

    #[test]
    fn unknown_resolution_name_is_rejected() {
        let parsed = "Month".parse::<Resolution>();
        assert!(matches!(
            parsed,
            Err(TimelineError::UnsupportedResolution(name)) if name == "Month"
        ));
    }

    #[test]
    fn leaf_intervals_and_grouping() {
        assert_eq!(Resolution::Hour.leaf_interval_ms(), MS_PER_HOUR);
        assert_eq!(Resolution::Day.leaf_interval_ms(), MS_PER_DAY);
        assert_eq!(Resolution::Week.leaf_interval_ms(), MS_PER_DAY);
        assert_eq!(Resolution::Week.leaves_per_block(), 7);
        assert!(Resolution::Hour.has_day_row());
        assert!(!Resolution::Week.has_day_row());
    }
}
