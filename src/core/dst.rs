use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::core::types::utc_from_ms;

/// Offset capability consumed by the resolver: the local UTC offset of a
/// zoned instant in whole minutes, east of UTC positive.
pub trait UtcOffsetSource {
    fn offset_minutes(&self, at: DateTime<Utc>) -> i32;
}

/// Detects DST activity and its magnitude by sampling the zone offset on
/// January 1 and July 1 of an instant's local year.
///
/// Equal samples mean the zone observes no DST that year. Otherwise the
/// non-advanced sample is standard time, the difference is the yearly DST
/// adjustment, and an instant is DST-active exactly when its own sample is
/// the advanced one. Comparing the pair instead of fixing a season makes the
/// classification hold in both hemispheres.
#[derive(Debug)]
pub struct DstResolver<'a, S: UtcOffsetSource + ?Sized> {
    source: &'a S,
}

impl<S: UtcOffsetSource + ?Sized> Clone for DstResolver<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: UtcOffsetSource + ?Sized> Copy for DstResolver<'_, S> {}

impl<'a, S: UtcOffsetSource + ?Sized> DstResolver<'a, S> {
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    fn year_samples(&self, at: DateTime<Utc>) -> (i32, i32) {
        let offset = self.source.offset_minutes(at);
        let local_year = (at + Duration::minutes(i64::from(offset))).year();
        let january = utc_midnight(local_year, 1, 1);
        let july = utc_midnight(local_year, 7, 1);
        (
            self.source.offset_minutes(january),
            self.source.offset_minutes(july),
        )
    }

    /// DST magnitude of the instant's local year, in milliseconds.
    /// Zero when the zone observes no DST that year.
    #[must_use]
    pub fn adjustment_ms(&self, at: DateTime<Utc>) -> i64 {
        let (january, july) = self.year_samples(at);
        i64::from((july - january).abs()) * 60_000
    }

    #[must_use]
    pub fn is_daylight_saving(&self, at: DateTime<Utc>) -> bool {
        let (january, july) = self.year_samples(at);
        if january == july {
            return false;
        }
        self.source.offset_minutes(at) > january.min(july)
    }

    /// Adjustment in effect at `at`: the yearly magnitude when the instant is
    /// DST-active, zero otherwise.
    #[must_use]
    pub fn active_adjustment_ms(&self, at: DateTime<Utc>) -> i64 {
        if self.is_daylight_saving(at) {
            self.adjustment_ms(at)
        } else {
            0
        }
    }

    /// DST-neutral reference instant ("normal date") for boundary math.
    ///
    /// Removes the clock advance from a DST-active instant, so wall-clock
    /// aligned boundaries sit on a uniform grid regardless of season: a
    /// summer local midnight maps onto the same UTC hour as a winter one.
    #[must_use]
    pub fn normal_date_ms(&self, at_ms: i64) -> i64 {
        at_ms + self.active_adjustment_ms(utc_from_ms(at_ms))
    }
}

fn utc_midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
