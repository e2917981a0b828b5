use crate::core::dst::{DstResolver, UtcOffsetSource};
use crate::core::types::utc_from_ms;

/// Applies the DST crossing rule to a naive boundary (`cursor + interval`).
///
/// A fall-back crossing makes the naive step under-shoot real elapsed
/// wall-clock time, a spring-forward crossing makes it over-shoot; in both
/// cases the boundary is moved by the yearly adjustment so it stays pinned to
/// the same local wall-clock hour.
#[must_use]
pub const fn correct_boundary(
    previous_was_dst: bool,
    boundary_is_dst: bool,
    raw_boundary_ms: i64,
    adjustment_ms: i64,
) -> i64 {
    match (previous_was_dst, boundary_is_dst) {
        (true, false) => raw_boundary_ms + adjustment_ms,
        (false, true) => raw_boundary_ms - adjustment_ms,
        _ => raw_boundary_ms,
    }
}

/// Advances block boundaries by nominal intervals, keeping corrected
/// boundaries monotonic and non-overlapping across any number of DST
/// transitions.
#[derive(Debug)]
pub struct DstStepper<'a, S: UtcOffsetSource + ?Sized> {
    resolver: DstResolver<'a, S>,
}

impl<'a, S: UtcOffsetSource + ?Sized> DstStepper<'a, S> {
    #[must_use]
    pub fn new(resolver: DstResolver<'a, S>) -> Self {
        Self { resolver }
    }

    /// Corrects `raw_boundary_ms` and returns the boundary's DST flag, which
    /// the caller carries into the next step as `previous_was_dst`.
    ///
    /// The flag is classified at the naive boundary; the correction never
    /// moves the instant back across the transition for adjustments smaller
    /// than the step interval, so the corrected instant classifies the same.
    #[must_use]
    pub fn step(&self, previous_was_dst: bool, raw_boundary_ms: i64) -> (i64, bool) {
        let at = utc_from_ms(raw_boundary_ms);
        let boundary_is_dst = self.resolver.is_daylight_saving(at);
        let adjustment_ms = self.resolver.adjustment_ms(at);
        (
            correct_boundary(
                previous_was_dst,
                boundary_is_dst,
                raw_boundary_ms,
                adjustment_ms,
            ),
            boundary_is_dst,
        )
    }
}
