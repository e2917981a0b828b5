use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::dst::DstResolver;
use crate::core::resolution::{HOURS_PER_DAY, Resolution};
use crate::core::stepper::DstStepper;
use crate::core::types::{self, DateRange, WeekdayPosition, utc_from_ms};
use crate::locale::{CalendarLocale, DatePattern};

/// One run of adjacent leaf blocks sharing a formatted label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowEntry {
    pub label: String,
    pub length: u32,
}

/// Ordered run-length mapping of an aggregation row (year, month, day).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationRow {
    entries: IndexMap<String, RowEntry>,
}

impl AggregationRow {
    /// Extends the open run when `key` matches it, otherwise opens a new run.
    fn append(&mut self, key: &str, label: &str) {
        if let Some(index) = self.entries.len().checked_sub(1)
            && let Some((open_key, entry)) = self.entries.get_index_mut(index)
            && open_key == key
        {
            entry.length += 1;
            return;
        }
        self.entries.insert(
            key.to_owned(),
            RowEntry {
                label: label.to_owned(),
                length: 1,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&str, &RowEntry)> {
        self.entries
            .get_index(index)
            .map(|(key, entry)| (key.as_str(), entry))
    }

    /// Run lengths in row order.
    #[must_use]
    pub fn lengths(&self) -> Vec<u32> {
        self.entries.values().map(|entry| entry.length).collect()
    }

    /// Sum of run lengths; equals the tiling leaf count by construction.
    #[must_use]
    pub fn total_leaves(&self) -> u64 {
        self.entries
            .values()
            .map(|entry| u64::from(entry.length))
            .sum()
    }
}

/// Totals and short-block bookkeeping of one tiling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TilingResult {
    pub leaf_count: u32,
    pub resolution_block_count: u32,
    pub first_short_length: u32,
    pub last_short_length: u32,
}

/// One leaf block (an hour or a day) of the tiled range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafBlock {
    pub start_ms: i64,
    /// 1 = Sunday .. 7 = Saturday.
    pub weekday: u8,
    pub position: WeekdayPosition,
    pub weekend: bool,
    pub label: String,
}

/// Inputs of one tiling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileInput {
    pub resolution: Resolution,
    pub range: DateRange,
    /// 1 = Sunday .. 7 = Saturday.
    pub first_day_of_week: u8,
    /// Local hour-of-day of the range start.
    pub first_hour_of_range: u8,
}

/// Full logical structure of a tiled range, rebuilt from scratch on every
/// range, resolution, or locale change.
#[derive(Debug, Clone, PartialEq)]
pub struct Tiling {
    pub resolution: Resolution,
    pub range: DateRange,
    pub leaves: Vec<LeafBlock>,
    pub year_row: AggregationRow,
    pub month_row: AggregationRow,
    pub day_row: Option<AggregationRow>,
    pub result: TilingResult,
    pub normal_start_ms: i64,
    pub normal_end_ms: i64,
}

impl Tiling {
    fn empty<L: CalendarLocale + ?Sized>(input: &TileInput, resolver: &DstResolver<'_, L>) -> Self {
        Self {
            resolution: input.resolution,
            range: input.range,
            leaves: Vec::new(),
            year_row: AggregationRow::default(),
            month_row: AggregationRow::default(),
            day_row: input.resolution.has_day_row().then(AggregationRow::default),
            result: TilingResult::default(),
            normal_start_ms: resolver.normal_date_ms(input.range.start_ms),
            normal_end_ms: resolver.normal_date_ms(input.range.end_ms),
        }
    }
}

/// Mutable counters threaded through the leaf walk; updated by the active
/// resolution strategy, never captured by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TileCursor {
    pub weekday: u8,
    pub hour: u8,
}

pub(crate) trait ResolutionStrategy {
    fn leaf_pattern(&self) -> DatePattern;

    /// Day-based steps correct for DST crossings; hourly steps tick uniform
    /// real time and surface 23/25-hour days in the day row instead.
    fn uses_dst_correction(&self) -> bool;

    fn advance(&self, cursor: TileCursor) -> TileCursor;
}

struct HourStrategy;
struct DayStrategy;
struct WeekStrategy;

impl ResolutionStrategy for HourStrategy {
    fn leaf_pattern(&self) -> DatePattern {
        DatePattern::HourOfDay
    }

    fn uses_dst_correction(&self) -> bool {
        false
    }

    fn advance(&self, cursor: TileCursor) -> TileCursor {
        let hour = (cursor.hour + 1) % HOURS_PER_DAY;
        let weekday = if hour == 0 {
            types::next_weekday(cursor.weekday)
        } else {
            cursor.weekday
        };
        TileCursor { weekday, hour }
    }
}

impl ResolutionStrategy for DayStrategy {
    fn leaf_pattern(&self) -> DatePattern {
        DatePattern::DayOfMonth
    }

    fn uses_dst_correction(&self) -> bool {
        true
    }

    fn advance(&self, cursor: TileCursor) -> TileCursor {
        TileCursor {
            weekday: types::next_weekday(cursor.weekday),
            hour: cursor.hour,
        }
    }
}

impl ResolutionStrategy for WeekStrategy {
    fn leaf_pattern(&self) -> DatePattern {
        DatePattern::DayOfMonth
    }

    fn uses_dst_correction(&self) -> bool {
        true
    }

    fn advance(&self, cursor: TileCursor) -> TileCursor {
        TileCursor {
            weekday: types::next_weekday(cursor.weekday),
            hour: cursor.hour,
        }
    }
}

pub(crate) fn strategy_for(resolution: Resolution) -> &'static dyn ResolutionStrategy {
    match resolution {
        Resolution::Hour => &HourStrategy,
        Resolution::Day => &DayStrategy,
        Resolution::Week => &WeekStrategy,
    }
}

/// Tiles `input.range` into leaf blocks and run-length aggregated rows.
///
/// Degenerate ranges (`end < start`) produce an empty tiling with a zero
/// leaf count.
pub fn tile<L: CalendarLocale + ?Sized>(locale: &L, input: &TileInput) -> Tiling {
    let resolver = DstResolver::new(locale);
    if input.range.is_degenerate() {
        return Tiling::empty(input, &resolver);
    }
    let stepper = DstStepper::new(resolver);
    let strategy = strategy_for(input.resolution);
    let interval = input.resolution.leaf_interval_ms();

    let mut cursor_ms = input.range.start_ms;
    let mut previous_was_dst = resolver.is_daylight_saving(utc_from_ms(cursor_ms));
    let mut cursor = TileCursor {
        weekday: types::local_weekday(cursor_ms, locale.offset_minutes(utc_from_ms(cursor_ms))),
        hour: input.first_hour_of_range,
    };

    let mut leaves = Vec::new();
    let mut year_row = AggregationRow::default();
    let mut month_row = AggregationRow::default();
    let mut day_row = input.resolution.has_day_row().then(AggregationRow::default);

    loop {
        let at = utc_from_ms(cursor_ms);
        let year_label = locale.format_date(at, DatePattern::Year);
        let month_label = locale.format_date(at, DatePattern::MonthOfYear);
        let month_key = format!("{year_label}-{month_label}");
        year_row.append(&year_label, &year_label);
        month_row.append(&month_key, &month_label);
        if let Some(row) = day_row.as_mut() {
            let day_key = locale.format_date(at, DatePattern::IsoDate);
            let day_label = locale.format_date(at, DatePattern::DayOfMonth);
            row.append(&day_key, &day_label);
        }
        leaves.push(LeafBlock {
            start_ms: cursor_ms,
            weekday: cursor.weekday,
            position: types::weekday_position(cursor.weekday, input.first_day_of_week),
            weekend: types::is_weekend(cursor.weekday),
            label: locale.format_date(at, strategy.leaf_pattern()),
        });

        if cursor_ms + interval > input.range.end_ms {
            break;
        }
        if strategy.uses_dst_correction() {
            let (next_ms, boundary_is_dst) = stepper.step(previous_was_dst, cursor_ms + interval);
            previous_was_dst = boundary_is_dst;
            cursor_ms = next_ms;
        } else {
            cursor_ms += interval;
        }
        cursor = strategy.advance(cursor);
    }

    let result = tiling_result(locale, input, &leaves, day_row.as_ref());
    Tiling {
        resolution: input.resolution,
        range: input.range,
        normal_start_ms: resolver.normal_date_ms(input.range.start_ms),
        normal_end_ms: resolver.normal_date_ms(input.range.end_ms),
        leaves,
        year_row,
        month_row,
        day_row,
        result,
    }
}

fn tiling_result<L: CalendarLocale + ?Sized>(
    locale: &L,
    input: &TileInput,
    leaves: &[LeafBlock],
    day_row: Option<&AggregationRow>,
) -> TilingResult {
    let leaf_count = leaves.len() as u32;
    match input.resolution {
        Resolution::Hour => {
            let runs = day_row.map(AggregationRow::lengths).unwrap_or_default();
            let starts_mid_unit = input.first_hour_of_range != 0;
            let ends_mid_unit = leaves.last().is_some_and(|leaf| {
                types::local_hour(
                    leaf.start_ms,
                    locale.offset_minutes(utc_from_ms(leaf.start_ms)),
                ) != HOURS_PER_DAY - 1
            });
            let (first_short_length, last_short_length) =
                boundary_short_lengths(&runs, starts_mid_unit, ends_mid_unit);
            TilingResult {
                leaf_count,
                resolution_block_count: leaf_count,
                first_short_length,
                last_short_length,
            }
        }
        // Day and Week both track week-aligned boundary shorts; they differ
        // only in what counts as a resolution block.
        Resolution::Day | Resolution::Week => {
            let runs = week_runs(leaves, input.first_day_of_week);
            let starts_mid_unit = leaves
                .first()
                .is_some_and(|leaf| leaf.weekday != input.first_day_of_week);
            let ends_mid_unit = leaves
                .last()
                .is_some_and(|leaf| types::next_weekday(leaf.weekday) != input.first_day_of_week);
            let (first_short_length, last_short_length) =
                boundary_short_lengths(&runs, starts_mid_unit, ends_mid_unit);
            let resolution_block_count = if input.resolution == Resolution::Week {
                runs.len() as u32
            } else {
                leaf_count
            };
            TilingResult {
                leaf_count,
                resolution_block_count,
                first_short_length,
                last_short_length,
            }
        }
    }
}

/// Leaf counts per week block, split at every first-day-of-week leaf.
fn week_runs(leaves: &[LeafBlock], first_day_of_week: u8) -> Vec<u32> {
    let mut runs: Vec<u32> = Vec::new();
    for (index, leaf) in leaves.iter().enumerate() {
        if index == 0 || leaf.weekday == first_day_of_week {
            runs.push(0);
        }
        if let Some(open) = runs.last_mut() {
            *open += 1;
        }
    }
    runs
}

/// First/last short lengths out of per-unit run lengths. A lone partial run
/// counts as the first short when the range starts mid-unit, as the last
/// short otherwise.
fn boundary_short_lengths(
    runs: &[u32],
    starts_mid_unit: bool,
    ends_mid_unit: bool,
) -> (u32, u32) {
    match runs {
        [] => (0, 0),
        [only] => {
            if starts_mid_unit {
                (*only, 0)
            } else if ends_mid_unit {
                (0, *only)
            } else {
                (0, 0)
            }
        }
        [first, .., last] => (
            if starts_mid_unit { *first } else { 0 },
            if ends_mid_unit { *last } else { 0 },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length_append_extends_matching_open_run_only() {
        let mut row = AggregationRow::default();
        row.append("2020-April", "April");
        row.append("2020-April", "April");
        row.append("2020-May", "May");
        row.append("2020-May", "May");
        row.append("2020-May", "May");

        assert_eq!(row.lengths(), vec![2, 3]);
        assert_eq!(row.total_leaves(), 5);
        let (key, entry) = row.get_index(1).expect("second run");
        assert_eq!(key, "2020-May");
        assert_eq!(entry.label, "May");
    }

    #[test]
    fn week_runs_split_on_first_day_of_week() {
        // Wednesday (4) through the Friday of the following week, Sunday-first.
        let leaves: Vec<LeafBlock> = [4u8, 5, 6, 7, 1, 2, 3, 4, 5, 6]
            .iter()
            .map(|&weekday| LeafBlock {
                start_ms: 0,
                weekday,
                position: types::weekday_position(weekday, 1),
                weekend: types::is_weekend(weekday),
                label: String::new(),
            })
            .collect();
        assert_eq!(week_runs(&leaves, 1), vec![4, 6]);
    }

    #[test]
    fn lone_partial_run_prefers_first_short_when_start_is_mid_unit() {
        assert_eq!(boundary_short_lengths(&[3], true, true), (3, 0));
        assert_eq!(boundary_short_lengths(&[3], false, true), (0, 3));
        assert_eq!(boundary_short_lengths(&[24], false, false), (0, 0));
    }

    #[test]
    fn multi_run_shorts_only_at_marked_boundaries() {
        assert_eq!(boundary_short_lengths(&[4, 7, 6], true, true), (4, 6));
        assert_eq!(boundary_short_lengths(&[7, 7], false, false), (0, 0));
        // A shortened middle unit (for example a 23-hour day) is not a
        // range-boundary short.
        assert_eq!(boundary_short_lengths(&[24, 23, 24], false, false), (0, 0));
    }
}
