use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use timeline_rs::core::{
    DateRange, DstResolver, MS_PER_DAY, MS_PER_HOUR, Resolution, TileInput, tile,
};
use timeline_rs::locale::TzLocale;

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("valid instant")
}

fn local_ms(zone: Tz, year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> i64 {
    zone.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("unambiguous local instant")
        .timestamp_millis()
}

#[test]
fn berlin_resolver_classifies_seasons_and_magnitude() {
    let locale = TzLocale::new(chrono_tz::Europe::Berlin);
    let resolver = DstResolver::new(&locale);

    assert!(resolver.is_daylight_saving(utc(2021, 6, 15, 12, 0, 0)));
    assert!(!resolver.is_daylight_saving(utc(2021, 1, 15, 12, 0, 0)));
    assert_eq!(resolver.adjustment_ms(utc(2021, 6, 15, 12, 0, 0)), MS_PER_HOUR);
    assert_eq!(resolver.adjustment_ms(utc(2021, 1, 15, 12, 0, 0)), MS_PER_HOUR);
}

#[test]
fn southern_hemisphere_classification_is_inverted() {
    let locale = TzLocale::new(chrono_tz::Australia::Sydney);
    let resolver = DstResolver::new(&locale);

    assert!(resolver.is_daylight_saving(utc(2021, 1, 15, 12, 0, 0)));
    assert!(!resolver.is_daylight_saving(utc(2021, 6, 15, 12, 0, 0)));
    assert_eq!(resolver.adjustment_ms(utc(2021, 1, 15, 12, 0, 0)), MS_PER_HOUR);
}

#[test]
fn zone_without_dst_never_classifies_and_has_zero_adjustment() {
    let locale = TzLocale::new(chrono_tz::Asia::Tokyo);
    let resolver = DstResolver::new(&locale);

    assert_eq!(resolver.adjustment_ms(utc(2021, 6, 15, 12, 0, 0)), 0);
    assert!(!resolver.is_daylight_saving(utc(2021, 6, 15, 12, 0, 0)));
    assert!(!resolver.is_daylight_saving(utc(2021, 1, 15, 12, 0, 0)));
}

#[test]
fn day_blocks_stay_on_local_midnight_across_spring_forward() {
    let zone = chrono_tz::Europe::Berlin;
    let locale = TzLocale::new(zone);
    // Three days around the 2021-03-28 spring-forward transition.
    let input = TileInput {
        resolution: Resolution::Day,
        range: DateRange::from_millis(
            local_ms(zone, 2021, 3, 27, 0, 0, 0),
            local_ms(zone, 2021, 3, 29, 23, 59, 59),
        ),
        first_day_of_week: 1,
        first_hour_of_range: 0,
    };
    let tiling = tile(&locale, &input);

    assert_eq!(tiling.result.leaf_count, 3);
    // The boundary that crosses the transition is pulled back exactly one
    // hour relative to the naive 24h step.
    let naive_step = tiling.leaves[1].start_ms + MS_PER_DAY;
    assert_eq!(tiling.leaves[2].start_ms, naive_step - MS_PER_HOUR);
    // Every leaf remains pinned to local midnight.
    for (leaf, day) in tiling.leaves.iter().zip([27u32, 28, 29]) {
        assert_eq!(leaf.start_ms, local_ms(zone, 2021, 3, day, 0, 0, 0));
    }
}

#[test]
fn day_blocks_stay_on_local_midnight_across_fall_back() {
    let zone = chrono_tz::Europe::Berlin;
    let locale = TzLocale::new(zone);
    // Three days around the 2021-10-31 fall-back transition.
    let input = TileInput {
        resolution: Resolution::Day,
        range: DateRange::from_millis(
            local_ms(zone, 2021, 10, 30, 0, 0, 0),
            local_ms(zone, 2021, 11, 1, 23, 59, 59),
        ),
        first_day_of_week: 1,
        first_hour_of_range: 0,
    };
    let tiling = tile(&locale, &input);

    assert_eq!(tiling.result.leaf_count, 3);
    let naive_step = tiling.leaves[1].start_ms + MS_PER_DAY;
    assert_eq!(tiling.leaves[2].start_ms, naive_step + MS_PER_HOUR);
    assert_eq!(
        tiling.leaves[2].start_ms,
        local_ms(zone, 2021, 11, 1, 0, 0, 0)
    );
}

#[test]
fn multi_transition_range_keeps_boundaries_monotonic_and_aligned() {
    let zone = chrono_tz::Europe::Berlin;
    let locale = TzLocale::new(zone);
    // A full year crossing both transitions.
    let input = TileInput {
        resolution: Resolution::Day,
        range: DateRange::from_millis(
            local_ms(zone, 2021, 1, 1, 0, 0, 0),
            local_ms(zone, 2021, 12, 31, 23, 59, 59),
        ),
        first_day_of_week: 1,
        first_hour_of_range: 0,
    };
    let tiling = tile(&locale, &input);

    assert_eq!(tiling.result.leaf_count, 365);
    for pair in tiling.leaves.windows(2) {
        let gap = pair[1].start_ms - pair[0].start_ms;
        assert!(gap == MS_PER_DAY || gap == MS_PER_DAY - MS_PER_HOUR || gap == MS_PER_DAY + MS_PER_HOUR);
    }
    // Month runs line up with the civil calendar despite the transitions.
    assert_eq!(
        tiling.month_row.lengths(),
        vec![31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    );
}

#[test]
fn hour_resolution_surfaces_short_and_long_days_in_the_day_row() {
    let zone = chrono_tz::Europe::Berlin;
    let locale = TzLocale::new(zone);
    // 2021-03-27 .. 2021-03-29 at hour resolution: the middle day has 23
    // wall-clock hours.
    let input = TileInput {
        resolution: Resolution::Hour,
        range: DateRange::from_millis(
            local_ms(zone, 2021, 3, 27, 0, 0, 0),
            local_ms(zone, 2021, 3, 29, 23, 59, 59),
        ),
        first_day_of_week: 1,
        first_hour_of_range: 0,
    };
    let tiling = tile(&locale, &input);

    let day_row = tiling.day_row.as_ref().expect("hour resolution day row");
    assert_eq!(day_row.lengths(), vec![24, 23, 24]);
    assert_eq!(tiling.result.leaf_count, 71);
    // A DST-shortened middle day is not a range-boundary short block.
    assert_eq!(tiling.result.first_short_length, 0);
    assert_eq!(tiling.result.last_short_length, 0);
}
