use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::core::resolution::{MS_PER_DAY, MS_PER_HOUR, Resolution};
use crate::core::sizing::{PositionMap, RenderState, SizingMode};
use crate::core::tiler::{AggregationRow, TileInput, Tiling, TilingResult, tile};
use crate::core::types::{DateRange, Viewport, local_hour, utc_from_ms};
use crate::error::TimelineResult;
use crate::locale::{CalendarLocale, LocaleBundle};
use crate::render::{BlockSlot, RefillContext, RenderPhase, VirtualizationRenderer, pool_size};

use super::config::TimelineConfig;

/// Everything a host needs to paint the current timeline.
#[derive(Debug)]
pub struct TimelineFrame<'a> {
    pub year_row: &'a AggregationRow,
    pub year_row_visible: bool,
    pub month_row: &'a AggregationRow,
    pub month_row_visible: bool,
    pub day_row: Option<&'a AggregationRow>,
    pub slots: &'a [BlockSlot],
    pub row_offset_px: f64,
    pub render_state: RenderState,
    pub result: TilingResult,
}

/// Facade over the tiler, the width calculator, and the virtualization
/// renderer. All state is rebuilt from scratch on every structural change;
/// nothing is patched incrementally.
pub struct TimelineEngine<L: CalendarLocale> {
    locale: L,
    config: TimelineConfig,
    tiling: Option<Tiling>,
    position_map: Option<PositionMap>,
    render_state: RenderState,
    renderer: VirtualizationRenderer,
}

impl<L: CalendarLocale> TimelineEngine<L> {
    pub fn new(locale: L, config: TimelineConfig) -> TimelineResult<Self> {
        config.validate()?;
        Ok(Self {
            locale,
            render_state: RenderState::compute(
                config.sizing_mode,
                config.min_unit_width_px,
                config.viewport.width_px(),
                TilingResult::default(),
            ),
            config,
            tiling: None,
            position_map: None,
            renderer: VirtualizationRenderer::default(),
        })
    }

    /// Full rebuild of the tiling, sizing constants, and slot pool.
    ///
    /// A missing resolution, start, or end clears the current render and logs
    /// a diagnostic instead of failing.
    pub fn render(
        &mut self,
        resolution: Option<Resolution>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) {
        let (Some(resolution), Some(start), Some(end)) = (resolution, start, end) else {
            warn!(
                has_resolution = resolution.is_some(),
                has_start = start.is_some(),
                has_end = end.is_some(),
                "timeline render skipped: resolution, start date and end date are all required"
            );
            self.clear();
            return;
        };
        let range = DateRange::from_millis(
            self.snap_start_ms(resolution, start.timestamp_millis()),
            self.snap_end_ms(resolution, end.timestamp_millis(), false),
        );
        self.retile(resolution, range);
    }

    /// Recomputes sizing constants and pool sizing for a new container width.
    pub fn resize(&mut self, viewport_width_px: u32) {
        let viewport = Viewport::new(viewport_width_px);
        if !viewport.is_valid() {
            warn!(
                viewport_width_px,
                "resize ignored: viewport width must be > 0"
            );
            return;
        }
        self.config.viewport = viewport;
        if let Some(tiling) = self.tiling.take() {
            self.rebuild_from(tiling);
        } else {
            self.render_state = RenderState::compute(
                self.config.sizing_mode,
                self.config.min_unit_width_px,
                self.config.viewport.width_px(),
                TilingResult::default(),
            );
        }
    }

    /// Records a scroll offset and schedules the trailing-edge deferred
    /// refill. Repeating the current offset is a no-op.
    pub fn set_scroll_offset(&mut self, offset_px: f64, now: Instant) {
        if self.tiling.is_none() {
            debug!("scroll offset ignored: nothing is rendered");
            return;
        }
        self.render_state.scroll_offset_px = offset_px;
        self.renderer.on_scroll(offset_px, now);
    }

    /// Executes a due deferred refill, if any; returns whether one ran.
    pub fn pump(&mut self, now: Instant) -> bool {
        let (Some(tiling), Some(map)) = (&self.tiling, &self.position_map) else {
            return false;
        };
        let ctx = RefillContext {
            source: &self.locale,
            tiling,
            map,
            state: &self.render_state,
        };
        self.renderer.poll(now, &ctx)
    }

    /// Pixel position of `date` within the rendered row.
    #[must_use]
    pub fn position_for_date(&self, date: DateTime<Utc>) -> f64 {
        let (Some(map), Some(tiling)) = (&self.position_map, &self.tiling) else {
            return 0.0;
        };
        map.date_to_position(
            &self.locale,
            date.timestamp_millis(),
            self.render_state.rendered_width_px(tiling.result),
        )
    }

    /// Wall-clock date at a pixel position of the rendered row.
    #[must_use]
    pub fn date_for_position(&self, position_px: f64) -> DateTime<Utc> {
        let (Some(map), Some(tiling)) = (&self.position_map, &self.tiling) else {
            return DateTime::<Utc>::UNIX_EPOCH;
        };
        utc_from_ms(map.position_to_date(
            &self.locale,
            position_px,
            self.render_state.rendered_width_px(tiling.result),
        ))
    }

    /// Replaces the locale/timezone capability and rebuilds in full.
    pub fn set_locale(&mut self, locale: L) {
        self.locale = locale;
        if let Some(previous) = self.tiling.take() {
            self.retile(previous.resolution, previous.range);
        }
    }

    pub fn set_sizing_mode(&mut self, sizing_mode: SizingMode) {
        self.config.sizing_mode = sizing_mode;
        if let Some(tiling) = self.tiling.take() {
            self.rebuild_from(tiling);
        }
    }

    pub fn set_year_row_visible(&mut self, visible: bool) {
        self.config.year_row_visible = visible;
    }

    pub fn set_month_row_visible(&mut self, visible: bool) {
        self.config.month_row_visible = visible;
    }

    /// Drops the scroll subscription; arm and detach must stay symmetric so
    /// no subscription outlives the widget.
    pub fn detach(&mut self) {
        self.renderer.detach();
    }

    /// Clears all rendered state, keeping the configuration.
    pub fn clear(&mut self) {
        self.tiling = None;
        self.position_map = None;
        self.renderer.detach();
        self.render_state = RenderState::compute(
            self.config.sizing_mode,
            self.config.min_unit_width_px,
            self.config.viewport.width_px(),
            TilingResult::default(),
        );
    }

    #[must_use]
    pub fn frame(&self) -> Option<TimelineFrame<'_>> {
        let tiling = self.tiling.as_ref()?;
        Some(TimelineFrame {
            year_row: &tiling.year_row,
            year_row_visible: self.config.year_row_visible,
            month_row: &tiling.month_row,
            month_row_visible: self.config.month_row_visible,
            day_row: tiling.day_row.as_ref(),
            slots: self.renderer.pool().slots(),
            row_offset_px: self.renderer.row_offset_px(),
            render_state: self.render_state,
            result: tiling.result,
        })
    }

    #[must_use]
    pub fn tiling(&self) -> Option<&Tiling> {
        self.tiling.as_ref()
    }

    #[must_use]
    pub fn render_state(&self) -> RenderState {
        self.render_state
    }

    #[must_use]
    pub fn phase(&self) -> RenderPhase {
        self.renderer.phase()
    }

    #[must_use]
    pub fn config(&self) -> TimelineConfig {
        self.config
    }

    #[must_use]
    pub fn locale_bundle(&self) -> LocaleBundle {
        LocaleBundle::from_locale(&self.locale)
    }

    /// Snaps an arbitrary range onto resolution-unit boundaries: the start
    /// truncated down to its unit, the end extended to the last instant of
    /// its unit.
    #[must_use]
    pub fn snap_range(
        &self,
        resolution: Resolution,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            utc_from_ms(self.snap_start_ms(resolution, start.timestamp_millis())),
            utc_from_ms(self.snap_end_ms(resolution, end.timestamp_millis(), false)),
        )
    }

    /// As `snap_range` for the end instant, stepping back one unit first when
    /// the end is exclusive.
    #[must_use]
    pub fn snap_end_exclusive(&self, resolution: Resolution, end: DateTime<Utc>) -> DateTime<Utc> {
        utc_from_ms(self.snap_end_ms(resolution, end.timestamp_millis(), true))
    }

    fn retile(&mut self, resolution: Resolution, range: DateRange) {
        let start_offset = self.locale.offset_minutes(utc_from_ms(range.start_ms));
        let input = TileInput {
            resolution,
            range,
            first_day_of_week: self.locale.first_day_of_week(),
            first_hour_of_range: local_hour(range.start_ms, start_offset),
        };
        let tiling = tile(&self.locale, &input);
        self.rebuild_from(tiling);
    }

    fn rebuild_from(&mut self, tiling: Tiling) {
        self.render_state = RenderState::compute(
            self.config.sizing_mode,
            self.config.min_unit_width_px,
            self.config.viewport.width_px(),
            tiling.result,
        );
        let map = PositionMap::from_tiling(&self.locale, &tiling);
        let slots = pool_size(
            &self.render_state,
            tiling.result,
            tiling.resolution.leaves_per_block(),
        );
        self.renderer.arm(slots as usize);
        let ctx = RefillContext {
            source: &self.locale,
            tiling: &tiling,
            map: &map,
            state: &self.render_state,
        };
        self.renderer.refill_now(0.0, &ctx);
        self.position_map = Some(map);
        self.tiling = Some(tiling);
    }

    fn snap_unit_ms(resolution: Resolution) -> i64 {
        match resolution {
            Resolution::Hour => MS_PER_HOUR,
            Resolution::Day | Resolution::Week => MS_PER_DAY,
        }
    }

    fn snap_start_ms(&self, resolution: Resolution, at_ms: i64) -> i64 {
        let unit = Self::snap_unit_ms(resolution);
        let offset = i64::from(self.locale.offset_minutes(utc_from_ms(at_ms))) * 60_000;
        let local = at_ms + offset;
        local - local.rem_euclid(unit) - offset
    }

    fn snap_end_ms(&self, resolution: Resolution, at_ms: i64, exclusive: bool) -> i64 {
        let unit = Self::snap_unit_ms(resolution);
        let offset = i64::from(self.locale.offset_minutes(utc_from_ms(at_ms))) * 60_000;
        let mut local = at_ms + offset;
        if exclusive {
            local -= unit;
        }
        let floored = local - local.rem_euclid(unit);
        floored + unit - 1_000 - offset
    }
}
