use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::dst::{DstResolver, UtcOffsetSource};
use crate::core::resolution::Resolution;
use crate::core::tiler::{Tiling, TilingResult};
use crate::core::types::utc_from_ms;
use crate::error::TimelineError;

/// Block sizing policy: percentages of the container, or whole fixed pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizingMode {
    #[default]
    Percentage,
    FixedPixel,
}

impl SizingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "Percentage",
            Self::FixedPixel => "FixedPixel",
        }
    }
}

impl fmt::Display for SizingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizingMode {
    type Err = TimelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Percentage" | "percentage" => Ok(Self::Percentage),
            "FixedPixel" | "fixedpixel" | "fixed-pixel" => Ok(Self::FixedPixel),
            other => Err(TimelineError::InvalidConfig(format!(
                "unknown sizing mode: {other}"
            ))),
        }
    }
}

/// Sizing constants derived from a tiling; owned by the width calculator and
/// recomputed whenever range, resolution, or container size changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub sizing_mode: SizingMode,
    pub min_unit_width_px: f64,
    pub per_unit_px: f64,
    pub pct_per_unit: f64,
    pub scroll_offset_px: f64,
    pub viewport_width_px: f64,
}

impl RenderState {
    #[must_use]
    pub fn compute(
        sizing_mode: SizingMode,
        min_unit_width_px: f64,
        viewport_width_px: f64,
        result: TilingResult,
    ) -> Self {
        let leaf_count = result.leaf_count;
        let pct_per_unit = if leaf_count > 0 {
            100.0 / f64::from(leaf_count)
        } else {
            0.0
        };
        let per_unit_px = match sizing_mode {
            SizingMode::Percentage => {
                if leaf_count > 0 {
                    viewport_width_px / f64::from(leaf_count)
                } else {
                    0.0
                }
            }
            SizingMode::FixedPixel => {
                if leaf_count > 0 {
                    // The per-leaf minimum is what lets a long range overflow
                    // the viewport and engage virtualized scrolling.
                    fixed_pixel_unit_width(viewport_width_px, leaf_count).max(min_unit_width_px)
                } else {
                    0.0
                }
            }
        };
        Self {
            sizing_mode,
            min_unit_width_px,
            per_unit_px,
            pct_per_unit,
            scroll_offset_px: 0.0,
            viewport_width_px,
        }
    }

    /// Percentage width of `n` leaf-aligned units.
    #[must_use]
    pub fn width_pct(&self, n: u32) -> f64 {
        self.pct_per_unit * f64::from(n)
    }

    /// Percentage width of one resolution block.
    #[must_use]
    pub fn block_width_pct(&self, result: TilingResult) -> f64 {
        if result.resolution_block_count == 0 {
            0.0
        } else {
            100.0 / f64::from(result.resolution_block_count)
        }
    }

    /// Total width of the rendered row in pixels.
    #[must_use]
    pub fn rendered_width_px(&self, result: TilingResult) -> f64 {
        match self.sizing_mode {
            SizingMode::Percentage => self.viewport_width_px,
            SizingMode::FixedPixel => self.per_unit_px * f64::from(result.leaf_count),
        }
    }
}

/// Smallest whole pixel width per leaf that leaves no right-edge gap.
fn fixed_pixel_unit_width(viewport_width_px: f64, leaf_count: u32) -> f64 {
    if leaf_count == 0 || viewport_width_px <= 0.0 {
        return 0.0;
    }
    let mut width = (viewport_width_px / f64::from(leaf_count)).ceil();
    while width * f64::from(leaf_count) < viewport_width_px {
        width += 1.0;
    }
    width
}

/// Linear mapping between instants of the tiled range and rendered pixels.
///
/// Both directions run in the DST-neutral ("normal") reference frame, where
/// every wall-clock-aligned leaf has equal width. At hour resolution the
/// inversion length carries the signed difference of the DST adjustment at
/// the two endpoints, so positions near a transition invert to the correct
/// wall-clock date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionMap {
    normal_start_ms: i64,
    normal_end_ms: i64,
    dst_start_ms: i64,
    dst_end_ms: i64,
    dst_sensitive: bool,
}

impl PositionMap {
    #[must_use]
    pub fn from_tiling<S: UtcOffsetSource + ?Sized>(source: &S, tiling: &Tiling) -> Self {
        let resolver = DstResolver::new(source);
        Self {
            normal_start_ms: tiling.normal_start_ms,
            normal_end_ms: tiling.normal_end_ms,
            dst_start_ms: resolver.active_adjustment_ms(utc_from_ms(tiling.range.start_ms)),
            dst_end_ms: resolver.active_adjustment_ms(utc_from_ms(tiling.range.end_ms)),
            dst_sensitive: matches!(tiling.resolution, Resolution::Hour),
        }
    }

    /// Inversion length: the DST-neutral span, corrected at hour resolution
    /// by the signed difference of the endpoint adjustments (hour leaves are
    /// uniform in real time, not in the neutral frame).
    fn inversion_length_ms(&self) -> i64 {
        let normal_length = self.normal_end_ms - self.normal_start_ms;
        if self.dst_sensitive {
            normal_length + (self.dst_start_ms - self.dst_end_ms)
        } else {
            normal_length
        }
    }

    fn inversion_origin_ms(&self) -> i64 {
        if self.dst_sensitive {
            // The raw range start.
            self.normal_start_ms - self.dst_start_ms
        } else {
            self.normal_start_ms
        }
    }

    /// Pixel position of `date_ms` within a row of `rendered_width_px`.
    /// Returns 0 when the range length or the width is not positive.
    #[must_use]
    pub fn date_to_position<S: UtcOffsetSource + ?Sized>(
        &self,
        source: &S,
        date_ms: i64,
        rendered_width_px: f64,
    ) -> f64 {
        let length = self.inversion_length_ms();
        if length <= 0 || rendered_width_px <= 0.0 {
            return 0.0;
        }
        let date = if self.dst_sensitive {
            date_ms
        } else {
            DstResolver::new(source).normal_date_ms(date_ms)
        };
        rendered_width_px * (date - self.inversion_origin_ms()) as f64 / length as f64
    }

    /// Inverse of the linear mapping, yielding a wall-clock instant.
    /// Returns the range start when the width or range length is not positive.
    #[must_use]
    pub fn position_to_date<S: UtcOffsetSource + ?Sized>(
        &self,
        source: &S,
        position_px: f64,
        rendered_width_px: f64,
    ) -> i64 {
        let length = self.inversion_length_ms();
        let origin = self.inversion_origin_ms();
        if rendered_width_px <= 0.0 || length <= 0 {
            return origin;
        }
        let fraction = position_px / rendered_width_px;
        let mapped = origin + (fraction * length as f64).round() as i64;
        if self.dst_sensitive {
            mapped
        } else {
            mapped - DstResolver::new(source).active_adjustment_ms(utc_from_ms(mapped))
        }
    }
}
