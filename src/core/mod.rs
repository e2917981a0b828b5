pub mod dst;
pub mod resolution;
pub mod sizing;
pub mod stepper;
pub mod tiler;
pub mod types;

pub use dst::{DstResolver, UtcOffsetSource};
pub use resolution::{DAYS_PER_WEEK, HOURS_PER_DAY, MS_PER_DAY, MS_PER_HOUR, Resolution};
pub use sizing::{PositionMap, RenderState, SizingMode};
pub use stepper::{DstStepper, correct_boundary};
pub use tiler::{
    AggregationRow, LeafBlock, RowEntry, TileInput, Tiling, TilingResult, tile,
};
pub use types::{DateRange, Viewport, WeekdayPosition, weekday_position};
