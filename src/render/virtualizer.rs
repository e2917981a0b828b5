use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::core::dst::UtcOffsetSource;
use crate::core::sizing::{PositionMap, RenderState};
use crate::core::tiler::{Tiling, TilingResult};
use crate::render::pool::{BlockPool, BlockSlot, StyleClass};

/// Lifecycle of the virtualization renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPhase {
    #[default]
    Idle,
    Armed,
    Scrolling,
}

/// Extra pool slots beyond the viewport minimum, absorbing partial-block
/// edge effects during scroll.
pub const OVERSCAN_SLOTS: u32 = 2;

/// Trailing-edge delay between the last scroll signal and its refill.
pub const REFILL_DELAY: Duration = Duration::from_millis(100);

/// Number of pool slots for the given sizing constants: every block when the
/// whole row fits the viewport, otherwise a viewport-bounded pool plus
/// overscan, capped at the block count.
#[must_use]
pub fn pool_size(state: &RenderState, result: TilingResult, leaves_per_block: u8) -> u32 {
    let block_count = result.resolution_block_count;
    if block_count == 0 {
        return 0;
    }
    let block_width_px = state.per_unit_px * f64::from(leaves_per_block);
    if f64::from(block_count) * block_width_px <= state.viewport_width_px {
        return block_count;
    }
    let min_unit = state.min_unit_width_px.max(1.0);
    let base = (state.viewport_width_px / min_unit).floor() as u32;
    (base + OVERSCAN_SLOTS).min(block_count)
}

/// Trailing-edge debounce for scroll refills: the last scheduled offset wins
/// and earlier pending offsets are dropped.
#[derive(Debug, Default)]
struct RefillScheduler {
    pending: Option<PendingRefill>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRefill {
    offset_px: f64,
    due: Instant,
}

impl RefillScheduler {
    fn schedule(&mut self, offset_px: f64, now: Instant) {
        self.pending = Some(PendingRefill {
            offset_px,
            due: now + REFILL_DELAY,
        });
    }

    fn poll(&mut self, now: Instant) -> Option<f64> {
        match self.pending {
            Some(pending) if pending.due <= now => {
                self.pending = None;
                Some(pending.offset_px)
            }
            _ => None,
        }
    }

    fn cancel(&mut self) {
        self.pending = None;
    }

    fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Borrowed inputs of one refill pass.
pub(crate) struct RefillContext<'a, S: UtcOffsetSource + ?Sized> {
    pub source: &'a S,
    pub tiling: &'a Tiling,
    pub map: &'a PositionMap,
    pub state: &'a RenderState,
}

/// Maintains the bounded slot pool and keeps it synced to the scroll
/// position. Owns its debounce state; armed on the first successful tiling
/// and disarmed on detach, with nothing process-wide left behind.
#[derive(Debug, Default)]
pub struct VirtualizationRenderer {
    phase: RenderPhase,
    pool: BlockPool,
    scheduler: RefillScheduler,
    row_offset_px: f64,
    last_scheduled_offset_px: Option<f64>,
}

impl VirtualizationRenderer {
    #[must_use]
    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    #[must_use]
    pub fn pool(&self) -> &BlockPool {
        &self.pool
    }

    /// Translation applied to the rendered row, tracking the scroll offset.
    #[must_use]
    pub fn row_offset_px(&self) -> f64 {
        self.row_offset_px
    }

    #[must_use]
    pub fn has_pending_refill(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Rebuilds the pool for a new structure and attaches the scroll
    /// subscription. Supersedes any pending deferred refill.
    pub(crate) fn arm(&mut self, pool_slots: usize) {
        self.scheduler.cancel();
        self.pool.rebuild(pool_slots);
        self.row_offset_px = 0.0;
        self.last_scheduled_offset_px = None;
        self.phase = RenderPhase::Armed;
    }

    /// Drops the scroll subscription and releases the pool.
    pub(crate) fn detach(&mut self) {
        self.scheduler.cancel();
        self.pool.clear();
        self.row_offset_px = 0.0;
        self.last_scheduled_offset_px = None;
        self.phase = RenderPhase::Idle;
    }

    /// Records a scroll signal and schedules the trailing-edge refill.
    /// Repeating the current offset is a no-op.
    pub(crate) fn on_scroll(&mut self, offset_px: f64, now: Instant) {
        if self.phase == RenderPhase::Idle {
            debug!("scroll signal ignored: renderer is idle");
            return;
        }
        if self.last_scheduled_offset_px == Some(offset_px) {
            return;
        }
        self.last_scheduled_offset_px = Some(offset_px);
        self.scheduler.schedule(offset_px, now);
        self.phase = RenderPhase::Scrolling;
    }

    /// Runs a due deferred refill, if any; returns whether one ran.
    pub(crate) fn poll<S: UtcOffsetSource + ?Sized>(
        &mut self,
        now: Instant,
        ctx: &RefillContext<'_, S>,
    ) -> bool {
        let Some(offset_px) = self.scheduler.poll(now) else {
            return false;
        };
        self.refill(offset_px, ctx);
        self.phase = RenderPhase::Armed;
        true
    }

    /// Immediate refill, used on arm and resize.
    pub(crate) fn refill_now<S: UtcOffsetSource + ?Sized>(
        &mut self,
        offset_px: f64,
        ctx: &RefillContext<'_, S>,
    ) {
        self.refill(offset_px, ctx);
    }

    fn refill<S: UtcOffsetSource + ?Sized>(&mut self, offset_px: f64, ctx: &RefillContext<'_, S>) {
        let result = ctx.tiling.result;
        let leaves_per_block = ctx.tiling.resolution.leaves_per_block();
        let per_unit_px = ctx.state.per_unit_px;
        let block_width_px = per_unit_px * f64::from(leaves_per_block);
        self.row_offset_px = offset_px;
        if result.resolution_block_count == 0 || block_width_px <= 0.0 {
            self.pool.release_from(0);
            return;
        }

        let rendered_width_px = ctx.state.rendered_width_px(result);
        let first_block_leaves = first_block_leaves(result, leaves_per_block);
        let first_block_width_px = per_unit_px * f64::from(first_block_leaves);

        let (first_block, left_px) =
            first_visible_block(offset_px, first_block_width_px, block_width_px);
        let window_start_ms = ctx.map.position_to_date(ctx.source, left_px, rendered_width_px);
        let window_end_px = (offset_px + ctx.state.viewport_width_px).min(rendered_width_px);
        let window_end_ms = ctx.map.position_to_date(ctx.source, window_end_px, rendered_width_px);
        debug!(
            first_block,
            window_start_ms, window_end_ms, "refilling slot pool for scroll window"
        );

        let block_count = result.resolution_block_count;
        let mut filled = 0usize;
        for block in first_block..block_count {
            let leaf_index = block_leaf_index(result, leaves_per_block, block) as usize;
            let Some(leaf) = ctx.tiling.leaves.get(leaf_index) else {
                break;
            };
            if leaf.start_ms > window_end_ms {
                break;
            }
            let slot_index = (block - first_block) as usize;
            let Some(slot) = self.pool.slot_mut(slot_index) else {
                warn!(
                    slot_index,
                    pool = self.pool.len(),
                    "refill index outside pool bounds; slot skipped"
                );
                continue;
            };
            fill_slot(slot, leaf, block, block_count, result, leaves_per_block);
            slot.left_px = per_unit_px * leaf_index as f64;
            slot.width_px = per_unit_px * f64::from(block_leaves(result, leaves_per_block, block));
            filled = filled.max(slot_index + 1);
        }
        self.pool.release_from(filled);
    }
}

/// Leaf count of the first resolution block; short-first geometry only
/// applies to grouped (week) blocks.
fn first_block_leaves(result: TilingResult, leaves_per_block: u8) -> u32 {
    if leaves_per_block > 1 && result.first_short_length > 0 {
        result.first_short_length
    } else {
        u32::from(leaves_per_block)
    }
}

/// Index of the first leaf of `block`.
fn block_leaf_index(result: TilingResult, leaves_per_block: u8, block: u32) -> u32 {
    if block == 0 {
        return 0;
    }
    first_block_leaves(result, leaves_per_block)
        + (block - 1) * u32::from(leaves_per_block)
}

/// Leaf count of `block`, accounting for short first/last blocks.
fn block_leaves(result: TilingResult, leaves_per_block: u8, block: u32) -> u32 {
    let start = block_leaf_index(result, leaves_per_block, block);
    let end = block_leaf_index(result, leaves_per_block, block + 1).min(result.leaf_count);
    end.saturating_sub(start)
}

/// Index and left edge of the first fully visible resolution block at a
/// scroll offset, correcting for a possibly short first block.
fn first_visible_block(offset_px: f64, first_block_width_px: f64, block_width_px: f64) -> (u32, f64) {
    if offset_px <= 0.0 {
        return (0, 0.0);
    }
    if offset_px <= first_block_width_px {
        return (1, first_block_width_px);
    }
    let past = ((offset_px - first_block_width_px) / block_width_px).ceil();
    (
        1 + past as u32,
        first_block_width_px + past * block_width_px,
    )
}

fn fill_slot(
    slot: &mut BlockSlot,
    leaf: &crate::core::tiler::LeafBlock,
    block: u32,
    block_count: u32,
    result: TilingResult,
    leaves_per_block: u8,
) {
    slot.date_ms = leaf.start_ms;
    slot.label.clone_from(&leaf.label);
    slot.styles.clear();
    slot.styles.push(if block % 2 == 0 {
        StyleClass::Even
    } else {
        StyleClass::Odd
    });
    if leaves_per_block == 1 && leaf.weekend {
        slot.styles.push(StyleClass::Weekend);
    }
    if leaves_per_block > 1 {
        if block == 0 && result.first_short_length > 0 {
            slot.styles.push(StyleClass::ShortFirst);
        }
        if block + 1 == block_count && result.last_short_length > 0 {
            slot.styles.push(StyleClass::ShortLast);
        }
    }
    slot.in_use = true;
}
