mod pool;
mod virtualizer;

pub use pool::{BlockPool, BlockSlot, StyleClass};
pub use virtualizer::{
    OVERSCAN_SLOTS, REFILL_DELAY, RenderPhase, VirtualizationRenderer, pool_size,
};

pub(crate) use virtualizer::RefillContext;
