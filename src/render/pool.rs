use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Logical style classes toggled on a slot; hosts map them to real styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleClass {
    Even,
    Odd,
    Weekend,
    ShortFirst,
    ShortLast,
}

/// One reusable render slot of the virtualization pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockSlot {
    pub date_ms: i64,
    pub label: String,
    pub left_px: f64,
    pub width_px: f64,
    pub styles: SmallVec<[StyleClass; 4]>,
    pub in_use: bool,
}

/// Fixed-size, stably indexed slot array.
///
/// Rebuilt on structural change, mutated in place on scroll; never resized
/// during steady-state scrolling, so per-frame churn is bounded by the pool
/// size instead of the range length.
#[derive(Debug, Default)]
pub struct BlockPool {
    slots: Vec<BlockSlot>,
}

impl BlockPool {
    pub(crate) fn rebuild(&mut self, size: usize) {
        self.slots.clear();
        self.slots.resize_with(size, BlockSlot::default);
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn slots(&self) -> &[BlockSlot] {
        &self.slots
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut BlockSlot> {
        self.slots.get_mut(index)
    }

    /// Marks every slot from `index` on as unused.
    pub(crate) fn release_from(&mut self, index: usize) {
        for slot in self.slots.iter_mut().skip(index) {
            slot.in_use = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_resets_slots_to_defaults() {
        let mut pool = BlockPool::default();
        pool.rebuild(3);
        assert_eq!(pool.len(), 3);
        assert!(pool.slots().iter().all(|slot| !slot.in_use));

        if let Some(slot) = pool.slot_mut(1) {
            slot.in_use = true;
            slot.label = "15".to_owned();
        }
        pool.rebuild(2);
        assert_eq!(pool.len(), 2);
        assert!(pool.slots().iter().all(|slot| slot.label.is_empty()));
    }

    #[test]
    fn release_from_clears_tail_usage_only() {
        let mut pool = BlockPool::default();
        pool.rebuild(4);
        for index in 0..4 {
            if let Some(slot) = pool.slot_mut(index) {
                slot.in_use = true;
            }
        }
        pool.release_from(2);
        let used: Vec<bool> = pool.slots().iter().map(|slot| slot.in_use).collect();
        assert_eq!(used, vec![true, true, false, false]);
    }
}
