//! LRU (Least Recently Used) replacement policy.

use std::collections::{HashMap, HashSet};

use crate::common::FrameId;

/// Evicts the evictable frame whose last access is oldest.
///
/// Access times come from a logical clock bumped on every
/// [`record_access`](Self::record_access). Victim selection is a linear scan
/// over the evictable set, which is fine for pools of a few hundred frames.
pub struct LruReplacer {
    /// Logical time of each frame's most recent access.
    last_access: HashMap<FrameId, u64>,

    /// Frames that are currently evictable (pin_count == 0).
    evictable: HashSet<FrameId>,

    clock: u64,
}

impl LruReplacer {
    pub fn new() -> Self {
        Self {
            last_access: HashMap::new(),
            evictable: HashSet::new(),
            clock: 0,
        }
    }

    /// Record that a frame was accessed now.
    pub fn record_access(&mut self, frame_id: FrameId) {
        self.clock += 1;
        self.last_access.insert(frame_id, self.clock);
    }

    pub fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if evictable {
            self.evictable.insert(frame_id);
        } else {
            self.evictable.remove(&frame_id);
        }
    }

    /// Evict the least recently used evictable frame that `allowed` accepts.
    ///
    /// Frames `allowed` rejects keep their place.
    pub fn evict_where<F>(&mut self, allowed: F) -> Option<FrameId>
    where
        F: Fn(FrameId) -> bool,
    {
        let victim = self
            .evictable
            .iter()
            .copied()
            .filter(|&frame_id| allowed(frame_id))
            .min_by_key(|frame_id| self.last_access.get(frame_id).copied().unwrap_or(0))?;

        self.remove(victim);
        Some(victim)
    }

    /// Forget a frame entirely.
    pub fn remove(&mut self, frame_id: FrameId) {
        self.evictable.remove(&frame_id);
        self.last_access.remove(&frame_id);
    }

    /// Number of evictable frames.
    pub fn size(&self) -> usize {
        self.evictable.len()
    }
}

impl Default for LruReplacer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replacer_with(frames: &[usize]) -> LruReplacer {
        let mut replacer = LruReplacer::new();
        for &f in frames {
            replacer.record_access(FrameId::new(f));
            replacer.set_evictable(FrameId::new(f), true);
        }
        replacer
    }

    fn evict_any(replacer: &mut LruReplacer) -> Option<FrameId> {
        replacer.evict_where(|_| true)
    }

    #[test]
    fn test_lru_order() {
        let mut replacer = replacer_with(&[0, 1, 2]);

        // touch 0 again: now 1 is the oldest
        replacer.record_access(FrameId::new(0));

        assert_eq!(replacer.size(), 3);
        assert_eq!(evict_any(&mut replacer), Some(FrameId::new(1)));
        assert_eq!(evict_any(&mut replacer), Some(FrameId::new(2)));
        assert_eq!(evict_any(&mut replacer), Some(FrameId::new(0)));
        assert_eq!(evict_any(&mut replacer), None);
    }

    #[test]
    fn test_lru_skips_pinned() {
        let mut replacer = replacer_with(&[0, 1, 2]);
        replacer.set_evictable(FrameId::new(0), false);
        replacer.set_evictable(FrameId::new(2), false);

        assert_eq!(evict_any(&mut replacer), Some(FrameId::new(1)));
        assert_eq!(evict_any(&mut replacer), None);
    }

    #[test]
    fn test_lru_evict_where_keeps_rejected() {
        let mut replacer = replacer_with(&[0, 1]);

        assert_eq!(
            replacer.evict_where(|f| f != FrameId::new(0)),
            Some(FrameId::new(1))
        );
        assert_eq!(replacer.evict_where(|f| f != FrameId::new(0)), None);
        assert_eq!(replacer.size(), 1);
        assert_eq!(evict_any(&mut replacer), Some(FrameId::new(0)));
    }

    #[test]
    fn test_lru_remove() {
        let mut replacer = replacer_with(&[0, 1]);
        replacer.remove(FrameId::new(0));
        assert_eq!(evict_any(&mut replacer), Some(FrameId::new(1)));
        assert_eq!(evict_any(&mut replacer), None);
    }
}
