//! LRU-K eviction policy for the buffer pool.
//!
//! LRU-K (O'Neil, Weikum, O'Neil) ranks eviction candidates by their
//! backward k-distance: the span of logical time between now and a frame's
//! K-th most recent access. The frame with the largest distance is the
//! victim. A frame with fewer than K recorded accesses has infinite
//! distance and dominates every frame with a full history; among such
//! frames, plain LRU on the oldest recorded access breaks the tie.
//!
//! The replacer keeps its own latch-free state; the pool wraps it in a
//! mutex and acquires that mutex only while holding the pool latch, so the
//! lock order is always pool -> replacer.

use std::collections::{HashMap, VecDeque};

use super::error::{BufferError, BufferResult};
use super::frame::FrameId;

/// How a page access was made. The replacer accepts the tag so a policy
/// can bias its ranking; the baseline LRU-K policy ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessType {
    /// Unclassified access.
    #[default]
    Unknown,
    /// Point lookup.
    Lookup,
    /// Sequential scan.
    Scan,
    /// Index traversal.
    Index,
}

/// Per-frame access history.
#[derive(Debug)]
struct LruKNode {
    /// Logical timestamps of the most recent accesses, oldest first.
    /// At most K entries; only the K-th from the end is ever ranked on.
    history: VecDeque<u64>,
    /// Whether the frame may be chosen as a victim.
    is_evictable: bool,
}

impl LruKNode {
    fn new() -> Self {
        Self {
            history: VecDeque::new(),
            is_evictable: false,
        }
    }

    fn record(&mut self, now: u64, k: usize) {
        if self.history.len() == k {
            self.history.pop_front();
        }
        self.history.push_back(now);
    }

    /// Timestamp of the K-th most recent access, or `None` when fewer
    /// than K accesses have been recorded (infinite backward distance).
    fn kth_most_recent(&self, k: usize) -> Option<u64> {
        if self.history.len() >= k {
            Some(self.history[self.history.len() - k])
        } else {
            None
        }
    }

    /// Oldest recorded access. History is never empty for a live node.
    fn earliest(&self) -> u64 {
        *self.history.front().expect("node with empty history")
    }
}

/// LRU-K page replacement policy.
///
/// Tracks per-frame access histories and selects eviction victims among
/// the frames the pool has marked evictable.
pub struct LruKReplacer {
    /// Access history per frame.
    nodes: HashMap<FrameId, LruKNode>,
    /// Logical clock; incremented once per recorded access.
    current_timestamp: u64,
    /// Number of evictable frames.
    curr_size: usize,
    /// Pool capacity; frame ids at or above this are rejected.
    capacity: usize,
    /// The K in LRU-K.
    k: usize,
}

impl LruKReplacer {
    /// Creates a replacer for a pool of `capacity` frames.
    pub fn new(capacity: usize, k: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
            current_timestamp: 0,
            curr_size: 0,
            capacity,
            k,
        }
    }

    /// Records an access to `frame_id` at the current logical time.
    ///
    /// A first access creates the frame's history (non-evictable until the
    /// pool says otherwise). The history is trimmed to the most recent K
    /// entries.
    pub fn record_access(
        &mut self,
        frame_id: FrameId,
        _access_type: AccessType,
    ) -> BufferResult<()> {
        self.check_bounds(frame_id)?;

        let now = self.current_timestamp;
        self.nodes
            .entry(frame_id)
            .or_insert_with(LruKNode::new)
            .record(now, self.k);
        self.current_timestamp += 1;

        Ok(())
    }

    /// Marks `frame_id` evictable or not, adjusting the evictable count.
    ///
    /// A frame the replacer has never seen is a no-op.
    pub fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) -> BufferResult<()> {
        self.check_bounds(frame_id)?;

        if let Some(node) = self.nodes.get_mut(&frame_id) {
            if node.is_evictable != evictable {
                node.is_evictable = evictable;
                if evictable {
                    self.curr_size += 1;
                } else {
                    self.curr_size -= 1;
                }
            }
        }

        Ok(())
    }

    /// Forcibly drops all state for `frame_id`.
    ///
    /// Only valid on an evictable frame; an unknown frame is a no-op.
    pub fn remove(&mut self, frame_id: FrameId) -> BufferResult<()> {
        self.check_bounds(frame_id)?;

        let Some(node) = self.nodes.get(&frame_id) else {
            return Ok(());
        };
        if !node.is_evictable {
            return Err(BufferError::NotEvictable {
                frame_id: frame_id.index(),
            });
        }

        self.nodes.remove(&frame_id);
        self.curr_size -= 1;
        Ok(())
    }

    /// Selects and removes the eviction victim.
    ///
    /// The victim is the evictable frame with the largest backward
    /// k-distance; infinite distance (fewer than K accesses) dominates
    /// every finite one, and ties fall back to the oldest entry in the
    /// history. Returns `None` when no frame is evictable.
    pub fn evict(&mut self) -> Option<FrameId> {
        let mut victim: Option<(FrameId, Option<u64>, u64)> = None;

        for (&frame_id, node) in &self.nodes {
            if !node.is_evictable {
                continue;
            }
            let candidate = (frame_id, node.kth_most_recent(self.k), node.earliest());
            match victim {
                None => victim = Some(candidate),
                Some(best) => {
                    if Self::beats(&candidate, &best) {
                        victim = Some(candidate);
                    }
                }
            }
        }

        let (frame_id, _, _) = victim?;
        self.nodes.remove(&frame_id);
        self.curr_size -= 1;
        Some(frame_id)
    }

    /// Returns the number of evictable frames.
    pub fn size(&self) -> usize {
        self.curr_size
    }

    /// Returns the pool capacity this replacer was built for.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the K in LRU-K.
    pub fn k(&self) -> usize {
        self.k
    }

    /// True if candidate `a` is a better victim than `b`.
    ///
    /// A smaller K-th-most-recent timestamp means a larger backward
    /// distance; `None` is infinite and dominates every finite distance.
    fn beats(a: &(FrameId, Option<u64>, u64), b: &(FrameId, Option<u64>, u64)) -> bool {
        match (a.1, b.1) {
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (None, None) => a.2 < b.2,
            (Some(x), Some(y)) => x < y || (x == y && a.2 < b.2),
        }
    }

    fn check_bounds(&self, frame_id: FrameId) -> BufferResult<()> {
        if frame_id.index() >= self.capacity {
            return Err(BufferError::invalid_frame(frame_id.index(), self.capacity));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LruKReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruKReplacer")
            .field("capacity", &self.capacity)
            .field("k", &self.k)
            .field("evictable", &self.curr_size)
            .field("tracked", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(replacer: &mut LruKReplacer, id: usize) {
        replacer
            .record_access(FrameId::new(id), AccessType::Unknown)
            .unwrap();
    }

    fn evictable(replacer: &mut LruKReplacer, id: usize) {
        replacer.set_evictable(FrameId::new(id), true).unwrap();
    }

    #[test]
    fn test_empty_replacer() {
        let mut replacer = LruKReplacer::new(4, 2);
        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_new_frames_are_not_evictable() {
        let mut replacer = LruKReplacer::new(4, 2);
        record(&mut replacer, 0);
        record(&mut replacer, 1);

        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_set_evictable_adjusts_size() {
        let mut replacer = LruKReplacer::new(4, 2);
        record(&mut replacer, 0);
        record(&mut replacer, 1);

        evictable(&mut replacer, 0);
        evictable(&mut replacer, 1);
        assert_eq!(replacer.size(), 2);

        // Toggling to the same value is a no-op
        evictable(&mut replacer, 0);
        assert_eq!(replacer.size(), 2);

        replacer.set_evictable(FrameId::new(0), false).unwrap();
        assert_eq!(replacer.size(), 1);
    }

    #[test]
    fn test_set_evictable_unknown_is_noop() {
        let mut replacer = LruKReplacer::new(4, 2);
        replacer.set_evictable(FrameId::new(3), true).unwrap();
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut replacer = LruKReplacer::new(4, 2);

        // The capacity itself is already out of range
        let err = replacer
            .record_access(FrameId::new(4), AccessType::Unknown)
            .unwrap_err();
        assert!(matches!(err, BufferError::InvalidFrameId { frame_id: 4, capacity: 4 }));

        assert!(replacer.set_evictable(FrameId::new(9), true).is_err());
        assert!(replacer.remove(FrameId::new(9)).is_err());
    }

    #[test]
    fn test_remove_semantics() {
        let mut replacer = LruKReplacer::new(4, 2);
        record(&mut replacer, 0);

        // Not evictable yet: rejected
        assert!(matches!(
            replacer.remove(FrameId::new(0)),
            Err(BufferError::NotEvictable { frame_id: 0 })
        ));

        evictable(&mut replacer, 0);
        replacer.remove(FrameId::new(0)).unwrap();
        assert_eq!(replacer.size(), 0);

        // Unknown frame is a no-op
        replacer.remove(FrameId::new(0)).unwrap();
        replacer.remove(FrameId::new(2)).unwrap();
    }

    #[test]
    fn test_infinite_distance_dominates() {
        let mut replacer = LruKReplacer::new(4, 2);

        // Frame 0 gets two accesses (finite distance), frame 1 only one
        record(&mut replacer, 0);
        record(&mut replacer, 0);
        record(&mut replacer, 1);
        evictable(&mut replacer, 0);
        evictable(&mut replacer, 1);

        assert_eq!(replacer.evict(), Some(FrameId::new(1)));
        assert_eq!(replacer.evict(), Some(FrameId::new(0)));
        assert_eq!(replacer.evict(), None);
    }

    #[test]
    fn test_lru_fallback_among_cold_frames() {
        let mut replacer = LruKReplacer::new(4, 2);

        // All frames have a single access: all infinite, LRU order wins
        record(&mut replacer, 2);
        record(&mut replacer, 0);
        record(&mut replacer, 1);
        for id in 0..3 {
            evictable(&mut replacer, id);
        }

        assert_eq!(replacer.evict(), Some(FrameId::new(2)));
        assert_eq!(replacer.evict(), Some(FrameId::new(0)));
        assert_eq!(replacer.evict(), Some(FrameId::new(1)));
    }

    #[test]
    fn test_lru_k_victim_choice() {
        // Access pattern: A, B, C, A, B with k = 2. C has fewer than two
        // accesses so it goes first; A's history then starts before B's.
        let (a, b, c) = (0, 1, 2);
        let mut replacer = LruKReplacer::new(4, 2);
        record(&mut replacer, a);
        record(&mut replacer, b);
        record(&mut replacer, c);
        record(&mut replacer, a);
        record(&mut replacer, b);
        for id in [a, b, c] {
            evictable(&mut replacer, id);
        }
        assert_eq!(replacer.size(), 3);

        assert_eq!(replacer.evict(), Some(FrameId::new(c)));
        assert_eq!(replacer.evict(), Some(FrameId::new(a)));
        assert_eq!(replacer.evict(), Some(FrameId::new(b)));
    }

    #[test]
    fn test_history_trimmed_to_k() {
        let mut replacer = LruKReplacer::new(4, 2);

        // Frame 0 accessed many times early, frame 1 twice late. Only the
        // last two accesses of frame 0 count, and they predate frame 1's.
        for _ in 0..6 {
            record(&mut replacer, 0);
        }
        record(&mut replacer, 1);
        record(&mut replacer, 1);
        evictable(&mut replacer, 0);
        evictable(&mut replacer, 1);

        assert_eq!(replacer.evict(), Some(FrameId::new(0)));
    }

    #[test]
    fn test_record_after_evict_starts_fresh() {
        let mut replacer = LruKReplacer::new(4, 2);
        record(&mut replacer, 0);
        record(&mut replacer, 0);
        evictable(&mut replacer, 0);
        assert_eq!(replacer.evict(), Some(FrameId::new(0)));

        // The frame's history is gone; a new access makes it cold again
        record(&mut replacer, 0);
        record(&mut replacer, 1);
        record(&mut replacer, 1);
        evictable(&mut replacer, 0);
        evictable(&mut replacer, 1);
        assert_eq!(replacer.evict(), Some(FrameId::new(0)));
    }

    #[test]
    fn test_eviction_skips_non_evictable() {
        let mut replacer = LruKReplacer::new(4, 2);
        record(&mut replacer, 0);
        record(&mut replacer, 1);
        evictable(&mut replacer, 1);

        assert_eq!(replacer.evict(), Some(FrameId::new(1)));
        assert_eq!(replacer.evict(), None);
    }
}
