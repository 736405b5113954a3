use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::{debug, trace};

use super::clock::{Clock, MonotonicClock, Timestamp};
use super::{AccessType, FrameId, Replacer};
use crate::config::ReplacerConfig;
use crate::error::{Error, Result};

/// Backward k-distance of a frame. A frame with less than k recorded
/// accesses has an infinite distance, which outranks any finite one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KDistance {
    Finite(u64),
    Infinite,
}

/// An eviction candidate, the greatest one is the victim.
#[derive(Debug, Eq, PartialEq)]
struct Candidate {
    frame_id: FrameId,
    distance: KDistance,
    last_access_at: Timestamp,
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // larger distance first, then the least recently accessed one,
        // the frame id only matters for timestamps that collide.
        self.distance
            .cmp(&other.distance)
            .then_with(|| other.last_access_at.cmp(&self.last_access_at))
            .then_with(|| other.frame_id.cmp(&self.frame_id))
    }
}

#[derive(Debug)]
struct LRUKNode {
    k: usize,
    is_evictable: bool,
    /// history of last seen K timestamp of the given frame.
    /// Least recent timestamp stored in front.
    history: VecDeque<Timestamp>,
    last_access_at: Timestamp,
}

impl LRUKNode {
    fn new(k: usize) -> Self {
        LRUKNode { k, is_evictable: false, history: VecDeque::with_capacity(k), last_access_at: 0 }
    }

    fn record_access(&mut self, timestamp: Timestamp) {
        if self.history.len() == self.k {
            self.history.pop_front();
        }
        self.history.push_back(timestamp);
        self.last_access_at = timestamp;
    }

    /// The k-th most recent access, None until the window is full.
    fn oldest_access_at(&self) -> Option<Timestamp> {
        if self.history.len() < self.k {
            return None;
        }
        self.history.front().copied()
    }

    fn k_distance(&self, now: Timestamp) -> KDistance {
        match self.oldest_access_at() {
            Some(oldest) => KDistance::Finite(now.saturating_sub(oldest)),
            None => KDistance::Infinite,
        }
    }
}

/// LRUKReplacer implements the LRU-k replacement policy.
///
/// The LRU-k algorithm evicts a frame whose backward k-distance is maximum of
/// all frames. Backward k-distance is computed as the difference in time between
/// the current timestamp and the timestamp of k-th previous access.
///
/// A frame with less than k history references is given +inf as its backward k-distance.
/// when multiple frames have +inf backward k-distance, classical LRU algorithm is used
/// to choose victim.
///
/// It is not synchronized, [`SyncLRUKReplacer`] is the only way to reach it.
struct LRUKReplacer {
    nodes: HashMap<FrameId, LRUKNode>,
    clock: Arc<dyn Clock>,
    current_size: usize,
    replacer_size: usize,
    k: usize,
}

impl LRUKReplacer {
    fn new(capacity: usize, k: usize, clock: Arc<dyn Clock>) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::Value("replacer capacity should be larger than zero".to_string()));
        }
        if k == 0 {
            return Err(Error::Value("replacer k should be larger than zero".to_string()));
        }
        let nodes = HashMap::with_capacity(capacity);
        Ok(LRUKReplacer { nodes, clock, current_size: 0, replacer_size: capacity, k })
    }

    fn check_frame(&self, frame_id: FrameId) -> Result<()> {
        if frame_id >= self.replacer_size {
            return Err(Error::InvalidFrame { frame_id, capacity: self.replacer_size });
        }
        Ok(())
    }

    fn record_access(&mut self, frame_id: FrameId, access_type: AccessType) -> Result<()> {
        self.check_frame(frame_id)?;
        let now = self.clock.now();
        let k = self.k;
        let node = self.nodes.entry(frame_id).or_insert_with(|| LRUKNode::new(k));
        node.record_access(now);
        trace!("record {} access of frame {} at {}", access_type, frame_id, now);
        Ok(())
    }

    /// Find the frame with the largest backward k-distance and evict that frame. Only frames
    /// that are marked as evictable are candidates for eviction.
    ///
    /// If multiple frames have inf backward k-distance, then evict the frame that has gone
    /// the longest without any access. Frames with equal finite distance are resolved
    /// the same way.
    fn evict(&mut self) -> Result<Option<FrameId>> {
        if self.current_size == 0 {
            return Ok(None);
        }
        let now = self.clock.now();
        let victim = self
            .nodes
            .iter()
            .filter(|(_, node)| node.is_evictable)
            .map(|(&frame_id, node)| Candidate {
                frame_id,
                distance: node.k_distance(now),
                last_access_at: node.last_access_at,
            })
            .max();

        let Some(victim) = victim else {
            return Ok(None);
        };
        self.remove_node(victim.frame_id)?;
        debug!("evict frame {} with k-distance {:?}", victim.frame_id, victim.distance);
        Ok(Some(victim.frame_id))
    }

    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) -> Result<()> {
        self.check_frame(frame_id)?;
        let Some(node) = self.nodes.get_mut(&frame_id) else {
            return Ok(());
        };
        if node.is_evictable == evictable {
            return Ok(());
        }

        node.is_evictable = evictable;
        if evictable {
            self.current_size += 1;
        } else {
            self.current_size -= 1;
        }
        Ok(())
    }

    fn is_evictable(&self, frame_id: FrameId) -> Result<Option<bool>> {
        self.check_frame(frame_id)?;
        Ok(self.nodes.get(&frame_id).map(|node| node.is_evictable))
    }

    fn remove(&mut self, frame_id: FrameId) -> Result<()> {
        self.check_frame(frame_id)?;
        if self.nodes.contains_key(&frame_id) {
            self.remove_node(frame_id)?;
            debug!("remove frame {}", frame_id);
        }
        Ok(())
    }

    /// Drop the bookkeeping of an evictable frame, shared by `remove` and `evict`.
    fn remove_node(&mut self, frame_id: FrameId) -> Result<()> {
        match self.nodes.get(&frame_id) {
            None => Ok(()),
            Some(node) if !node.is_evictable => Err(Error::RemovePinnedFrame(frame_id)),
            Some(_) => {
                self.nodes.remove(&frame_id);
                self.current_size -= 1;
                Ok(())
            }
        }
    }

    fn size(&self) -> usize {
        self.current_size
    }
}

/// SyncLRUKReplacer implements the thread-safe version of LRU-k replacement policy,
/// basically all the heavy lifting are happens in the LRUKReplacer. Every operation
/// holds the latch for its whole duration.
pub struct SyncLRUKReplacer {
    inner: Mutex<LRUKReplacer>,
}

impl SyncLRUKReplacer {
    /// Create a replacer tracking frames `[0, capacity)` with the look-back
    /// window `k`, timestamps are read from a [`MonotonicClock`].
    pub fn new(capacity: usize, k: usize) -> Result<Self> {
        Self::with_clock(capacity, k, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(capacity: usize, k: usize, clock: Arc<dyn Clock>) -> Result<Self> {
        let inner = Mutex::new(LRUKReplacer::new(capacity, k, clock)?);
        Ok(SyncLRUKReplacer { inner })
    }

    pub fn from_config(cfg: &ReplacerConfig) -> Result<Self> {
        Self::new(cfg.capacity, cfg.k)
    }
}

impl Replacer for SyncLRUKReplacer {
    fn record_access(&self, frame_id: FrameId, access_type: AccessType) -> Result<()> {
        let mut guard = self.inner.lock()?;
        guard.record_access(frame_id, access_type)
    }

    fn evict(&self) -> Result<Option<FrameId>> {
        let mut guard = self.inner.lock()?;
        guard.evict()
    }

    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> Result<()> {
        let mut guard = self.inner.lock()?;
        guard.set_evictable(frame_id, evictable)
    }

    fn is_evictable(&self, frame_id: FrameId) -> Result<Option<bool>> {
        let guard = self.inner.lock()?;
        guard.is_evictable(frame_id)
    }

    fn remove(&self, frame_id: FrameId) -> Result<()> {
        let mut guard = self.inner.lock()?;
        guard.remove(frame_id)
    }

    fn size(&self) -> Result<usize> {
        let guard = self.inner.lock()?;
        Ok(guard.size())
    }
}
