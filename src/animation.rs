//! Animation sequencing: FIFO of batches, at most one batch in flight.
//!
//! Items of one batch play concurrently. A batch is only released once every item of the
//! previously released batch reported completion.

use std::collections::VecDeque;

use crate::gem::GemId;
use crate::grid::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationKind {
    /// Move the gem to the given screen position.
    Translation(Vec2),
    /// Shrink and destroy the gem.
    Matching,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationItem {
    pub target: GemId,
    pub kind: AnimationKind,
}

impl AnimationItem {
    pub const fn translation(target: GemId, destination: Vec2) -> Self {
        Self {
            target,
            kind: AnimationKind::Translation(destination),
        }
    }

    pub const fn matching(target: GemId) -> Self {
        Self {
            target,
            kind: AnimationKind::Matching,
        }
    }
}

pub type AnimationBatch = Vec<AnimationItem>;

/// Snapshot of the queue for debug overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub in_flight: usize,
    pub pending_batches: usize,
    /// Kind of the most recently released batch's first item.
    pub last_released: Option<ReleasedKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasedKind {
    Translation,
    Matching,
}

#[derive(Debug, Default)]
pub struct AnimationQueue {
    pending: VecDeque<AnimationBatch>,
    in_flight: usize,
    last_released: Option<ReleasedKind>,
}

impl AnimationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch. Empty batches are dropped; they would release without anything to wait on.
    pub fn enqueue(&mut self, batch: AnimationBatch) {
        if batch.is_empty() {
            return;
        }
        log::debug!(
            "enqueue batch of {} item(s), {} pending",
            batch.len(),
            self.pending.len() + 1
        );
        self.pending.push_back(batch);
    }

    /// Release the head batch if nothing is in flight. The caller must report one
    /// [`complete`](Self::complete) per returned item.
    pub fn next_batch(&mut self) -> Option<AnimationBatch> {
        if self.in_flight != 0 {
            return None;
        }
        let batch = self.pending.pop_front()?;
        self.in_flight = batch.len();
        self.last_released = batch.first().map(|item| match item.kind {
            AnimationKind::Translation(_) => ReleasedKind::Translation,
            AnimationKind::Matching => ReleasedKind::Matching,
        });
        log::debug!("release batch of {} item(s)", batch.len());
        Some(batch)
    }

    /// One item of the released batch finished.
    pub fn complete(&mut self) {
        if self.in_flight == 0 {
            log::warn!("animation completion reported with nothing in flight");
            return;
        }
        self.in_flight -= 1;
    }

    /// True when no released item is still running. Pending batches may remain.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }

    /// True when nothing is running and nothing is waiting.
    pub fn is_drained(&self) -> bool {
        self.in_flight == 0 && self.pending.is_empty()
    }

    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    #[inline]
    pub fn pending_batches(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            in_flight: self.in_flight,
            pending_batches: self.pending.len(),
            last_released: self.last_released,
        }
    }

    /// Forget everything, including in-flight items.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.in_flight = 0;
        self.last_released = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(ids: &[u32]) -> AnimationBatch {
        ids.iter().map(|&i| AnimationItem::matching(GemId(i))).collect()
    }

    #[test]
    fn test_releases_in_fifo_order() {
        let mut q = AnimationQueue::new();
        q.enqueue(batch(&[1]));
        q.enqueue(batch(&[2, 3]));

        let first = q.next_batch().unwrap();
        assert_eq!(first[0].target, GemId(1));
        q.complete();

        let second = q.next_batch().unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].target, GemId(2));
    }

    #[test]
    fn test_holds_next_batch_until_in_flight_drains() {
        let mut q = AnimationQueue::new();
        q.enqueue(batch(&[1, 2]));
        q.enqueue(batch(&[3]));

        assert!(q.next_batch().is_some());
        assert_eq!(q.in_flight(), 2);
        assert!(q.next_batch().is_none());

        q.complete();
        assert!(!q.is_idle());
        assert!(q.next_batch().is_none());

        q.complete();
        assert!(q.is_idle());
        assert!(!q.is_drained());
        assert_eq!(q.next_batch().map(|b| b[0].target), Some(GemId(3)));
    }

    #[test]
    fn test_empty_batch_is_dropped() {
        let mut q = AnimationQueue::new();
        q.enqueue(Vec::new());
        assert_eq!(q.pending_batches(), 0);
        assert!(q.next_batch().is_none());
    }

    #[test]
    fn test_extra_completion_does_not_underflow() {
        let mut q = AnimationQueue::new();
        q.complete();
        assert_eq!(q.in_flight(), 0);
    }

    #[test]
    fn test_stats_track_last_release() {
        let mut q = AnimationQueue::new();
        q.enqueue(vec![AnimationItem::translation(GemId(0), Vec2::new(1.0, 2.0))]);
        q.next_batch();
        let stats = q.stats();
        assert_eq!(stats.in_flight, 1);
        assert_eq!(stats.pending_batches, 0);
        assert_eq!(stats.last_released, Some(ReleasedKind::Translation));
    }
}
