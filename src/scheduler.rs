//! Time-ordered message queue
//!
//! Entries are kept sorted by `(timestamp, insertion sequence)` so that
//! messages with identical timestamps fire in insertion order. The queue is a
//! plain sorted deque: insertion is a binary search, the block drain pops from
//! the front, and cancellation removes the entry that still holds the given
//! heap message.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::graph::ObjectId;
use crate::message::Message;

#[derive(Debug)]
pub(crate) struct Entry {
    pub timestamp: f64,
    pub seq: u64,
    pub target: ObjectId,
    pub outlet: usize,
    pub message: Arc<Message>,
}

#[derive(Default)]
pub(crate) struct Scheduler {
    queue: VecDeque<Entry>,
    next_seq: u64,
}

impl Scheduler {
    /// Queue a heap message for delivery from `target`'s `outlet` at the
    /// message's own timestamp. The scheduler holds one reservation (its
    /// `Arc` clone) until the entry fires or is cancelled.
    pub fn insert(&mut self, target: ObjectId, outlet: usize, message: Arc<Message>) {
        let timestamp = message.timestamp;
        let seq = self.next_seq;
        self.next_seq += 1;
        // equal timestamps sort after existing entries, keeping delivery stable
        let at = self.queue.partition_point(|e| e.timestamp <= timestamp);
        self.queue.insert(
            at,
            Entry {
                timestamp,
                seq,
                target,
                outlet,
                message,
            },
        );
    }

    /// Pop the head entry if it is due before `limit` (exclusive). Entries
    /// with timestamps already in the past are due immediately rather than
    /// wedging the head of the queue.
    pub fn pop_due(&mut self, limit: f64) -> Option<Entry> {
        if self.queue.front()?.timestamp < limit {
            self.queue.pop_front()
        } else {
            None
        }
    }

    /// Remove the queued entry matching `(target, outlet)` that still holds
    /// exactly this heap message, dropping its reservation. Returns false if
    /// the entry already fired or was never queued.
    pub fn cancel(&mut self, target: ObjectId, outlet: usize, handle: &Arc<Message>) -> bool {
        if let Some(at) = self.queue.iter().position(|e| {
            e.target == target && e.outlet == outlet && Arc::ptr_eq(&e.message, handle)
        }) {
            self.queue.remove(at);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap(ts: f64, v: f32) -> Arc<Message> {
        Message::float(ts, v).copy_to_heap()
    }

    #[test]
    fn test_ordered_by_timestamp() {
        let mut sched = Scheduler::default();
        sched.insert(0, 0, heap(20.0, 1.0));
        sched.insert(0, 0, heap(10.0, 2.0));
        sched.insert(0, 0, heap(15.0, 3.0));

        let order: Vec<f64> = std::iter::from_fn(|| sched.pop_due(f64::MAX))
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(order, vec![10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_equal_timestamps_fire_in_insertion_order() {
        let mut sched = Scheduler::default();
        sched.insert(0, 0, heap(5.0, 1.0));
        sched.insert(0, 0, heap(5.0, 2.0));
        sched.insert(0, 0, heap(5.0, 3.0));

        let values: Vec<f32> = std::iter::from_fn(|| sched.pop_due(f64::MAX))
            .map(|e| e.message.float_at(0).unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_pop_due_respects_window() {
        let mut sched = Scheduler::default();
        sched.insert(0, 0, heap(10.0, 0.0));
        assert!(sched.pop_due(10.0).is_none());
        assert!(sched.pop_due(10.1).is_some());
    }

    #[test]
    fn test_late_entry_still_due() {
        let mut sched = Scheduler::default();
        sched.insert(0, 0, heap(-5.0, 0.0));
        assert!(sched.pop_due(0.0).is_some());
    }

    #[test]
    fn test_cancel_drops_reservation() {
        let mut sched = Scheduler::default();
        let msg = heap(10.0, 0.0);
        sched.insert(3, 1, msg.clone());
        assert_eq!(Arc::strong_count(&msg), 2);

        assert!(sched.cancel(3, 1, &msg));
        assert_eq!(Arc::strong_count(&msg), 1);
        assert!(sched.is_empty());

        // already gone: no-op
        assert!(!sched.cancel(3, 1, &msg));
    }

    #[test]
    fn test_cancel_matches_identity_not_value() {
        let mut sched = Scheduler::default();
        let queued = heap(10.0, 0.0);
        let twin = heap(10.0, 0.0);
        sched.insert(0, 0, queued.clone());
        assert!(!sched.cancel(0, 0, &twin));
        assert_eq!(sched.len(), 1);
    }
}
