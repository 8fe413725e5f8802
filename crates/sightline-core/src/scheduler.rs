//! Transition scheduler with a stepped virtual clock.
//!
//! Visual transitions (removal animations, insertion fades) are modeled as
//! fire-and-continue: the mutation that starts one returns immediately, and
//! a completion payload becomes due once the transition's duration has
//! elapsed. The host drives the clock explicitly via
//! [`TransitionScheduler::advance`], which makes completion timing fully
//! deterministic — tests step time instead of sleeping.
//!
//! Completion handlers receive back the payload they scheduled and must
//! re-validate current state before acting on it: the world may have changed
//! between scheduling and completion (the tile may have been revived, the
//! grid reset, and so on).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use sightline_core::TransitionScheduler;
//!
//! let mut scheduler = TransitionScheduler::new();
//! let id = scheduler.schedule(Duration::from_millis(200), "teardown-tile-7");
//!
//! assert!(scheduler.advance(Duration::from_millis(100)).is_empty());
//! let due = scheduler.advance(Duration::from_millis(100));
//! assert_eq!(due, vec![(id, "teardown-tile-7")]);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

use crate::error::{Result, SchedulerError};

new_key_type! {
    /// A unique identifier for a pending transition.
    pub struct TransitionId;
}

/// Internal pending-transition data.
struct TransitionData<P> {
    /// Virtual time at which this transition completes.
    due: Duration,
    /// Completion payload handed back to the caller.
    payload: P,
}

/// An entry in the scheduler queue (min-heap by due time).
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    id: TransitionId,
    due: Duration,
    /// Tie-breaker preserving scheduling order for equal due times.
    seq: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Manages pending transitions against a virtual clock.
///
/// The scheduler maintains a priority queue of transitions ordered by their
/// completion time. Time only moves when [`advance`](Self::advance) is
/// called; there is no wall-clock involvement.
pub struct TransitionScheduler<P> {
    /// All pending transitions.
    transitions: SlotMap<TransitionId, TransitionData<P>>,
    /// Priority queue of completions (min-heap by due time).
    queue: BinaryHeap<QueueEntry>,
    /// Current virtual time.
    now: Duration,
    /// Monotonic sequence counter for FIFO tie-breaking.
    next_seq: u64,
}

impl<P> TransitionScheduler<P> {
    /// Creates a new scheduler with the clock at zero.
    pub fn new() -> Self {
        Self {
            transitions: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            now: Duration::ZERO,
            next_seq: 0,
        }
    }

    /// Returns the current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules a transition completing after `duration`.
    ///
    /// Returns the transition ID that can be used to cancel it.
    pub fn schedule(&mut self, duration: Duration, payload: P) -> TransitionId {
        let due = self.now + duration;
        let id = self.transitions.insert(TransitionData { due, payload });
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(QueueEntry { id, due, seq });
        id
    }

    /// Cancels a pending transition.
    ///
    /// The stale queue entry is skipped when the clock reaches it. Returns
    /// the payload if the transition was still pending.
    pub fn cancel(&mut self, id: TransitionId) -> Result<P> {
        self.transitions
            .remove(id)
            .map(|data| data.payload)
            .ok_or_else(|| SchedulerError::InvalidTransitionId.into())
    }

    /// Checks whether a transition is still pending.
    pub fn is_pending(&self, id: TransitionId) -> bool {
        self.transitions.contains_key(id)
    }

    /// Returns the number of pending transitions.
    pub fn pending_count(&self) -> usize {
        self.transitions.len()
    }

    /// Returns the time until the next completion, if any.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.skip_stale();
        self.queue
            .peek()
            .map(|entry| entry.due.saturating_sub(self.now))
    }

    /// Advances the virtual clock by `delta` and collects completions.
    ///
    /// Returns the `(id, payload)` pairs of every transition whose due time
    /// has been reached, in due-time order (FIFO for equal due times).
    pub fn advance(&mut self, delta: Duration) -> Vec<(TransitionId, P)> {
        self.now += delta;
        let mut completed = Vec::new();

        loop {
            self.skip_stale();
            match self.queue.peek() {
                Some(entry) if entry.due <= self.now => {
                    let entry = self.queue.pop().expect("peeked entry");
                    if let Some(data) = self.transitions.remove(entry.id) {
                        tracing::trace!(
                            target: "sightline_core::scheduler",
                            id = ?entry.id,
                            due = ?entry.due,
                            "transition completed"
                        );
                        completed.push((entry.id, data.payload));
                    }
                }
                _ => break,
            }
        }

        completed
    }

    /// Drops cancelled entries from the front of the queue.
    fn skip_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.transitions.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<P> Default for TransitionScheduler<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_and_advance() {
        let mut scheduler = TransitionScheduler::new();
        let id = scheduler.schedule(Duration::from_millis(50), "a");

        assert!(scheduler.is_pending(id));
        assert_eq!(scheduler.pending_count(), 1);

        // Not due yet.
        assert!(scheduler.advance(Duration::from_millis(40)).is_empty());
        assert!(scheduler.is_pending(id));

        // Due now.
        let done = scheduler.advance(Duration::from_millis(10));
        assert_eq!(done, vec![(id, "a")]);
        assert!(!scheduler.is_pending(id));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = TransitionScheduler::new();
        let id = scheduler.schedule(Duration::from_millis(10), 7u32);

        assert_eq!(scheduler.cancel(id).unwrap(), 7);
        assert!(!scheduler.is_pending(id));
        assert!(scheduler.advance(Duration::from_millis(20)).is_empty());

        // Cancelling again fails.
        assert!(scheduler.cancel(id).is_err());
    }

    #[test]
    fn test_completion_order() {
        let mut scheduler = TransitionScheduler::new();
        let c = scheduler.schedule(Duration::from_millis(30), "c");
        let a = scheduler.schedule(Duration::from_millis(10), "a");
        let b = scheduler.schedule(Duration::from_millis(20), "b");

        let done = scheduler.advance(Duration::from_millis(30));
        let ids: Vec<_> = done.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_fifo_for_equal_due_times() {
        let mut scheduler = TransitionScheduler::new();
        let first = scheduler.schedule(Duration::from_millis(10), 1);
        let second = scheduler.schedule(Duration::from_millis(10), 2);

        let done = scheduler.advance(Duration::from_millis(10));
        assert_eq!(done, vec![(first, 1), (second, 2)]);
    }

    #[test]
    fn test_time_until_next() {
        let mut scheduler = TransitionScheduler::<()>::new();
        assert!(scheduler.time_until_next().is_none());

        scheduler.schedule(Duration::from_millis(100), ());
        assert_eq!(
            scheduler.time_until_next(),
            Some(Duration::from_millis(100))
        );

        scheduler.advance(Duration::from_millis(60));
        assert_eq!(scheduler.time_until_next(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_clock_accumulates_across_advances() {
        let mut scheduler = TransitionScheduler::new();
        scheduler.advance(Duration::from_millis(25));
        let id = scheduler.schedule(Duration::from_millis(25), ());

        assert!(scheduler.advance(Duration::from_millis(20)).is_empty());
        let done = scheduler.advance(Duration::from_millis(5));
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].0, id);
        assert_eq!(scheduler.now(), Duration::from_millis(50));
    }
}
