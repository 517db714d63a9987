// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Event queue for deferred work.
//!
//! Events are plain records owned by the queue until they fall due. Events
//! due in the same cycle are returned in the order they were scheduled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::time::clock::Clock;

struct Scheduled<E> {
    when: u64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.when == other.when && self.seq == other.seq
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> Ord for Scheduled<E> {
    // Reversed so that the `BinaryHeap` pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .when
            .cmp(&self.when)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct Scheduler<E> {
    clock: Clock,
    queue: BinaryHeap<Scheduled<E>>,
    next_seq: u64,
}

impl<E> Scheduler<E> {
    #[must_use]
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `event` to be handled `delay` cycles from now.
    ///
    /// Work for the current cycle must be done directly, so a `delay` of
    /// zero is a bug in the caller.
    pub fn schedule(&mut self, delay: u64, event: E) {
        assert!(delay >= 1, "events must be scheduled at least one cycle ahead");
        let when = self.clock.tick_now() + delay;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { when, seq, event });
    }

    /// The current cycle.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.tick_now()
    }

    /// Number of events still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Remove the next event that is due at or before `now`.
    pub(crate) fn pop_due(&mut self, now: u64) -> Option<E> {
        if self.queue.peek().is_some_and(|s| s.when <= now) {
            self.queue.pop().map(|s| s.event)
        } else {
            None
        }
    }
}
