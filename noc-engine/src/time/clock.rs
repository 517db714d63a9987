// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module represents the time during a simulation.
//!
//! Time is a count of whole clock cycles. A [Clock] is a cheap handle that can
//! be cloned into any model that needs to read the current cycle.

use std::cell::Cell;
use std::rc::Rc;

/// Shared state between a [Clock] and all of its clones.
struct ClockState {
    now: Cell<u64>,
}

#[derive(Clone)]
/// State representing a clock.
pub struct Clock {
    /// Frequency of the clock in MHz.
    freq_mhz: f64,

    shared_state: Rc<ClockState>,
}

impl Clock {
    /// Create a new [Clock] at the specified frequency.
    #[must_use]
    pub fn new(freq_mhz: f64) -> Self {
        Self {
            freq_mhz,
            shared_state: Rc::new(ClockState { now: Cell::new(0) }),
        }
    }

    /// Returns the clocks frequency in MHz.
    #[must_use]
    pub fn freq_mhz(&self) -> f64 {
        self.freq_mhz
    }

    /// Returns the current cycle.
    #[must_use]
    pub fn tick_now(&self) -> u64 {
        self.shared_state.now.get()
    }

    /// Returns the current time in `ns`.
    #[must_use]
    pub fn time_now_ns(&self) -> f64 {
        self.to_ns(self.tick_now())
    }

    /// Convert the given cycle to a time in `ns` for this clock.
    #[must_use]
    pub fn to_ns(&self, tick: u64) -> f64 {
        tick as f64 / self.freq_mhz * 1000.0
    }

    pub(crate) fn advance(&self) {
        self.shared_state.now.set(self.tick_now() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let clock = Clock::new(500.0);
        let other = clock.clone();
        clock.advance();
        clock.advance();
        assert_eq!(other.tick_now(), 2);
        assert_eq!(other.time_now_ns(), 4.0);
    }
}
