// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Credit-based flow control.
//!
//! The sender holds one credit per free slot in the receiver's buffer. A
//! credit is consumed when a value is sent and released when the receiver
//! frees the slot again, so the count always stays within `[0, max]`.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditCounter {
    available: usize,
    max: usize,
}

impl CreditCounter {
    /// Create a counter that starts with all `max` credits available.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            available: max,
            max,
        }
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.available
    }

    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    #[must_use]
    pub fn has_credit(&self) -> bool {
        self.available > 0
    }

    /// **Panics** if there is no credit to consume.
    pub fn consume(&mut self) {
        assert!(self.available > 0, "credit consumed with none available");
        self.available -= 1;
    }

    /// **Panics** if this would exceed the maximum.
    pub fn release(&mut self) {
        assert!(
            self.available < self.max,
            "credit released beyond maximum of {}",
            self.max
        );
        self.available += 1;
    }
}

impl fmt::Display for CreditCounter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.available, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_release() {
        let mut credits = CreditCounter::new(2);
        credits.consume();
        credits.consume();
        assert!(!credits.has_credit());
        credits.release();
        assert_eq!(credits.available(), 1);
        assert_eq!(format!("{credits}"), "1/2");
    }

    #[test]
    #[should_panic(expected = "none available")]
    fn underflow() {
        let mut credits = CreditCounter::new(1);
        credits.consume();
        credits.consume();
    }

    #[test]
    #[should_panic(expected = "beyond maximum")]
    fn overflow() {
        let mut credits = CreditCounter::new(1);
        credits.release();
    }
}
