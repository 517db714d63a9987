// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The engine that owns simulated time.
//!
//! # Example
//!
//! ```rust
//! use noc_engine::engine::Engine;
//! use noc_engine::scheduler::Scheduler;
//! use noc_engine::traits::Clocked;
//! use noc_engine::types::SimResult;
//!
//! #[derive(Default)]
//! struct Counter {
//!     ticks: u64,
//! }
//!
//! impl Clocked for Counter {
//!     type Event = ();
//!     type Component = ();
//!
//!     fn handle_event(&mut self, _: &mut Scheduler<()>, _: ()) -> SimResult {
//!         Ok(())
//!     }
//!
//!     fn tick(&mut self, _: &mut Scheduler<()>, _: ()) -> SimResult {
//!         self.ticks += 1;
//!         Ok(())
//!     }
//! }
//!
//! let tracker = noc_track::tracker::dev_null_tracker();
//! let mut engine = Engine::new(&tracker);
//! engine.register(());
//! let mut counter = Counter::default();
//! engine.run_for(&mut counter, 10).unwrap();
//! assert_eq!(counter.ticks, 10);
//! ```

use std::rc::Rc;

use noc_track::entity::{Entity, toplevel};
use noc_track::{Tracker, trace};

use crate::scheduler::Scheduler;
use crate::sim_error;
use crate::time::clock::Clock;
use crate::traits::Clocked;
use crate::types::SimResult;

/// Default clock frequency: one cycle per `ns`.
pub const DEFAULT_FREQ_MHZ: f64 = 1000.0;

pub struct Engine<M: Clocked> {
    top: Rc<Entity>,
    clock: Clock,
    scheduler: Scheduler<M::Event>,
    per_cycle: Vec<M::Component>,
}

impl<M: Clocked> Engine<M> {
    #[must_use]
    pub fn new(tracker: &Tracker) -> Self {
        let top = toplevel(tracker, "top");
        let clock = Clock::new(DEFAULT_FREQ_MHZ);
        let scheduler = Scheduler::new(&clock);
        Self {
            top,
            clock,
            scheduler,
            per_cycle: Vec::new(),
        }
    }

    #[must_use]
    pub fn top(&self) -> &Rc<Entity> {
        &self.top
    }

    #[must_use]
    pub fn default_clock(&self) -> Clock {
        self.clock.clone()
    }

    /// Register a component to be ticked every cycle.
    ///
    /// Components are ticked in the order they are registered.
    pub fn register(&mut self, component: M::Component) {
        self.per_cycle.push(component);
    }

    /// Schedule an event from outside the model (e.g. a test stimulus).
    pub fn schedule(&mut self, delay: u64, event: M::Event) {
        self.scheduler.schedule(delay, event);
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.tick_now()
    }

    /// Number of scheduled events that have not been handled yet.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.scheduler.pending()
    }

    /// Run a single cycle.
    pub fn step(&mut self, model: &mut M) -> SimResult {
        let now = self.clock.tick_now();
        self.top.tracker.set_cycle(now);

        while let Some(event) = self.scheduler.pop_due(now) {
            model.handle_event(&mut self.scheduler, event)?;
        }
        for component in &self.per_cycle {
            model.tick(&mut self.scheduler, *component)?;
        }

        self.clock.advance();
        Ok(())
    }

    /// Run for a fixed number of cycles.
    pub fn run_for(&mut self, model: &mut M, cycles: u64) -> SimResult {
        for _ in 0..cycles {
            self.step(model)?;
        }
        Ok(())
    }

    /// Run until `done` returns true, checked before every cycle.
    ///
    /// Returns an error if `done` is still false after `max_cycles`.
    pub fn run_until<F>(&mut self, model: &mut M, max_cycles: u64, mut done: F) -> SimResult
    where
        F: FnMut(&M) -> bool,
    {
        for _ in 0..max_cycles {
            if done(model) {
                trace!(self.top ; "run_until complete at cycle {}", self.now());
                return Ok(());
            }
            self.step(model)?;
        }
        if done(model) {
            return Ok(());
        }
        sim_error!(format!(
            "Condition not reached within {max_cycles} cycles (now {})",
            self.now()
        ))
    }
}
