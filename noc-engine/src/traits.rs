// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Traits a model implements to be driven by the [Engine](crate::engine::Engine).

use crate::scheduler::Scheduler;
use crate::types::SimResult;

/// A model that is advanced by a global clock.
pub trait Clocked {
    /// Record describing deferred work.
    type Event;

    /// Key identifying a part of the model that runs every cycle.
    type Component: Copy;

    /// Handle an event that has fallen due.
    fn handle_event(&mut self, scheduler: &mut Scheduler<Self::Event>, event: Self::Event)
    -> SimResult;

    /// Run one cycle of the given component.
    fn tick(
        &mut self,
        scheduler: &mut Scheduler<Self::Event>,
        component: Self::Component,
    ) -> SimResult;
}
