// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! The cycle-driven engine at the heart of the NoC simulator.
//!
//! Simulated time advances one clock cycle at a time. Within each cycle the
//! [engine](crate::engine::Engine):
//!
//!  1. dispatches every [scheduled](crate::scheduler::Scheduler) event that is
//!     due in this cycle, in the order they were scheduled.
//!  2. calls every registered per-cycle component in registration order.
//!  3. advances the [clock](crate::time::clock::Clock).
//!
//! Models implement [`Clocked`](crate::traits::Clocked) and describe their
//! deferred work as explicit event records rather than captured closures.

pub mod engine;
pub mod scheduler;
pub mod test_helpers;
pub mod time;
pub mod traits;
pub mod types;
