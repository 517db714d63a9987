// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Library of primitives used to build routers.
//!
//! None of these depend on NoC-specific types:
//!  - [arbiter]: a generic round-robin arbiter.
//!  - [buffer]: a bounded FIFO with trace support.
//!  - [flow_controls]: credit accounting.

pub mod arbiter;
pub mod buffer;
pub mod flow_controls;
