// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Flow-control primitives.

pub mod credit;
