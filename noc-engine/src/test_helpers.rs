// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_track::test_helpers::create_tracker;

use crate::engine::Engine;
use crate::traits::Clocked;

/// Create an [Engine] whose tracker logs everything to
/// `traces/<test file>.log`.
#[must_use]
pub fn start_test<M: Clocked>(full_filepath: &str) -> Engine<M> {
    Engine::new(&create_tracker(full_filepath))
}
