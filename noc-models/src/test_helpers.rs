// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_engine::engine::Engine;
use noc_engine::test_helpers::start_test;

use crate::config::{NocConfig, RoutingAlgorithm};
use crate::network::Network;

/// Build a network whose trace goes to `traces/<test file>.log`.
#[must_use]
pub fn build_network(full_filepath: &str, config: &NocConfig) -> (Engine<Network>, Network) {
    let mut engine = start_test(full_filepath);
    let top = engine.top().clone();
    let network = Network::new_and_register(&mut engine, &top, "noc", config).unwrap();
    (engine, network)
}

/// A mesh with short buffers so that back-pressure happens quickly.
#[must_use]
pub fn small_config(width: usize, height: usize, routing: RoutingAlgorithm) -> NocConfig {
    NocConfig {
        mesh_width: width,
        mesh_height: height,
        num_virtual_channels: 2,
        max_input_buffer_size: 4,
        max_injection_buffer_size: 8,
        link_width: 8,
        link_delay: 1,
        routing,
        ..NocConfig::default()
    }
}
