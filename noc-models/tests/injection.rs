// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_engine::engine::Engine;
use noc_models::config::{NocConfig, RoutingAlgorithm};
use noc_models::mesh::Direction;
use noc_models::network::Network;
use noc_models::test_helpers::{build_network, small_config};
use noc_track::test_init;
use noc_track::tracker::dev_null_tracker;

#[test]
fn invalid_packets_are_errors() {
    let config = small_config(2, 2, RoutingAlgorithm::Xy);
    let (_engine, mut network) = build_network(file!(), &config);

    let err = network.inject_packet(0, 4, 8).unwrap_err();
    assert!(err.0.contains("outside"));
    let err = network.inject_packet(7, 1, 8).unwrap_err();
    assert!(err.0.contains("outside"));
    let err = network.inject_packet(2, 2, 8).unwrap_err();
    assert!(err.0.contains("both 2"));

    // Four flits fit a buffer of four, five never will.
    assert!(network.inject_packet(0, 1, 32).unwrap().is_some());
    let err = network.inject_packet(0, 1, 33).unwrap_err();
    assert!(err.0.contains("can never fit"));

    assert_eq!(network.stats().packets_injected, 1);
}

#[test]
fn ants_need_aco_routing() {
    let config = small_config(2, 2, RoutingAlgorithm::OddEven);
    let (_engine, mut network) = build_network(file!(), &config);
    assert!(network.launch_ant(0, 3).is_err());
}

#[test]
fn refused_ants_are_counted() {
    let mut config = small_config(2, 1, RoutingAlgorithm::Aco);
    config.aco.ant_period = 0;
    config.max_injection_buffer_size = 1;
    let (_engine, mut network) = build_network(file!(), &config);

    assert!(network.launch_ant(0, 1).unwrap().is_some());
    assert!(network.launch_ant(0, 1).unwrap().is_none());
    assert_eq!(network.stats().ants_launched, 1);
    assert_eq!(network.stats().ants_dropped, 1);
}

#[test]
fn zero_sized_packets_still_have_a_flit() {
    let config = small_config(2, 1, RoutingAlgorithm::Xy);
    let (mut engine, mut network) = build_network(file!(), &config);

    let id = network.inject_packet(1, 0, 0).unwrap().unwrap();
    assert_eq!(network.packet(id).unwrap().num_flits, 1);
    engine
        .run_until(&mut network, 100, |network| network.is_idle())
        .unwrap();
    assert_eq!(network.stats().flits_arrived, 1);
}

#[test]
fn invalid_config_is_rejected() {
    let mut engine = Engine::new(&dev_null_tracker());
    let top = engine.top().clone();
    let config = NocConfig {
        num_virtual_channels: 0,
        ..NocConfig::default()
    };
    assert!(Network::new_and_register(&mut engine, &top, "noc", &config).is_err());
}

#[test]
fn packets_enter_whole_or_not_at_all() {
    let mut config = small_config(2, 1, RoutingAlgorithm::Xy);
    config.num_virtual_channels = 1;
    let (mut engine, mut network) = build_network(file!(), &config);

    // Two flits then three flits into one LOCAL buffer of four.
    network.inject_packet(0, 1, 16).unwrap().unwrap();
    let second = network.inject_packet(0, 1, 24).unwrap().unwrap();

    let mut admitted_at = None;
    let mut waited_with_room = false;
    for cycle in 0..20 {
        engine.step(&mut network).unwrap();
        let buffer = &network.router(0).input_port(Direction::Local).vcs[0].buffer;
        let held = buffer.iter().filter(|flit| flit.packet == second).count();
        match (admitted_at, held) {
            (None, 0) => waited_with_room |= buffer.free_slots() == 2,
            (None, 3) => admitted_at = Some(cycle),
            (None, n) => panic!("{n} flits of a 3-flit packet admitted at cycle {cycle}"),
            (Some(_), _) => {}
        }
    }
    assert!(waited_with_room);
    // The first head leaves the buffer on link traversal at cycle 5.
    assert_eq!(admitted_at, Some(5));

    engine
        .run_until(&mut network, 100, |network| network.is_idle())
        .unwrap();
    assert_eq!(network.stats().packets_arrived, 2);
}

fn ids_after<'a>(events: &'a [String], source: u64, marker: &str) -> Vec<&'a str> {
    let prefix = format!("{source}: {marker}");
    events
        .iter()
        .filter_map(|event| event.strip_prefix(&prefix))
        .map(|rest| rest.split(',').next().unwrap_or(rest))
        .collect()
}

#[test]
fn every_flit_created_is_destroyed_at_its_destination() {
    let (test_tracker, tracker) = test_init!(1);
    let mut engine = Engine::new(&tracker);
    let top = engine.top().clone();
    let config = small_config(3, 1, RoutingAlgorithm::Xy);
    let mut network = Network::new_and_register(&mut engine, &top, "noc", &config).unwrap();
    test_tracker.take_events();

    network.inject_packet(0, 2, 24).unwrap().unwrap();
    engine
        .run_until(&mut network, 100, |network| network.is_idle())
        .unwrap();

    let events = test_tracker.take_events();
    let created = ids_after(&events, network.router(0).entity.id.0, "created ");
    assert_eq!(created.len(), 3);
    assert_eq!(
        ids_after(&events, network.router(2).entity.id.0, "destroyed "),
        created
    );
}
