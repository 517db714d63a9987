// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::collections::HashMap;

use itertools::Itertools;
use noc_models::config::RoutingAlgorithm;
use noc_models::flit::FlitState;
use noc_models::network::Network;
use noc_models::test_helpers::{build_network, small_config};
use noc_models::traffic::{TrafficGenerator, TrafficPattern};

fn assert_credit_bound(network: &Network) {
    let max = network.config().max_input_buffer_size;
    for router in network.routers() {
        for port in router.output_ports() {
            for ovc in &port.vcs {
                assert!(ovc.credits.available() <= max);
            }
        }
    }
}

#[test]
fn conservation_and_credit_bound_every_cycle() {
    let config = small_config(4, 4, RoutingAlgorithm::OddEven);
    let (mut engine, mut network) = build_network(file!(), &config);
    let mut traffic = TrafficGenerator::new(TrafficPattern::UniformRandom, 0.05, 24, 7);

    for cycle in 0..4000 {
        if cycle < 1000 {
            traffic.generate(&mut network).unwrap();
        } else if network.is_idle() {
            break;
        }
        engine.step(&mut network).unwrap();

        let stats = network.stats();
        let accounted = stats.flits_arrived
            + network.flits_in_buffers()
            + network.flits_on_links()
            + network.flits_queued();
        assert_eq!(stats.flits_injected, accounted, "flits lost at cycle {cycle}");
        assert_eq!(stats.flits_in_flight(), accounted - stats.flits_arrived);
        assert_credit_bound(&network);
    }

    assert!(network.is_idle());
    let stats = network.stats();
    assert!(stats.packets_injected > 0);
    assert_eq!(stats.packets_arrived, stats.packets_injected);
    assert_eq!(stats.flits_arrived, stats.flits_injected);
}

#[test]
fn wormhole_flits_never_interleave() {
    let config = small_config(3, 3, RoutingAlgorithm::Xy);
    let (mut engine, mut network) = build_network(file!(), &config);
    network.record_transitions();

    // Everybody sends to the centre so that channels are contended.
    let centre = 4;
    for _ in 0..4 {
        for src in (0..9).filter(|&n| n != centre) {
            network.inject_packet(src, centre, 32).unwrap();
        }
    }
    engine
        .run_until(&mut network, 5000, |network| network.is_idle())
        .unwrap();

    // Flits leaving each input channel, in order.
    let mut departures: HashMap<_, Vec<_>> = HashMap::new();
    for t in network.transitions() {
        if matches!(
            t.state,
            FlitState::LinkTraversal | FlitState::DestinationArrived
        ) {
            departures
                .entry((t.node, t.vc))
                .or_default()
                .push((t.packet, t.seq));
        }
    }
    assert!(!departures.is_empty());

    let num_flits = config.num_flits(32);
    for ((node, vc), flits) in &departures {
        let groups = flits.iter().group_by(|(packet, _)| *packet);
        for (packet, group) in &groups {
            let seqs: Vec<usize> = group.map(|(_, seq)| *seq).collect();
            assert_eq!(
                seqs,
                (0..num_flits).collect::<Vec<_>>(),
                "packet {packet} interleaved at node {node} {vc}"
            );
        }
    }
}

#[test]
fn full_injection_queue_throttles() {
    let config = small_config(2, 1, RoutingAlgorithm::Xy);
    let (mut engine, mut network) = build_network(file!(), &config);

    let accepted = (0..20)
        .filter(|_| network.inject_packet(0, 1, 8).unwrap().is_some())
        .count();
    assert_eq!(accepted, config.max_injection_buffer_size);
    assert_eq!(network.router(0).injection_queue_len(), accepted);

    engine.run_for(&mut network, 1).unwrap();
    // One packet per LOCAL channel is split into flits each cycle.
    assert_eq!(
        network.router(0).injection_queue_len(),
        accepted - config.num_virtual_channels
    );
    assert!(network.inject_packet(0, 1, 8).unwrap().is_some());

    engine
        .run_until(&mut network, 500, |network| network.is_idle())
        .unwrap();
    assert_eq!(network.stats().packets_arrived, accepted as u64 + 1);
}
