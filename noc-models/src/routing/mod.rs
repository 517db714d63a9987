// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Routing strategies.
//!
//! A strategy is consulted once per packet per router, when the head flit
//! reaches route computation. It returns the output port to use, which is
//! [Direction::Local] once the packet is at its destination.

pub mod aco;
pub mod odd_even;
pub mod xy;

use crate::config::{NocConfig, RoutingAlgorithm};
use crate::mesh::{Direction, Mesh, NodeId};
use crate::packet::Packet;
use crate::routing::aco::AcoRouting;
use crate::routing::aco::agent::AntNetAgent;
use crate::routing::odd_even::OddEvenRouting;
use crate::routing::xy::XyRouting;

pub trait Route {
    /// Choose the output port for `packet` at router `at`.
    ///
    /// The packet is mutable so that control packets can record their path.
    fn route(&mut self, at: NodeId, packet: &mut Packet) -> Direction;

    /// The ant agent hosted at `node`, for strategies that have them.
    fn ant_agent(&self, _node: NodeId) -> Option<&AntNetAgent> {
        None
    }

    fn ant_agent_mut(&mut self, _node: NodeId) -> Option<&mut AntNetAgent> {
        None
    }
}

/// Build the strategy selected by the configuration.
#[must_use]
pub fn build_routing(config: &NocConfig, mesh: Mesh) -> Box<dyn Route> {
    match config.routing {
        RoutingAlgorithm::Xy => Box::new(XyRouting::new(mesh)),
        RoutingAlgorithm::OddEven => Box::new(OddEvenRouting::new(mesh)),
        RoutingAlgorithm::Aco => Box::new(AcoRouting::new(mesh, &config.aco, config.seed)),
    }
}
