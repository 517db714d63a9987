// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Ant-colony optimisation routing.
//!
//! Every router hosts an [AntNetAgent] with a
//! [RoutingTable](routing_table::RoutingTable) of pheromones. Agents
//! periodically launch forward ants that follow the strongest pheromone
//! towards a random destination, recording their path. At the destination a
//! backward ant retraces that path and, at each router it passes, reinforces
//! the neighbour the forward ant used.
//!
//! Data packets and forward ants choose among the legal minimal directions of
//! the odd-even turn model, so learned routes never leave its deadlock-free
//! set. Backward ants may turn where odd-even forbids it and therefore travel
//! in their own virtual channel (see
//! [VcPartition](crate::router::port::VcPartition)).

pub mod agent;
pub mod ant;
pub mod routing_table;

use crate::config::AcoConfig;
use crate::mesh::{Direction, Mesh, NodeId};
use crate::packet::{Packet, PacketKind};
use crate::routing::Route;
use crate::routing::aco::agent::AntNetAgent;
use crate::routing::odd_even::candidates;

pub struct AcoRouting {
    mesh: Mesh,
    agents: Vec<AntNetAgent>,
}

impl AcoRouting {
    #[must_use]
    pub fn new(mesh: Mesh, config: &AcoConfig, seed: u64) -> Self {
        let agents = (0..mesh.num_nodes())
            .map(|node| AntNetAgent::new(&mesh, node, config, seed))
            .collect();
        Self { mesh, agents }
    }

    fn strongest(&self, src: NodeId, at: NodeId, dst: NodeId) -> Direction {
        let legal = candidates(&self.mesh, src, at, dst);
        self.agents[at]
            .table()
            .best_of(dst, &legal)
            .unwrap_or(Direction::Local)
    }

    fn direction(&self, from: NodeId, to: NodeId) -> Direction {
        match self.mesh.direction_to(from, to) {
            Some(direction) => direction,
            None => panic!("ant path jumps from {from} to non-neighbour {to}"),
        }
    }
}

impl Route for AcoRouting {
    fn route(&mut self, at: NodeId, packet: &mut Packet) -> Direction {
        let (src, dst) = (packet.src, packet.dst);
        match &mut packet.kind {
            PacketKind::Data => self.strongest(src, at, dst),
            PacketKind::ForwardAnt(ant) => {
                ant.visit(at);
                self.strongest(src, at, dst)
            }
            PacketKind::BackwardAnt(ant) => {
                let hop = ant.visit(at);
                if let Some(forward_next) = hop.forward_next {
                    let used = self.direction(at, forward_next);
                    self.agents[at].update(ant.destination, used);
                }
                match hop.backward_next {
                    Some(next) => self.direction(at, next),
                    None => Direction::Local,
                }
            }
        }
    }

    fn ant_agent(&self, node: NodeId) -> Option<&AntNetAgent> {
        self.agents.get(node)
    }

    fn ant_agent_mut(&mut self, node: NodeId) -> Option<&mut AntNetAgent> {
        self.agents.get_mut(node)
    }
}
