// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The ant agent hosted by each router.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AcoConfig;
use crate::mesh::{Direction, Mesh, NodeId};
use crate::routing::aco::routing_table::RoutingTable;

pub struct AntNetAgent {
    node: NodeId,
    num_nodes: usize,
    table: RoutingTable,
    ant_period: u64,
    reinforcement_factor: f64,
    rng: StdRng,
}

impl AntNetAgent {
    #[must_use]
    pub fn new(mesh: &Mesh, node: NodeId, config: &AcoConfig, seed: u64) -> Self {
        Self {
            node,
            num_nodes: mesh.num_nodes(),
            table: RoutingTable::new(mesh, node),
            ant_period: config.ant_period,
            reinforcement_factor: config.reinforcement_factor,
            rng: StdRng::seed_from_u64(seed.wrapping_add(node as u64)),
        }
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Returns the destination of a new forward ant if one is due this cycle.
    pub fn tick(&mut self, now: u64) -> Option<NodeId> {
        if self.ant_period == 0 || now == 0 || now % self.ant_period != 0 {
            return None;
        }
        self.random_destination()
    }

    /// Pick a destination other than this node.
    pub fn random_destination(&mut self) -> Option<NodeId> {
        if self.num_nodes < 2 {
            return None;
        }
        let dest = self.rng.gen_range(0..self.num_nodes - 1);
        Some(if dest >= self.node { dest + 1 } else { dest })
    }

    /// Apply the update carried by a backward ant.
    pub fn update(&mut self, dest: NodeId, used: Direction) {
        self.table.reinforce(dest, used, self.reinforcement_factor);
    }
}
