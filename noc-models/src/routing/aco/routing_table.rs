// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Per-router pheromone tables.

use crate::mesh::{Direction, Mesh, NodeId};

/// Desirability of leaving through `neighbor` for one destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pheromone {
    pub neighbor: Direction,
    pub value: f64,
}

/// Maps each destination to a pheromone per neighbour of one router.
///
/// The values for a destination always sum to 1 and each stays in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct RoutingTable {
    node: NodeId,

    /// Indexed by destination node. Empty for `node` itself.
    entries: Vec<Vec<Pheromone>>,
}

impl RoutingTable {
    /// Create a table with every neighbour equally likely.
    #[must_use]
    pub fn new(mesh: &Mesh, node: NodeId) -> Self {
        let neighbors = mesh.neighbors(node);
        let initial = 1.0 / neighbors.len().max(1) as f64;
        let entries = (0..mesh.num_nodes())
            .map(|dest| {
                if dest == node {
                    Vec::new()
                } else {
                    neighbors
                        .iter()
                        .map(|&(neighbor, _)| Pheromone {
                            neighbor,
                            value: initial,
                        })
                        .collect()
                }
            })
            .collect();
        Self { node, entries }
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn pheromones(&self, dest: NodeId) -> &[Pheromone] {
        &self.entries[dest]
    }

    #[must_use]
    pub fn pheromone(&self, dest: NodeId, neighbor: Direction) -> Option<f64> {
        self.entries[dest]
            .iter()
            .find(|p| p.neighbor == neighbor)
            .map(|p| p.value)
    }

    /// Reinforce `used` for `dest` and evaporate all other neighbours.
    pub fn reinforce(&mut self, dest: NodeId, used: Direction, reinforcement_factor: f64) {
        let entry = &mut self.entries[dest];
        assert!(
            entry.iter().any(|p| p.neighbor == used),
            "node {} has no neighbour {used}",
            self.node
        );
        for p in entry.iter_mut() {
            if p.neighbor == used {
                p.value += reinforcement_factor * (1.0 - p.value);
            } else {
                p.value -= reinforcement_factor * p.value;
            }
        }
    }

    /// The candidate with the highest pheromone for `dest`.
    ///
    /// Ties go to the earliest candidate.
    #[must_use]
    pub fn best_of(&self, dest: NodeId, candidates: &[Direction]) -> Option<Direction> {
        let mut best: Option<(Direction, f64)> = None;
        for &candidate in candidates {
            let value = self.pheromone(dest, candidate).unwrap_or(0.0);
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((candidate, value));
            }
        }
        best.map(|(direction, _)| direction)
    }
}
