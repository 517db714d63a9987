// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Synthetic traffic sources.

use noc_engine::types::SimError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::mesh::{Mesh, NodeId};
use crate::network::Network;

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrafficPattern {
    #[default]
    /// Every other node is equally likely
    UniformRandom,

    /// Node (x, y) sends to node (y, x)
    Transpose,

    /// Node (x, y) sends to node (W-1-x, H-1-y)
    BitComplement,
}

impl TrafficPattern {
    /// The destination for a packet from `src`, or `None` if the pattern maps
    /// `src` onto itself.
    pub fn destination(self, mesh: &Mesh, src: NodeId, rng: &mut StdRng) -> Option<NodeId> {
        let (x, y) = mesh.coords(src);
        let dst = match self {
            TrafficPattern::UniformRandom => {
                if mesh.num_nodes() < 2 {
                    return None;
                }
                let dst = rng.gen_range(0..mesh.num_nodes() - 1);
                if dst >= src { dst + 1 } else { dst }
            }
            TrafficPattern::Transpose => {
                if y >= mesh.width() || x >= mesh.height() {
                    return None;
                }
                mesh.node_at(y, x)
            }
            TrafficPattern::BitComplement => {
                mesh.node_at(mesh.width() - 1 - x, mesh.height() - 1 - y)
            }
        };
        (dst != src).then_some(dst)
    }
}

/// Offers packets to every node with a fixed probability per cycle.
pub struct TrafficGenerator {
    pattern: TrafficPattern,

    /// Probability that a node offers a packet in a cycle.
    injection_rate: f64,
    packet_size: usize,
    rng: StdRng,
    offered: u64,
    refused: u64,
}

impl TrafficGenerator {
    #[must_use]
    pub fn new(pattern: TrafficPattern, injection_rate: f64, packet_size: usize, seed: u64) -> Self {
        Self {
            pattern,
            injection_rate: injection_rate.clamp(0.0, 1.0),
            packet_size,
            rng: StdRng::seed_from_u64(seed),
            offered: 0,
            refused: 0,
        }
    }

    /// Offer this cycle's packets to the network.
    ///
    /// Packets refused by a full injection queue are counted and not retried.
    pub fn generate(&mut self, network: &mut Network) -> Result<(), SimError> {
        let mesh = *network.mesh();
        for src in 0..mesh.num_nodes() {
            if !self.rng.gen_bool(self.injection_rate) {
                continue;
            }
            let Some(dst) = self.pattern.destination(&mesh, src, &mut self.rng) else {
                continue;
            };
            self.offered += 1;
            if network.inject_packet(src, dst, self.packet_size)?.is_none() {
                self.refused += 1;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn offered(&self) -> u64 {
        self.offered
    }

    #[must_use]
    pub fn refused(&self) -> u64 {
        self.refused
    }
}
