// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The compute tile attached to the LOCAL port of each router.

use std::rc::Rc;

use noc_track::debug;
use noc_track::entity::Entity;

use crate::mesh::NodeId;
use crate::packet::{Packet, PacketId};
use crate::router::port::VcRef;

/// A data packet delivered to its destination node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketArrival {
    pub packet: PacketId,
    pub src: NodeId,
    pub dst: NodeId,
    pub size_bytes: usize,
    pub created: u64,
    pub arrived: u64,
}

impl PacketArrival {
    #[must_use]
    pub fn latency(&self) -> u64 {
        self.arrived - self.created
    }
}

pub struct Node {
    pub entity: Rc<Entity>,
    id: NodeId,
    packets_received: u64,
    bytes_received: u64,
    total_latency: u64,
    max_latency: u64,
}

impl Node {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, id: NodeId) -> Self {
        Self {
            entity: Rc::new(Entity::new(parent, &format!("node{id}"))),
            id,
            packets_received: 0,
            bytes_received: 0,
            total_latency: 0,
            max_latency: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Called once the tail flit of a data packet addressed to this node
    /// has left the router through input channel `vc`.
    pub fn handle_dest_arrived(&mut self, packet: &Packet, vc: VcRef, now: u64) -> PacketArrival {
        assert_eq!(packet.dst, self.id, "{packet} delivered to node {}", self.id);
        let arrival = PacketArrival {
            packet: packet.id,
            src: packet.src,
            dst: packet.dst,
            size_bytes: packet.size_bytes,
            created: packet.created,
            arrived: now,
        };
        let latency = arrival.latency();
        debug!(self.entity ; "{packet} arrived via {vc} after {latency} cycles");

        self.packets_received += 1;
        self.bytes_received += packet.size_bytes as u64;
        self.total_latency += latency;
        self.max_latency = self.max_latency.max(latency);
        arrival
    }

    #[must_use]
    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    #[must_use]
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    #[must_use]
    pub fn total_latency(&self) -> u64 {
        self.total_latency
    }

    #[must_use]
    pub fn max_latency(&self) -> u64 {
        self.max_latency
    }
}
