// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Packets: the unit handed to the network by a node.

use std::fmt;

use noc_track::Id;

use crate::mesh::NodeId;
use crate::router::port::VcClass;
use crate::routing::aco::ant::{BackwardAnt, ForwardAnt};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketId(pub u64);

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out monotonically increasing [PacketId]s.
///
/// Owned by the network so that data and ant packets share one sequence.
#[derive(Debug, Default)]
pub struct PacketIdGenerator {
    next: u64,
}

impl PacketIdGenerator {
    pub fn next_id(&mut self) -> PacketId {
        let id = PacketId(self.next);
        self.next += 1;
        id
    }
}

/// What a packet carries.
#[derive(Clone, Debug, PartialEq)]
pub enum PacketKind {
    Data,
    ForwardAnt(ForwardAnt),
    BackwardAnt(BackwardAnt),
}

#[derive(Clone, Debug)]
pub struct Packet {
    pub id: PacketId,

    /// Unique ID used for tracing.
    pub tag: Id,
    pub src: NodeId,
    pub dst: NodeId,
    pub size_bytes: usize,
    pub num_flits: usize,

    /// Cycle at which the packet was handed to the network.
    pub created: u64,
    pub kind: PacketKind,
}

impl Packet {
    #[must_use]
    pub fn is_ant(&self) -> bool {
        !matches!(self.kind, PacketKind::Data)
    }

    #[must_use]
    pub fn vc_class(&self) -> VcClass {
        match self.kind {
            PacketKind::BackwardAnt(_) => VcClass::AntReturn,
            PacketKind::Data | PacketKind::ForwardAnt(_) => VcClass::Shared,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            PacketKind::Data => "packet",
            PacketKind::ForwardAnt(_) => "forward ant",
            PacketKind::BackwardAnt(_) => "backward ant",
        };
        write!(
            f,
            "{kind} {} {}->{} ({} bytes, {} flits)",
            self.id, self.src, self.dst, self.size_bytes, self.num_flits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut ids = PacketIdGenerator::default();
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first, PacketId(0));
        assert!(second > first);
    }
}
