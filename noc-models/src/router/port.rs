// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Router ports and their virtual channels.
//!
//! Every router has an input and an output port for each [Direction]. Ports
//! on the edge of the mesh exist but are never routed to.

use std::fmt;
use std::rc::Rc;

use noc_components::buffer::InputBuffer;
use noc_components::flow_controls::credit::CreditCounter;
use noc_track::entity::Entity;

use crate::config::{NocConfig, RoutingAlgorithm};
use crate::flit::Flit;
use crate::mesh::Direction;

/// Identifies one virtual channel of one port within a router.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VcRef {
    pub port: Direction,
    pub vc: usize,
}

impl VcRef {
    #[must_use]
    pub fn new(port: Direction, vc: usize) -> Self {
        Self { port, vc }
    }
}

impl fmt::Display for VcRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.port, self.vc)
    }
}

/// The virtual channels a packet may occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VcClass {
    /// Data packets and forward ants.
    Shared,

    /// Backward ants.
    AntReturn,
}

/// Splits the channels of every port between the [VcClass]es.
///
/// Backward ants retrace a forward path in reverse, which can take turns the
/// odd-even model forbids. With ACO routing the highest channel is kept for
/// them so that their dependencies can never close a cycle with data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VcPartition {
    ant_return_vc: Option<usize>,
}

impl VcPartition {
    #[must_use]
    pub fn new(config: &NocConfig) -> Self {
        let ant_return_vc = match config.routing {
            RoutingAlgorithm::Aco => Some(config.num_virtual_channels - 1),
            RoutingAlgorithm::Xy | RoutingAlgorithm::OddEven => None,
        };
        Self { ant_return_vc }
    }

    /// Whether a packet of `class` may use channel `vc`.
    #[must_use]
    pub fn allows(&self, class: VcClass, vc: usize) -> bool {
        match self.ant_return_vc {
            None => true,
            Some(reserved) => (class == VcClass::AntReturn) == (vc == reserved),
        }
    }
}

pub struct InputVirtualChannel {
    pub id: usize,
    pub port: Direction,
    pub buffer: InputBuffer<Flit>,

    /// Output direction of the packet at the front, once route-computed.
    pub route: Option<Direction>,

    /// The downstream channel this one is bound to.
    pub output_vc: Option<VcRef>,
}

impl InputVirtualChannel {
    fn new(parent: &Rc<Entity>, port: Direction, id: usize, capacity: usize) -> Self {
        Self {
            id,
            port,
            buffer: InputBuffer::new(parent, &format!("vc{id}"), capacity),
            route: None,
            output_vc: None,
        }
    }

    #[must_use]
    pub fn vc_ref(&self) -> VcRef {
        VcRef::new(self.port, self.id)
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.output_vc.is_some()
    }
}

pub struct OutputVirtualChannel {
    pub id: usize,
    pub port: Direction,

    /// The upstream channel currently holding this one.
    pub input_vc: Option<VcRef>,

    /// Free slots in the downstream input buffer.
    pub credits: CreditCounter,
}

impl OutputVirtualChannel {
    #[must_use]
    pub fn vc_ref(&self) -> VcRef {
        VcRef::new(self.port, self.id)
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.input_vc.is_some()
    }
}

pub struct InputPort {
    pub entity: Rc<Entity>,
    pub direction: Direction,
    pub vcs: Vec<InputVirtualChannel>,
}

impl InputPort {
    #[must_use]
    pub fn new(
        parent: &Rc<Entity>,
        direction: Direction,
        num_vcs: usize,
        buffer_size: usize,
    ) -> Self {
        let entity = Rc::new(Entity::new(parent, &format!("in_{direction}")));
        let vcs = (0..num_vcs)
            .map(|id| InputVirtualChannel::new(&entity, direction, id, buffer_size))
            .collect();
        Self {
            entity,
            direction,
            vcs,
        }
    }

    /// Flits currently buffered on all channels of this port.
    #[must_use]
    pub fn fill_level(&self) -> usize {
        self.vcs.iter().map(|vc| vc.buffer.fill_level()).sum()
    }
}

pub struct OutputPort {
    pub direction: Direction,
    pub vcs: Vec<OutputVirtualChannel>,
}

impl OutputPort {
    /// Each channel starts with one credit per slot of the downstream buffer.
    #[must_use]
    pub fn new(direction: Direction, num_vcs: usize, downstream_buffer_size: usize) -> Self {
        let vcs = (0..num_vcs)
            .map(|id| OutputVirtualChannel {
                id,
                port: direction,
                input_vc: None,
                credits: CreditCounter::new(downstream_buffer_size),
            })
            .collect();
        Self { direction, vcs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(routing: RoutingAlgorithm, num_vcs: usize) -> VcPartition {
        VcPartition::new(&NocConfig {
            routing,
            num_virtual_channels: num_vcs,
            ..NocConfig::default()
        })
    }

    #[test]
    fn aco_keeps_last_channel_for_backward_ants() {
        let vcs = partition(RoutingAlgorithm::Aco, 3);
        let shared: Vec<usize> = (0..3).filter(|&vc| vcs.allows(VcClass::Shared, vc)).collect();
        let ants: Vec<usize> = (0..3).filter(|&vc| vcs.allows(VcClass::AntReturn, vc)).collect();
        assert_eq!(shared, [0, 1]);
        assert_eq!(ants, [2]);
    }

    #[test]
    fn oblivious_routing_shares_every_channel() {
        let vcs = partition(RoutingAlgorithm::OddEven, 2);
        assert!((0..2).all(|vc| vcs.allows(VcClass::Shared, vc)));
    }
}
