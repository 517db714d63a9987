// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Flits: the unit of transfer across a link.

use std::fmt;

use noc_track::Id;
use noc_track::id::Unique;

use crate::mesh::NodeId;
use crate::packet::PacketId;
use crate::router::port::VcClass;

/// Progress of a flit through a router.
///
/// States only ever move forwards except that `LinkTraversal` returns to
/// `InputBuffer` at the next router. `DestinationArrived` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlitState {
    InputBuffer,
    RouteComputation,
    VirtualChannelAllocation,
    SwitchAllocation,
    SwitchTraversal,
    LinkTraversal,
    DestinationArrived,
}

impl FlitState {
    /// Whether a flit currently in `self` may move to `next`.
    #[must_use]
    pub fn can_become(self, next: FlitState) -> bool {
        match self {
            FlitState::DestinationArrived => false,
            FlitState::LinkTraversal => next == FlitState::InputBuffer,
            _ => next > self,
        }
    }
}

impl fmt::Display for FlitState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FlitState::InputBuffer => "INPUT_BUFFER",
            FlitState::RouteComputation => "ROUTE_COMPUTATION",
            FlitState::VirtualChannelAllocation => "VIRTUAL_CHANNEL_ALLOCATION",
            FlitState::SwitchAllocation => "SWITCH_ALLOCATION",
            FlitState::SwitchTraversal => "SWITCH_TRAVERSAL",
            FlitState::LinkTraversal => "LINK_TRAVERSAL",
            FlitState::DestinationArrived => "DESTINATION_ARRIVED",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug)]
pub struct Flit {
    /// Unique ID used for tracing.
    pub tag: Id,
    pub packet: PacketId,

    /// Position within the packet, starting at 0 for the head.
    pub seq: usize,
    pub is_head: bool,
    pub is_tail: bool,

    /// Whether this flit belongs to a routing control (ant) packet.
    pub is_ant: bool,

    /// Channels the flit may be allocated.
    pub class: VcClass,
    pub src: NodeId,
    pub dst: NodeId,

    /// Node currently holding the flit.
    pub node: NodeId,
    state: FlitState,

    /// Cycle of the last state change.
    timestamp: u64,
}

impl Flit {
    /// Create flit `seq` of a packet with `num_flits` flits.
    ///
    /// New flits start in the input buffer of the source node.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        tag: Id,
        packet: PacketId,
        seq: usize,
        num_flits: usize,
        is_ant: bool,
        class: VcClass,
        src: NodeId,
        dst: NodeId,
        now: u64,
    ) -> Self {
        Self {
            tag,
            packet,
            seq,
            is_head: seq == 0,
            is_tail: seq + 1 == num_flits,
            is_ant,
            class,
            src,
            dst,
            node: src,
            state: FlitState::InputBuffer,
            timestamp: now,
        }
    }

    #[must_use]
    pub fn state(&self) -> FlitState {
        self.state
    }

    #[must_use]
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// A flit can only change state once per cycle.
    #[must_use]
    pub fn is_ready(&self, now: u64) -> bool {
        self.timestamp < now
    }

    /// Whether the flit is at the head of a packet waiting in `state`.
    #[must_use]
    pub fn is_ready_in(&self, state: FlitState, now: u64) -> bool {
        self.state == state && self.is_ready(now)
    }

    /// Move the flit to a new state.
    ///
    /// **Panics** on re-entering the current state or moving backwards.
    pub fn set_state(&mut self, state: FlitState, now: u64) {
        assert_ne!(self.state, state, "{self} re-entering state {state}");
        assert!(
            self.state.can_become(state),
            "{self} cannot move from {} to {state}",
            self.state
        );
        self.state = state;
        self.timestamp = now;
    }
}

impl Unique for Flit {
    fn id(&self) -> Id {
        self.tag
    }
}

impl fmt::Display for Flit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "flit {}.{}", self.packet, self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flit() -> Flit {
        Flit::new(Id(5), PacketId(1), 0, 2, false, VcClass::Shared, 0, 1, 0)
    }

    #[test]
    fn head_and_tail_flags() {
        let head = flit();
        assert!(head.is_head && !head.is_tail);
        let single = Flit::new(Id(5), PacketId(1), 0, 1, false, VcClass::Shared, 0, 1, 0);
        assert!(single.is_head && single.is_tail);
    }

    #[test]
    fn full_lifecycle() {
        let mut f = flit();
        let states = [
            FlitState::RouteComputation,
            FlitState::VirtualChannelAllocation,
            FlitState::SwitchAllocation,
            FlitState::SwitchTraversal,
            FlitState::LinkTraversal,
            FlitState::InputBuffer,
            FlitState::SwitchAllocation,
            FlitState::SwitchTraversal,
            FlitState::DestinationArrived,
        ];
        for (cycle, state) in states.into_iter().enumerate() {
            assert!(f.is_ready(cycle as u64 + 1));
            f.set_state(state, cycle as u64 + 1);
            assert!(!f.is_ready(cycle as u64 + 1));
        }
        assert_eq!(f.state(), FlitState::DestinationArrived);
        assert_eq!(f.timestamp(), 9);
    }

    #[test]
    #[should_panic(expected = "re-entering state INPUT_BUFFER")]
    fn reentering_state_panics() {
        let mut f = flit();
        f.set_state(FlitState::InputBuffer, 1);
    }

    #[test]
    #[should_panic(expected = "cannot move")]
    fn moving_backwards_panics() {
        let mut f = flit();
        f.set_state(FlitState::SwitchAllocation, 1);
        f.set_state(FlitState::RouteComputation, 2);
    }
}
