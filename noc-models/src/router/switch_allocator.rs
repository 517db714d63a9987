// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_components::arbiter::{Arbitrate, RoundRobinArbiter};
use noc_track::entity::Entity;

use crate::flit::FlitState;
use crate::mesh::Direction;
use crate::router::RouterContext;
use crate::router::port::{InputPort, OutputPort, VcRef};
use crate::router::vc_allocator::all_vcs;

/// The requests for one output port.
struct SaRequests<'a> {
    inputs: &'a [InputPort],
    outputs: &'a [OutputPort],
    port: Direction,
    now: u64,
}

impl Arbitrate<Direction, VcRef> for SaRequests<'_> {
    fn resource_available(&self, _port: &Direction) -> bool {
        true
    }

    fn requester_has_requests(&self, ivc: &VcRef) -> bool {
        let ivc = &self.inputs[ivc.port.index()].vcs[ivc.vc];
        let Some(out) = ivc.output_vc.filter(|out| out.port == self.port) else {
            return false;
        };
        if !self.outputs[out.port.index()].vcs[out.vc].credits.has_credit() {
            return false;
        }
        ivc.buffer.front().is_some_and(|flit| {
            let waiting = if flit.is_head {
                FlitState::VirtualChannelAllocation
            } else {
                FlitState::InputBuffer
            };
            flit.is_ready_in(waiting, self.now)
        })
    }
}

/// Grants each output port of the crossbar to at most one input channel
/// per cycle.
pub struct SwitchAllocator {
    /// Indexed by output port.
    arbiters: Vec<RoundRobinArbiter<Direction, VcRef>>,
}

impl SwitchAllocator {
    #[must_use]
    pub fn new(num_vcs: usize) -> Self {
        let arbiters = Direction::ALL
            .iter()
            .map(|&port| RoundRobinArbiter::new(port, all_vcs(num_vcs)))
            .collect();
        Self { arbiters }
    }

    pub fn run(
        &mut self,
        entity: &Entity,
        inputs: &mut [InputPort],
        outputs: &[OutputPort],
        ctx: &mut RouterContext,
    ) {
        for arbiter in &mut self.arbiters {
            let port = *arbiter.resource();
            let requests = SaRequests {
                inputs: &*inputs,
                outputs,
                port,
                now: ctx.now,
            };
            let Some(at) = arbiter.next(&requests) else {
                continue;
            };

            let Some(flit) = inputs[at.port.index()].vcs[at.vc].buffer.front_mut() else {
                panic!("granted {at} has no flit");
            };
            ctx.advance(entity, flit, FlitState::SwitchAllocation, at);
        }
    }
}
