// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_components::arbiter::{Arbitrate, RoundRobinArbiter};
use noc_track::entity::Entity;

use crate::flit::FlitState;
use crate::mesh::Direction;
use crate::router::RouterContext;
use crate::router::port::{InputPort, OutputPort, VcPartition, VcRef};

/// The requests for one output channel.
struct VcaRequests<'a> {
    inputs: &'a [InputPort],
    outputs: &'a [OutputPort],
    out: VcRef,
    partition: VcPartition,
    now: u64,
}

impl Arbitrate<VcRef, VcRef> for VcaRequests<'_> {
    fn resource_available(&self, ovc: &VcRef) -> bool {
        !self.outputs[ovc.port.index()].vcs[ovc.vc].is_bound()
    }

    fn requester_has_requests(&self, ivc: &VcRef) -> bool {
        let ivc = &self.inputs[ivc.port.index()].vcs[ivc.vc];
        !ivc.is_bound()
            && ivc.route == Some(self.out.port)
            && ivc.buffer.front().is_some_and(|flit| {
                flit.is_head
                    && flit.is_ready_in(FlitState::RouteComputation, self.now)
                    && self.partition.allows(flit.class, self.out.vc)
            })
    }
}

/// Binds route-computed input channels to free output channels.
///
/// There is one arbiter per output channel, so each free output channel can
/// be claimed by at most one input channel per cycle.
pub struct VirtualChannelAllocator {
    /// Indexed by output port then channel.
    arbiters: Vec<Vec<RoundRobinArbiter<VcRef, VcRef>>>,
    partition: VcPartition,
}

impl VirtualChannelAllocator {
    #[must_use]
    pub fn new(num_vcs: usize, partition: VcPartition) -> Self {
        let requesters = all_vcs(num_vcs);
        let arbiters = Direction::ALL
            .iter()
            .map(|&port| {
                (0..num_vcs)
                    .map(|vc| RoundRobinArbiter::new(VcRef::new(port, vc), requesters.clone()))
                    .collect()
            })
            .collect();
        Self {
            arbiters,
            partition,
        }
    }

    pub fn run(
        &mut self,
        entity: &Entity,
        inputs: &mut [InputPort],
        outputs: &mut [OutputPort],
        ctx: &mut RouterContext,
    ) {
        for arbiter in self.arbiters.iter_mut().flatten() {
            let out = *arbiter.resource();
            let requests = VcaRequests {
                inputs: &*inputs,
                outputs: &*outputs,
                out,
                partition: self.partition,
                now: ctx.now,
            };
            let Some(at) = arbiter.next(&requests) else {
                continue;
            };

            let ivc = &mut inputs[at.port.index()].vcs[at.vc];
            ivc.output_vc = Some(out);
            outputs[out.port.index()].vcs[out.vc].input_vc = Some(at);

            let Some(flit) = ivc.buffer.front_mut() else {
                panic!("granted {at} has no flit");
            };
            ctx.advance(entity, flit, FlitState::VirtualChannelAllocation, at);
        }
    }
}

/// Every (port, channel) pair of a router, in port-major order.
pub(crate) fn all_vcs(num_vcs: usize) -> Vec<VcRef> {
    Direction::ALL
        .iter()
        .flat_map(|&port| (0..num_vcs).map(move |vc| VcRef::new(port, vc)))
        .collect()
}
