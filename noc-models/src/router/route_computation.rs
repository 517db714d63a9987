// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_track::entity::Entity;
use noc_track::trace;

use crate::flit::FlitState;
use crate::mesh::NodeId;
use crate::router::RouterContext;
use crate::router::port::InputPort;

/// Computes the output direction for head flits waiting in an input buffer.
#[derive(Default)]
pub struct RouteComputation;

impl RouteComputation {
    pub fn run(
        &mut self,
        entity: &Entity,
        node: NodeId,
        inputs: &mut [InputPort],
        ctx: &mut RouterContext,
    ) {
        for ivc in inputs.iter_mut().flat_map(|port| port.vcs.iter_mut()) {
            let at = ivc.vc_ref();
            let Some(flit) = ivc.buffer.front_mut() else {
                continue;
            };
            if !flit.is_head || !flit.is_ready_in(FlitState::InputBuffer, ctx.now) {
                continue;
            }

            let packet = match ctx.packets.get_mut(&flit.packet) {
                Some(packet) => packet,
                None => panic!("{flit} at node {node} belongs to an unknown packet"),
            };
            let route = ctx.routing.route(node, packet);
            trace!(entity ; "{flit} routed {route} from {at}");

            ivc.route = Some(route);
            ctx.advance(entity, flit, FlitState::RouteComputation, at);
        }
    }
}
