// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_track::entity::Entity;
use noc_track::{destroy, trace};

use crate::flit::FlitState;
use crate::mesh::{Direction, NodeId};
use crate::router::port::{InputPort, OutputPort};
use crate::router::{CreditReturn, Departure, Ejection, RouterContext};

/// Moves switch-allocated flits through the crossbar and onto the links.
#[derive(Default)]
pub struct CrossbarSwitch;

impl CrossbarSwitch {
    /// Flits granted by the switch allocator cross the switch.
    pub fn traverse_switch(
        &mut self,
        entity: &Entity,
        inputs: &mut [InputPort],
        ctx: &mut RouterContext,
    ) {
        for ivc in inputs.iter_mut().flat_map(|port| port.vcs.iter_mut()) {
            let at = ivc.vc_ref();
            if let Some(flit) = ivc.buffer.front_mut() {
                if flit.is_ready_in(FlitState::SwitchAllocation, ctx.now) {
                    ctx.advance(entity, flit, FlitState::SwitchTraversal, at);
                }
            }
        }
    }

    /// Send flits that have crossed the switch out of their output channel.
    ///
    /// Every flit leaving an input buffer returns a credit upstream. The
    /// tail flit releases the binding between its input and output channels.
    pub fn traverse_link(
        &mut self,
        entity: &Entity,
        neighbors: &[Option<NodeId>],
        inputs: &mut [InputPort],
        outputs: &mut [OutputPort],
        ctx: &mut RouterContext,
    ) {
        for ovc in outputs.iter_mut().flat_map(|port| port.vcs.iter_mut()) {
            let Some(at) = ovc.input_vc else {
                continue;
            };
            if !ovc.credits.has_credit() {
                continue;
            }
            let ivc = &mut inputs[at.port.index()].vcs[at.vc];
            let ready = ivc
                .buffer
                .front()
                .is_some_and(|flit| flit.is_ready_in(FlitState::SwitchTraversal, ctx.now));
            if !ready {
                continue;
            }
            let Some(mut flit) = ivc.buffer.pop() else {
                continue;
            };

            if at.port != Direction::Local {
                ctx.outputs.credit_returns.push(CreditReturn {
                    router: connected(neighbors, at.port),
                    port: at.port.opposite(),
                    vc: at.vc,
                });
            }

            let out = ovc.vc_ref();
            let is_tail = flit.is_tail;
            if out.port == Direction::Local {
                ctx.advance(entity, &mut flit, FlitState::DestinationArrived, at);
                destroy!(entity ; flit.tag);
                ctx.outputs.ejections.push(Ejection { flit, vc: at });
            } else {
                ctx.advance(entity, &mut flit, FlitState::LinkTraversal, at);
                ovc.credits.consume();
                ctx.outputs.departures.push(Departure {
                    flit,
                    router: connected(neighbors, out.port),
                    port: out.port.opposite(),
                    vc: out.vc,
                });
            }

            if is_tail {
                trace!(entity ; "{at} released {out}");
                ivc.output_vc = None;
                ivc.route = None;
                ovc.input_vc = None;
            }
        }
    }
}

fn connected(neighbors: &[Option<NodeId>], port: Direction) -> NodeId {
    match neighbors[port.index()] {
        Some(node) => node,
        None => panic!("port {port} is not connected"),
    }
}
