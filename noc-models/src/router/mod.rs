// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A five-stage virtual-channel router.
//!
//! Each cycle the router runs its stages in reverse pipeline order:
//!
//! ```txt
//!   LT, ST, SA, VCA, RC, injection
//! ```
//!
//! Because a flit can only change state once per cycle (see
//! [Flit::is_ready](crate::flit::Flit::is_ready)) and every stage only looks
//! at flits that reached their current state in an earlier cycle, running
//! the stages one after another behaves as if they all acted at once on the
//! state left by the previous cycle.
//!
//! The router never talks to its neighbours directly. Flits leaving on a
//! link, credits to return upstream and flits ejected to the local node are
//! collected in [RouterOutputs] for the [Network](crate::network::Network)
//! to deliver.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use noc_track::entity::Entity;
use noc_track::{create, create_id, debug, trace};

use crate::config::NocConfig;
use crate::flit::{Flit, FlitState};
use crate::mesh::{Direction, Mesh, NodeId};
use crate::packet::{Packet, PacketId};
use crate::router::crossbar::CrossbarSwitch;
use crate::router::port::{InputPort, OutputPort, VcClass, VcPartition, VcRef};
use crate::router::route_computation::RouteComputation;
use crate::router::switch_allocator::SwitchAllocator;
use crate::router::vc_allocator::VirtualChannelAllocator;
use crate::routing::Route;

pub mod crossbar;
pub mod port;
pub mod route_computation;
pub mod switch_allocator;
pub mod vc_allocator;

/// A flit sent onto a link towards input `port`/`vc` of `router`.
#[derive(Debug)]
pub struct Departure {
    pub flit: Flit,
    pub router: NodeId,
    pub port: Direction,
    pub vc: usize,
}

/// A buffer slot freed at the downstream end of the link driven by output
/// `port`/`vc` of `router`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreditReturn {
    pub router: NodeId,
    pub port: Direction,
    pub vc: usize,
}

/// A flit that has reached its destination node.
#[derive(Debug)]
pub struct Ejection {
    pub flit: Flit,

    /// The input channel the flit left from.
    pub vc: VcRef,
}

/// Everything a router produced in one cycle that affects other parts of
/// the network.
#[derive(Debug, Default)]
pub struct RouterOutputs {
    pub departures: Vec<Departure>,
    pub credit_returns: Vec<CreditReturn>,
    pub ejections: Vec<Ejection>,
}

impl RouterOutputs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.departures.is_empty() && self.credit_returns.is_empty() && self.ejections.is_empty()
    }
}

/// One flit state change, kept when transition history is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub cycle: u64,
    pub node: NodeId,
    pub packet: PacketId,
    pub seq: usize,
    pub state: FlitState,
    pub vc: VcRef,
}

impl Transition {
    #[must_use]
    pub fn new(flit: &Flit, vc: VcRef, cycle: u64) -> Self {
        Self {
            cycle,
            node: flit.node,
            packet: flit.packet,
            seq: flit.seq,
            state: flit.state(),
            vc,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "@{} node {} {} flit {}.{} {}",
            self.cycle, self.node, self.vc, self.packet, self.seq, self.state
        )
    }
}

/// What a router needs from the rest of the network during one cycle.
pub struct RouterContext<'a> {
    pub now: u64,
    pub routing: &'a mut dyn Route,

    /// All packets in flight, used by route computation.
    pub packets: &'a mut HashMap<PacketId, Packet>,
    pub outputs: &'a mut RouterOutputs,
    pub history: Option<&'a mut Vec<Transition>>,
}

impl RouterContext<'_> {
    /// Move `flit`, held in channel `at`, to `state`.
    pub fn advance(&mut self, entity: &Entity, flit: &mut Flit, state: FlitState, at: VcRef) {
        flit.set_state(state, self.now);
        trace!(entity ; "{flit} {state} at {at}");
        self.record(flit, at);
    }

    fn record(&mut self, flit: &Flit, at: VcRef) {
        if let Some(history) = self.history.as_deref_mut() {
            history.push(Transition::new(flit, at, self.now));
        }
    }
}

/// A packet waiting to be split into flits at its source router.
#[derive(Clone, Copy, Debug)]
struct PendingPacket {
    id: PacketId,
    src: NodeId,
    dst: NodeId,
    num_flits: usize,
    is_ant: bool,
    class: VcClass,
}

pub struct Router {
    pub entity: Rc<Entity>,
    node: NodeId,

    /// Neighbouring router for each output direction, indexed by
    /// [Direction::index].
    neighbors: Vec<Option<NodeId>>,

    /// Indexed by [Direction::index].
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,

    route_computation: RouteComputation,
    vc_allocator: VirtualChannelAllocator,
    switch_allocator: SwitchAllocator,
    crossbar: CrossbarSwitch,

    injection_queue: VecDeque<PendingPacket>,
    max_injection_buffer_size: usize,
    partition: VcPartition,

    /// LOCAL channel tried first by the next injection.
    injection_candidate: usize,
}

impl Router {
    #[must_use]
    pub fn new(parent: &Rc<Entity>, mesh: &Mesh, node: NodeId, config: &NocConfig) -> Self {
        let entity = Rc::new(Entity::new(parent, &format!("router{node}")));
        let num_vcs = config.num_virtual_channels;
        let buffer_size = config.max_input_buffer_size;
        let partition = VcPartition::new(config);

        let neighbors = Direction::ALL
            .iter()
            .map(|&direction| match direction {
                Direction::Local => None,
                _ => mesh.neighbor(node, direction),
            })
            .collect();
        let inputs = Direction::ALL
            .iter()
            .map(|&direction| InputPort::new(&entity, direction, num_vcs, buffer_size))
            .collect();
        // Flits ejected to the node never wait, so LOCAL credits are never
        // consumed.
        let outputs = Direction::ALL
            .iter()
            .map(|&direction| OutputPort::new(direction, num_vcs, buffer_size))
            .collect();

        Self {
            entity,
            node,
            neighbors,
            inputs,
            outputs,
            route_computation: RouteComputation,
            vc_allocator: VirtualChannelAllocator::new(num_vcs, partition),
            switch_allocator: SwitchAllocator::new(num_vcs),
            crossbar: CrossbarSwitch,
            injection_queue: VecDeque::new(),
            max_injection_buffer_size: config.max_injection_buffer_size,
            partition,
            injection_candidate: 0,
        }
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn neighbor(&self, direction: Direction) -> Option<NodeId> {
        self.neighbors[direction.index()]
    }

    #[must_use]
    pub fn input_port(&self, direction: Direction) -> &InputPort {
        &self.inputs[direction.index()]
    }

    #[must_use]
    pub fn output_port(&self, direction: Direction) -> &OutputPort {
        &self.outputs[direction.index()]
    }

    pub fn input_ports(&self) -> impl Iterator<Item = &InputPort> {
        self.inputs.iter()
    }

    pub fn output_ports(&self) -> impl Iterator<Item = &OutputPort> {
        self.outputs.iter()
    }

    /// Packets waiting to be split into flits.
    #[must_use]
    pub fn injection_queue_len(&self) -> usize {
        self.injection_queue.len()
    }

    /// Flits of data packets still waiting in the injection queue.
    #[must_use]
    pub fn data_flits_queued(&self) -> usize {
        self.injection_queue
            .iter()
            .filter(|p| !p.is_ant)
            .map(|p| p.num_flits)
            .sum()
    }

    /// Iterate over every flit held in an input buffer.
    pub fn buffered_flits(&self) -> impl Iterator<Item = &Flit> {
        self.inputs
            .iter()
            .flat_map(|port| port.vcs.iter())
            .flat_map(|vc| vc.buffer.iter())
    }

    /// Whether the router holds no flits and no waiting packets.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.injection_queue.is_empty() && self.inputs.iter().all(|port| port.fill_level() == 0)
    }

    /// Whether [inject_packet](Self::inject_packet) would accept a packet.
    #[must_use]
    pub fn has_injection_room(&self) -> bool {
        self.injection_queue.len() < self.max_injection_buffer_size
    }

    /// Queue a packet for injection.
    ///
    /// Returns `false` if the injection queue is full. This is the normal
    /// throttling signal to the traffic source.
    pub fn inject_packet(&mut self, packet: &Packet) -> bool {
        if !self.has_injection_room() {
            debug!(self.entity ; "refused {packet}, injection queue full");
            return false;
        }
        debug!(self.entity ; "queued {packet}");
        self.injection_queue.push_back(PendingPacket {
            id: packet.id,
            src: packet.src,
            dst: packet.dst,
            num_flits: packet.num_flits,
            is_ant: packet.is_ant(),
            class: packet.vc_class(),
        });
        true
    }

    /// Whether input `port`/`vc` can accept a flit this cycle.
    #[must_use]
    pub fn has_room(&self, port: Direction, vc: usize) -> bool {
        !self.inputs[port.index()].vcs[vc].buffer.is_full()
    }

    /// Accept a flit arriving on input `port`/`vc`.
    ///
    /// **Panics** if the buffer is full; callers must check
    /// [has_room](Self::has_room) first.
    pub fn insert_flit(&mut self, mut flit: Flit, port: Direction, vc: usize, now: u64) {
        flit.node = self.node;
        flit.set_state(FlitState::InputBuffer, now);
        trace!(self.entity ; "{flit} arrived at {}", VcRef::new(port, vc));
        self.inputs[port.index()].vcs[vc].buffer.push(flit);
    }

    /// A downstream buffer slot behind output `port`/`vc` has been freed.
    pub fn release_credit(&mut self, port: Direction, vc: usize) {
        let credits = &mut self.outputs[port.index()].vcs[vc].credits;
        credits.release();
        trace!(self.entity ; "credit returned to {}, now {credits}", VcRef::new(port, vc));
    }

    /// Run one cycle of the pipeline.
    pub fn tick(&mut self, ctx: &mut RouterContext) {
        let entity = &*self.entity;
        self.crossbar.traverse_link(
            entity,
            &self.neighbors,
            &mut self.inputs,
            &mut self.outputs,
            ctx,
        );
        self.crossbar
            .traverse_switch(entity, &mut self.inputs, ctx);
        self.switch_allocator
            .run(entity, &mut self.inputs, &self.outputs, ctx);
        self.vc_allocator
            .run(entity, &mut self.inputs, &mut self.outputs, ctx);
        self.route_computation
            .run(entity, self.node, &mut self.inputs, ctx);
        self.inject(ctx);
    }

    /// Split waiting packets into flits on the LOCAL input port.
    ///
    /// Packets are admitted in order, at most one per channel per cycle, and
    /// only into a channel of their class with room for every flit of the
    /// packet.
    fn inject(&mut self, ctx: &mut RouterContext) {
        let local = &mut self.inputs[Direction::Local.index()];
        let num_vcs = local.vcs.len();
        let mut used = vec![false; num_vcs];

        while let Some(pending) = self.injection_queue.front().copied() {
            let free = (0..num_vcs)
                .map(|i| (self.injection_candidate + i) % num_vcs)
                .find(|&vc| {
                    !used[vc]
                        && self.partition.allows(pending.class, vc)
                        && local.vcs[vc].buffer.has_room_for(pending.num_flits)
                });
            let Some(vc) = free else {
                break;
            };
            self.injection_queue.pop_front();
            used[vc] = true;
            self.injection_candidate = (vc + 1) % num_vcs;

            let at = VcRef::new(Direction::Local, vc);
            for seq in 0..pending.num_flits {
                let tag = create_id!(self.entity);
                let flit = Flit::new(
                    tag,
                    pending.id,
                    seq,
                    pending.num_flits,
                    pending.is_ant,
                    pending.class,
                    pending.src,
                    pending.dst,
                    ctx.now,
                );
                create!(self.entity ; tag, flit.to_string());
                ctx.record(&flit, at);
                local.vcs[vc].buffer.push(flit);
            }
            debug!(self.entity ; "packet {} injected on {at} as {} flits", pending.id, pending.num_flits);
        }
    }
}
