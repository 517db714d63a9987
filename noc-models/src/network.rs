// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The mesh network: an arena of routers and nodes.
//!
//! Routers and nodes are stored in flat vectors indexed by [NodeId] and refer
//! to one another only by id. Everything that crosses a link is an explicit
//! [NetEvent]:
//!  - a flit arrives at the input buffer of the next router `link_delay`
//!    cycles after leaving. If that buffer is full the arrival is retried
//!    every cycle until there is room.
//!  - a credit returns to the upstream router one cycle after the flit that
//!    held the slot moves on.
//!
//! # Example
//!
//! ```rust
//! use noc_engine::engine::Engine;
//! use noc_models::config::NocConfig;
//! use noc_models::network::Network;
//! use noc_track::tracker::dev_null_tracker;
//!
//! let mut engine = Engine::new(&dev_null_tracker());
//! let top = engine.top().clone();
//! let config = NocConfig::default();
//! let mut network = Network::new_and_register(&mut engine, &top, "noc", &config).unwrap();
//!
//! network.inject_packet(0, 15, 64).unwrap();
//! engine
//!     .run_until(&mut network, 1000, |network| network.is_idle())
//!     .unwrap();
//! assert_eq!(network.stats().packets_arrived, 1);
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use noc_engine::engine::Engine;
use noc_engine::scheduler::Scheduler;
use noc_engine::sim_error;
use noc_engine::time::clock::Clock;
use noc_engine::traits::Clocked;
use noc_engine::types::{SimError, SimResult};
use noc_track::entity::Entity;
use noc_track::{create, create_id, debug, destroy, info, trace};

use crate::config::NocConfig;
use crate::flit::{Flit, FlitState};
use crate::mesh::{Direction, Mesh, NodeId};
use crate::node::{Node, PacketArrival};
use crate::packet::{Packet, PacketId, PacketIdGenerator, PacketKind};
use crate::router::port::VcRef;
use crate::router::{CreditReturn, Ejection, Router, RouterContext, RouterOutputs, Transition};
use crate::routing::aco::agent::AntNetAgent;
use crate::routing::aco::ant::{BackwardAnt, ForwardAnt};
use crate::routing::{Route, build_routing};

#[derive(Debug)]
pub enum NetEvent {
    /// A flit reaches input `port`/`vc` of `router`.
    LinkArrival {
        flit: Flit,
        router: NodeId,
        port: Direction,
        vc: usize,
    },

    /// A credit reaches the output channel it belongs to.
    CreditArrival(CreditReturn),
}

/// The parts of the network called every cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    AntAgent(NodeId),
    Router(NodeId),
}

/// Counters for the whole network.
///
/// Data counters only include data packets. Ants are counted separately.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkStats {
    pub packets_injected: u64,
    pub flits_injected: u64,
    pub packets_arrived: u64,
    pub flits_arrived: u64,
    pub total_latency: u64,
    pub max_latency: u64,
    pub ants_launched: u64,
    pub ants_completed: u64,
    pub ants_dropped: u64,
}

impl NetworkStats {
    #[must_use]
    pub fn packets_in_flight(&self) -> u64 {
        self.packets_injected - self.packets_arrived
    }

    #[must_use]
    pub fn flits_in_flight(&self) -> u64 {
        self.flits_injected - self.flits_arrived
    }

    #[must_use]
    pub fn mean_latency(&self) -> Option<f64> {
        if self.packets_arrived == 0 {
            None
        } else {
            Some(self.total_latency as f64 / self.packets_arrived as f64)
        }
    }
}

pub struct Network {
    pub entity: Rc<Entity>,
    config: NocConfig,
    mesh: Mesh,
    clock: Clock,
    routers: Vec<Router>,
    nodes: Vec<Node>,
    routing: Box<dyn Route>,

    /// Every packet that has been accepted but not fully delivered.
    packets: HashMap<PacketId, Packet>,
    packet_ids: PacketIdGenerator,

    /// Reused for every router tick.
    outputs: RouterOutputs,
    stats: NetworkStats,
    data_flits_on_links: u64,
    history: Option<Vec<Transition>>,
    arrivals: Vec<PacketArrival>,
}

impl Network {
    /// Build the network and register its per-cycle components.
    ///
    /// Ant agents are registered before the routers so that an ant launched
    /// in a cycle can be injected in that same cycle.
    pub fn new_and_register(
        engine: &mut Engine<Network>,
        parent: &Rc<Entity>,
        name: &str,
        config: &NocConfig,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let entity = Rc::new(Entity::new(parent, name));
        let mesh = config.mesh();
        let routing = build_routing(config, mesh);

        let routers = (0..mesh.num_nodes())
            .map(|node| Router::new(&entity, &mesh, node, config))
            .collect();
        let nodes = (0..mesh.num_nodes())
            .map(|node| Node::new(&entity, node))
            .collect();

        for node in 0..mesh.num_nodes() {
            if routing.ant_agent(node).is_some() && config.aco.ant_period > 0 {
                engine.register(Component::AntAgent(node));
            }
        }
        for node in 0..mesh.num_nodes() {
            engine.register(Component::Router(node));
        }

        info!(entity ; "{}x{} mesh, {:?} routing, {} VCs of {} flits",
            mesh.width(), mesh.height(), config.routing,
            config.num_virtual_channels, config.max_input_buffer_size);

        Ok(Self {
            entity,
            config: config.clone(),
            mesh,
            clock: engine.default_clock(),
            routers,
            nodes,
            routing,
            packets: HashMap::new(),
            packet_ids: PacketIdGenerator::default(),
            outputs: RouterOutputs::default(),
            stats: NetworkStats::default(),
            data_flits_on_links: 0,
            history: None,
            arrivals: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &NocConfig {
        &self.config
    }

    #[must_use]
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    #[must_use]
    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    #[must_use]
    pub fn router(&self, node: NodeId) -> &Router {
        &self.routers[node]
    }

    #[must_use]
    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    #[must_use]
    pub fn node(&self, node: NodeId) -> &Node {
        &self.nodes[node]
    }

    #[must_use]
    pub fn ant_agent(&self, node: NodeId) -> Option<&AntNetAgent> {
        self.routing.ant_agent(node)
    }

    /// Access an agent, for example to seed its pheromone table.
    pub fn ant_agent_mut(&mut self, node: NodeId) -> Option<&mut AntNetAgent> {
        self.routing.ant_agent_mut(node)
    }

    #[must_use]
    pub fn packet(&self, id: PacketId) -> Option<&Packet> {
        self.packets.get(&id)
    }

    /// Start keeping every flit state change.
    pub fn record_transitions(&mut self) {
        self.history.get_or_insert_with(Vec::new);
    }

    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        self.history.as_deref().unwrap_or_default()
    }

    /// Data packets delivered since the last call.
    pub fn take_arrivals(&mut self) -> Vec<PacketArrival> {
        std::mem::take(&mut self.arrivals)
    }

    /// Data flits held in router input buffers.
    #[must_use]
    pub fn flits_in_buffers(&self) -> u64 {
        self.routers
            .iter()
            .flat_map(|router| router.buffered_flits())
            .filter(|flit| !flit.is_ant)
            .count() as u64
    }

    /// Data flits currently crossing a link.
    #[must_use]
    pub fn flits_on_links(&self) -> u64 {
        self.data_flits_on_links
    }

    /// Data flits of packets still waiting in injection queues.
    #[must_use]
    pub fn flits_queued(&self) -> u64 {
        self.routers
            .iter()
            .map(|router| router.data_flits_queued() as u64)
            .sum()
    }

    /// Whether every accepted packet, data or ant, has been delivered.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.packets.is_empty() && self.routers.iter().all(Router::is_idle)
    }

    fn now(&self) -> u64 {
        self.clock.tick_now()
    }

    fn check_endpoints(&self, src: NodeId, dst: NodeId, num_flits: usize) -> SimResult {
        for node in [src, dst] {
            if !self.mesh.contains(node) {
                return sim_error!(format!(
                    "Node {node} is outside the {}x{} mesh",
                    self.mesh.width(),
                    self.mesh.height()
                ));
            }
        }
        if src == dst {
            return sim_error!(format!("Packet source and destination are both {src}"));
        }
        if num_flits > self.config.max_input_buffer_size {
            return sim_error!(format!(
                "A packet of {num_flits} flits can never fit an input buffer of {}",
                self.config.max_input_buffer_size
            ));
        }
        Ok(())
    }

    fn new_packet(&mut self, src: NodeId, dst: NodeId, size_bytes: usize, kind: PacketKind) -> Packet {
        Packet {
            id: self.packet_ids.next_id(),
            tag: create_id!(self.entity),
            src,
            dst,
            size_bytes,
            num_flits: self.config.num_flits(size_bytes),
            created: self.now(),
            kind,
        }
    }

    /// Offer a data packet to the router at `src`.
    ///
    /// Returns `Ok(None)` if the router's injection queue is full, in which
    /// case the caller may try again later.
    pub fn inject_packet(
        &mut self,
        src: NodeId,
        dst: NodeId,
        size_bytes: usize,
    ) -> Result<Option<PacketId>, SimError> {
        self.check_endpoints(src, dst, self.config.num_flits(size_bytes))?;
        if !self.routers[src].has_injection_room() {
            return Ok(None);
        }
        let packet = self.new_packet(src, dst, size_bytes, PacketKind::Data);
        self.queue(&packet);

        self.stats.packets_injected += 1;
        self.stats.flits_injected += packet.num_flits as u64;
        let id = packet.id;
        self.packets.insert(id, packet);
        Ok(Some(id))
    }

    /// Send a forward ant from `src` towards `dst`.
    ///
    /// A refused ant is dropped and counted.
    pub fn launch_ant(&mut self, src: NodeId, dst: NodeId) -> Result<Option<PacketId>, SimError> {
        let size_bytes = self.config.aco.ant_packet_size;
        self.check_endpoints(src, dst, self.config.num_flits(size_bytes))?;
        if self.routing.ant_agent(src).is_none() {
            return sim_error!(format!("No ant agent at node {src}"));
        }

        if !self.routers[src].has_injection_room() {
            self.stats.ants_dropped += 1;
            return Ok(None);
        }
        let kind = PacketKind::ForwardAnt(ForwardAnt::new(src, dst));
        let packet = self.new_packet(src, dst, size_bytes, kind);
        self.queue(&packet);
        self.stats.ants_launched += 1;
        let id = packet.id;
        self.packets.insert(id, packet);
        Ok(Some(id))
    }

    /// Put an accepted packet in its source router's injection queue.
    ///
    /// **Panics** if the queue is full; callers check first so that refused
    /// packets never use up an id.
    fn queue(&mut self, packet: &Packet) {
        let queued = self.routers[packet.src].inject_packet(packet);
        assert!(queued, "{packet} refused after room was checked");
        create!(self.entity ; packet.tag, packet.to_string());
    }

    /// Hand everything the last router produced to its recipients.
    fn deliver(&mut self, scheduler: &mut Scheduler<NetEvent>) {
        let outputs = std::mem::take(&mut self.outputs);
        for departure in outputs.departures {
            if !departure.flit.is_ant {
                self.data_flits_on_links += 1;
            }
            scheduler.schedule(
                self.config.link_delay,
                NetEvent::LinkArrival {
                    flit: departure.flit,
                    router: departure.router,
                    port: departure.port,
                    vc: departure.vc,
                },
            );
        }
        for credit in outputs.credit_returns {
            scheduler.schedule(1, NetEvent::CreditArrival(credit));
        }
        for ejection in outputs.ejections {
            self.eject(ejection);
        }
    }

    fn eject(&mut self, ejection: Ejection) {
        let Ejection { flit, vc } = ejection;
        if !flit.is_ant {
            self.stats.flits_arrived += 1;
        }
        if !flit.is_tail {
            return;
        }

        let Some(packet) = self.packets.remove(&flit.packet) else {
            panic!("{flit} arrived for an unknown packet");
        };
        destroy!(self.entity ; packet.tag);
        let now = self.now();
        match packet.kind {
            PacketKind::Data => self.complete(&packet, vc, now),
            PacketKind::ForwardAnt(ant) => self.turn_around(ant),
            PacketKind::BackwardAnt(_) => {
                trace!(self.entity ; "backward ant {} home at {}", packet.id, packet.dst);
                self.stats.ants_completed += 1;
            }
        }
    }

    fn complete(&mut self, packet: &Packet, vc: VcRef, now: u64) {
        let arrival = self.nodes[packet.dst].handle_dest_arrived(packet, vc, now);
        let latency = arrival.latency();
        self.stats.packets_arrived += 1;
        self.stats.total_latency += latency;
        self.stats.max_latency = self.stats.max_latency.max(latency);
        self.arrivals.push(arrival);
    }

    /// Send a backward ant home along the path the forward ant took.
    fn turn_around(&mut self, ant: ForwardAnt) {
        let (src, dst) = (ant.destination, ant.origin);
        if !self.routers[src].has_injection_room() {
            debug!(self.entity ; "backward ant from {src} dropped");
            self.stats.ants_dropped += 1;
            return;
        }
        let size_bytes = self.config.aco.ant_packet_size;
        let kind = PacketKind::BackwardAnt(BackwardAnt::from_forward(ant));
        let packet = self.new_packet(src, dst, size_bytes, kind);
        self.queue(&packet);
        trace!(self.entity ; "forward ant reached {src}, returning as {}", packet.id);
        self.packets.insert(packet.id, packet);
    }
}

impl Clocked for Network {
    type Event = NetEvent;
    type Component = Component;

    fn handle_event(&mut self, scheduler: &mut Scheduler<NetEvent>, event: NetEvent) -> SimResult {
        match event {
            NetEvent::LinkArrival {
                flit,
                router,
                port,
                vc,
            } => {
                if !self.routers[router].has_room(port, vc) {
                    trace!(self.entity ; "{flit} waiting for room at router {router} {}", VcRef::new(port, vc));
                    scheduler.schedule(
                        1,
                        NetEvent::LinkArrival {
                            flit,
                            router,
                            port,
                            vc,
                        },
                    );
                    return Ok(());
                }
                if !flit.is_ant {
                    self.data_flits_on_links -= 1;
                }
                let now = scheduler.now();
                if let Some(history) = self.history.as_mut() {
                    history.push(Transition {
                        cycle: now,
                        node: router,
                        packet: flit.packet,
                        seq: flit.seq,
                        state: FlitState::InputBuffer,
                        vc: VcRef::new(port, vc),
                    });
                }
                self.routers[router].insert_flit(flit, port, vc, now);
            }
            NetEvent::CreditArrival(credit) => {
                self.routers[credit.router].release_credit(credit.port, credit.vc);
            }
        }
        Ok(())
    }

    fn tick(&mut self, scheduler: &mut Scheduler<NetEvent>, component: Component) -> SimResult {
        let now = scheduler.now();
        match component {
            Component::AntAgent(node) => {
                let dest = self
                    .routing
                    .ant_agent_mut(node)
                    .and_then(|agent| agent.tick(now));
                if let Some(dest) = dest {
                    trace!(self.entity ; "agent {node} launching ant to {dest}");
                    self.launch_ant(node, dest)?;
                }
            }
            Component::Router(node) => {
                let mut ctx = RouterContext {
                    now,
                    routing: &mut *self.routing,
                    packets: &mut self.packets,
                    outputs: &mut self.outputs,
                    history: self.history.as_mut(),
                };
                self.routers[node].tick(&mut ctx);
                self.deliver(scheduler);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingAlgorithm;
    use crate::router::port::VcClass;
    use crate::test_helpers::{build_network, small_config};

    /// A flit of `packet` that has just left a router on a link.
    fn on_link(network: &Network, packet: &Packet, seq: usize) -> Flit {
        let mut flit = Flit::new(
            create_id!(network.entity),
            packet.id,
            seq,
            packet.num_flits,
            false,
            VcClass::Shared,
            packet.src,
            packet.dst,
            0,
        );
        for state in [
            FlitState::RouteComputation,
            FlitState::VirtualChannelAllocation,
            FlitState::SwitchAllocation,
            FlitState::SwitchTraversal,
            FlitState::LinkTraversal,
        ] {
            flit.set_state(state, 0);
        }
        flit
    }

    #[test]
    fn arrival_at_full_buffer_retries_every_cycle() {
        let mut config = small_config(2, 1, RoutingAlgorithm::Xy);
        config.num_virtual_channels = 1;
        config.max_input_buffer_size = 2;
        let (mut engine, mut network) = build_network(file!(), &config);
        network.record_transitions();

        // Fill the LOCAL buffer of router 1 with a 2-flit packet.
        let blocking = network.new_packet(1, 0, 16, PacketKind::Data);
        for seq in 0..2 {
            let flit = on_link(&network, &blocking, seq);
            network.routers[1].insert_flit(flit, Direction::Local, 0, 0);
        }
        let waiting = network.new_packet(1, 0, 8, PacketKind::Data);
        let flit = on_link(&network, &waiting, 0);
        let (blocking_id, waiting_id) = (blocking.id, waiting.id);
        network.packets.insert(blocking_id, blocking);
        network.packets.insert(waiting_id, waiting);
        network.stats.packets_injected = 2;
        network.stats.flits_injected = 3;
        network.data_flits_on_links = 1;

        engine.schedule(
            1,
            NetEvent::LinkArrival {
                flit,
                router: 1,
                port: Direction::Local,
                vc: 0,
            },
        );
        for _ in 0..4 {
            engine.step(&mut network).unwrap();
            assert!(!network.router(1).has_room(Direction::Local, 0));
            assert_eq!(engine.pending_events(), 1);
            assert_eq!(network.flits_on_links(), 1);
        }

        engine
            .run_until(&mut network, 100, |network| network.is_idle())
            .unwrap();
        assert_eq!(network.stats().packets_arrived, 2);
        assert_eq!(network.flits_on_links(), 0);

        let cycle_of = |packet: PacketId, seq: usize, state: FlitState| {
            network
                .transitions()
                .iter()
                .find(|t| t.node == 1 && t.packet == packet && t.seq == seq && t.state == state)
                .map(|t| t.cycle)
        };
        let room_at = cycle_of(blocking_id, 0, FlitState::LinkTraversal).unwrap();
        let accepted_at = cycle_of(waiting_id, 0, FlitState::InputBuffer).unwrap();
        assert_eq!(accepted_at, room_at + 1);
    }

    #[test]
    fn refused_packets_use_no_id() {
        let mut config = small_config(2, 1, RoutingAlgorithm::Xy);
        config.max_injection_buffer_size = 1;
        let (mut engine, mut network) = build_network(file!(), &config);

        assert_eq!(network.inject_packet(0, 1, 8).unwrap(), Some(PacketId(0)));
        assert_eq!(network.inject_packet(0, 1, 8).unwrap(), None);
        assert_eq!(network.inject_packet(0, 1, 8).unwrap(), None);
        engine.step(&mut network).unwrap();
        assert_eq!(network.inject_packet(0, 1, 8).unwrap(), Some(PacketId(1)));
    }
}
