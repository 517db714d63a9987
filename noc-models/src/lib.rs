// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Cycle-accurate models of a mesh network-on-chip.
//!
//! A [Network](crate::network::Network) is an arena of virtual-channel
//! [Router](crate::router::Router)s and [Node](crate::node::Node)s laid out on
//! a [Mesh](crate::mesh::Mesh). Packets injected at a node are split into
//! flits that move through a five-stage router pipeline:
//!
//! ```txt
//!   RC -> VCA -> SA -> ST -> LT -> (next router) ... -> destination node
//! ```
//!
//! with credit-based flow control on every link. The routing decision is
//! made by a pluggable [Route](crate::routing::Route) strategy: dimension
//! order (XY), the odd-even turn model, or ant-colony optimisation.

pub mod config;
pub mod flit;
pub mod mesh;
pub mod network;
pub mod node;
pub mod packet;
pub mod router;
pub mod routing;
pub mod test_helpers;
pub mod traffic;
