// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Dimension-order routing.
//!
//! All hops in X are taken before any hop in Y. A packet therefore only ever
//! turns once, from horizontal to vertical, which cannot form a cycle of
//! channel dependencies on a mesh.

use crate::mesh::{Direction, Mesh, NodeId};
use crate::packet::Packet;
use crate::routing::Route;

pub struct XyRouting {
    mesh: Mesh,
}

impl XyRouting {
    #[must_use]
    pub fn new(mesh: Mesh) -> Self {
        Self { mesh }
    }

    #[must_use]
    pub fn next_direction(&self, at: NodeId, dst: NodeId) -> Direction {
        let (x, y) = self.mesh.coords(at);
        let (dst_x, dst_y) = self.mesh.coords(dst);
        if x < dst_x {
            Direction::East
        } else if x > dst_x {
            Direction::West
        } else if y < dst_y {
            Direction::South
        } else if y > dst_y {
            Direction::North
        } else {
            Direction::Local
        }
    }
}

impl Route for XyRouting {
    fn route(&mut self, at: NodeId, packet: &mut Packet) -> Direction {
        self.next_direction(at, packet.dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_before_y() {
        let mesh = Mesh::new(4, 4);
        let xy = XyRouting::new(mesh);

        // Walk from the top-left to the bottom-right corner.
        let mut at = 0;
        let mut path = Vec::new();
        loop {
            let dir = xy.next_direction(at, 15);
            path.push(dir);
            match mesh.neighbor(at, dir) {
                Some(next) => at = next,
                None => break,
            }
        }
        use Direction::*;
        assert_eq!(path, [East, East, East, South, South, South, Local]);
    }

    #[test]
    fn westward_and_north() {
        let xy = XyRouting::new(Mesh::new(4, 4));
        assert_eq!(xy.next_direction(15, 12), Direction::West);
        assert_eq!(xy.next_direction(15, 3), Direction::North);
        assert_eq!(xy.next_direction(6, 6), Direction::Local);
    }
}
