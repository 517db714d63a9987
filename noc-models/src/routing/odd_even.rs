// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Odd-even turn model routing.
//!
//! Deadlock is avoided by forbidding, based on the column of the router:
//!  - in even columns: turns from East to North or South.
//!  - in odd columns: turns from North or South to West.
//!
//! Only minimal directions are ever offered, so every hop makes progress.
//! This module computes the set of legal minimal directions, from which
//! [OddEvenRouting] always takes the first (horizontal before vertical).

use crate::mesh::{Direction, Mesh, NodeId};
use crate::packet::Packet;
use crate::routing::Route;

fn is_even(column: usize) -> bool {
    column % 2 == 0
}

/// Legal minimal output directions at `at` for a packet from `src` to `dst`.
///
/// Horizontal candidates are listed first. The list is empty only when
/// `at == dst`.
#[must_use]
pub fn candidates(mesh: &Mesh, src: NodeId, at: NodeId, dst: NodeId) -> Vec<Direction> {
    let (src_x, _) = mesh.coords(src);
    let (x, y) = mesh.coords(at);
    let (dst_x, dst_y) = mesh.coords(dst);

    let vertical = if dst_y < y {
        Some(Direction::North)
    } else if dst_y > y {
        Some(Direction::South)
    } else {
        None
    };

    let mut directions = Vec::with_capacity(2);
    if dst_x == x {
        directions.extend(vertical);
    } else if dst_x > x {
        match vertical {
            None => directions.push(Direction::East),
            Some(vertical) => {
                // Entering an even destination column from the west would
                // require a forbidden East->North/South turn there.
                if !is_even(dst_x) || dst_x - x != 1 {
                    directions.push(Direction::East);
                }
                if !is_even(x) || x == src_x {
                    directions.push(vertical);
                }
            }
        }
    } else {
        directions.push(Direction::West);
        if is_even(x) {
            directions.extend(vertical);
        }
    }
    directions
}

pub struct OddEvenRouting {
    mesh: Mesh,
}

impl OddEvenRouting {
    #[must_use]
    pub fn new(mesh: Mesh) -> Self {
        Self { mesh }
    }
}

impl Route for OddEvenRouting {
    fn route(&mut self, at: NodeId, packet: &mut Packet) -> Direction {
        candidates(&self.mesh, packet.src, at, packet.dst)
            .first()
            .copied()
            .unwrap_or(Direction::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Follow the first candidate and return the directions taken.
    fn walk(mesh: &Mesh, src: NodeId, dst: NodeId) -> Vec<Direction> {
        let mut at = src;
        let mut path = Vec::new();
        while at != dst {
            let dir = candidates(mesh, src, at, dst)[0];
            path.push(dir);
            at = mesh.neighbor(at, dir).unwrap();
        }
        path
    }

    /// Check a path never makes a turn forbidden by the odd-even model.
    fn assert_legal_turns(mesh: &Mesh, src: NodeId, path: &[Direction]) {
        let mut at = src;
        for pair in path.windows(2) {
            at = mesh.neighbor(at, pair[0]).unwrap();
            let (x, _) = mesh.coords(at);
            let (from, to) = (pair[0], pair[1]);
            if is_even(x) {
                assert!(
                    !(from == Direction::East && !to.is_horizontal()),
                    "E->{to} turn in even column {x}"
                );
            } else {
                assert!(
                    !(!from.is_horizontal() && to == Direction::West),
                    "{from}->W turn in odd column {x}"
                );
            }
        }
    }

    #[test]
    fn all_pairs_are_minimal_and_legal() {
        let mesh = Mesh::new(5, 4);
        for src in 0..mesh.num_nodes() {
            for dst in 0..mesh.num_nodes() {
                if src == dst {
                    assert!(candidates(&mesh, src, src, dst).is_empty());
                    continue;
                }
                let path = walk(&mesh, src, dst);
                assert_eq!(path.len(), mesh.distance(src, dst));
                assert_legal_turns(&mesh, src, &path);
            }
        }
    }

    #[test]
    fn every_candidate_is_minimal() {
        let mesh = Mesh::new(4, 4);
        for src in 0..16 {
            for at in 0..16 {
                for dst in 0..16 {
                    for dir in candidates(&mesh, src, at, dst) {
                        let next = mesh.neighbor(at, dir).unwrap();
                        assert_eq!(mesh.distance(next, dst) + 1, mesh.distance(at, dst));
                    }
                }
            }
        }
    }

    #[test]
    fn even_destination_column_turns_early() {
        // From (1, 0) to (2, 2): column 2 is even so the packet must turn
        // south before entering it.
        let mesh = Mesh::new(4, 4);
        let src = mesh.node_at(1, 0);
        let dst = mesh.node_at(2, 2);
        assert_eq!(candidates(&mesh, src, src, dst), [Direction::South]);
    }
}
