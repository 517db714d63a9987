// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Mesh topology.
//!
//! Nodes are numbered row-major, `id = y * width + x`, with `(0, 0)` in the
//! top-left corner:
//!
//! ```txt
//!         North (y - 1)
//!              |
//! West (x - 1) + East (x + 1)
//!              |
//!         South (y + 1)
//! ```

use std::fmt;

pub type NodeId = usize;

/// The port directions of a router.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Local,
}

impl Direction {
    pub const NUM: usize = 5;

    /// All directions in port index order.
    pub const ALL: [Direction; Direction::NUM] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Local,
    ];

    /// The four directions that connect to other routers.
    pub const COMPASS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The port at the other end of a link leaving through `self`.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Local => Direction::Local,
        }
    }

    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
            Direction::Local => "L",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mesh {
    width: usize,
    height: usize,
}

impl Mesh {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.width * self.height
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node < self.num_nodes()
    }

    /// Returns the `(x, y)` position of a node.
    #[must_use]
    pub fn coords(&self, node: NodeId) -> (usize, usize) {
        (node % self.width, node / self.width)
    }

    #[must_use]
    pub fn node_at(&self, x: usize, y: usize) -> NodeId {
        y * self.width + x
    }

    /// The node reached by leaving `node` through `direction`, if any.
    #[must_use]
    pub fn neighbor(&self, node: NodeId, direction: Direction) -> Option<NodeId> {
        let (x, y) = self.coords(node);
        match direction {
            Direction::North if y > 0 => Some(self.node_at(x, y - 1)),
            Direction::South if y + 1 < self.height => Some(self.node_at(x, y + 1)),
            Direction::West if x > 0 => Some(self.node_at(x - 1, y)),
            Direction::East if x + 1 < self.width => Some(self.node_at(x + 1, y)),
            _ => None,
        }
    }

    /// All existing neighbours of `node` in port order.
    #[must_use]
    pub fn neighbors(&self, node: NodeId) -> Vec<(Direction, NodeId)> {
        Direction::COMPASS
            .iter()
            .filter_map(|&d| self.neighbor(node, d).map(|n| (d, n)))
            .collect()
    }

    /// The direction that leads from `from` to the adjacent node `to`.
    #[must_use]
    pub fn direction_to(&self, from: NodeId, to: NodeId) -> Option<Direction> {
        Direction::COMPASS
            .into_iter()
            .find(|&d| self.neighbor(from, d) == Some(to))
    }

    /// Manhattan distance between two nodes.
    #[must_use]
    pub fn distance(&self, a: NodeId, b: NodeId) -> usize {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        ax.abs_diff(bx) + ay.abs_diff(by)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_and_centre_neighbours() {
        let mesh = Mesh::new(3, 3);
        assert_eq!(
            mesh.neighbors(0),
            vec![(Direction::East, 1), (Direction::South, 3)]
        );
        assert_eq!(mesh.neighbors(4).len(), 4);
        assert_eq!(mesh.neighbor(4, Direction::North), Some(1));
        assert_eq!(mesh.neighbor(4, Direction::West), Some(3));
        assert_eq!(mesh.neighbor(8, Direction::East), None);
        assert_eq!(mesh.neighbor(4, Direction::Local), None);
    }

    #[test]
    fn opposite_links_meet() {
        let mesh = Mesh::new(4, 2);
        for node in 0..mesh.num_nodes() {
            for (dir, neighbor) in mesh.neighbors(node) {
                assert_eq!(mesh.neighbor(neighbor, dir.opposite()), Some(node));
                assert_eq!(mesh.direction_to(node, neighbor), Some(dir));
            }
        }
    }

    #[test]
    fn distance() {
        let mesh = Mesh::new(4, 4);
        assert_eq!(mesh.distance(0, 15), 6);
        assert_eq!(mesh.distance(5, 5), 0);
        assert_eq!(mesh.coords(6), (2, 1));
    }
}
