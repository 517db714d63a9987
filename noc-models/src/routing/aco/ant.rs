// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Ant control packets.

use crate::mesh::NodeId;

/// An ant exploring the network towards `destination`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardAnt {
    pub origin: NodeId,
    pub destination: NodeId,

    /// Every router visited so far, starting with `origin`.
    pub path: Vec<NodeId>,
}

impl ForwardAnt {
    #[must_use]
    pub fn new(origin: NodeId, destination: NodeId) -> Self {
        Self {
            origin,
            destination,
            path: Vec::new(),
        }
    }

    pub fn visit(&mut self, at: NodeId) {
        self.path.push(at);
    }
}

/// An ant returning along the exact reverse of a forward ant's path.
#[derive(Clone, Debug, PartialEq)]
pub struct BackwardAnt {
    /// Origin of the forward ant, where this ant is heading.
    pub origin: NodeId,

    /// Destination the forward ant reached. Pheromones are updated for it.
    pub destination: NodeId,

    path: Vec<NodeId>,

    /// Index into `path` of the router the ant is expected at next.
    cursor: usize,
}

/// What a backward ant does at one router.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackwardHop {
    /// The node the forward ant moved to from here, if this is not the
    /// forward destination.
    pub forward_next: Option<NodeId>,

    /// Where the backward ant goes next, or `None` when it is home.
    pub backward_next: Option<NodeId>,
}

impl BackwardAnt {
    /// Turn a forward ant that has reached its destination around.
    ///
    /// **Panics** if the forward ant did not record any path.
    #[must_use]
    pub fn from_forward(forward: ForwardAnt) -> Self {
        assert!(!forward.path.is_empty(), "forward ant has no path");
        let cursor = forward.path.len() - 1;
        Self {
            origin: forward.origin,
            destination: forward.destination,
            path: forward.path,
            cursor,
        }
    }

    #[must_use]
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Record arrival at router `at` and return the hop to take.
    ///
    /// **Panics** if `at` is not the next router on the reversed path.
    pub fn visit(&mut self, at: NodeId) -> BackwardHop {
        assert_eq!(
            self.path[self.cursor], at,
            "backward ant left its path at {at} (expected {})",
            self.path[self.cursor]
        );
        let forward_next = self.path.get(self.cursor + 1).copied();
        let backward_next = if self.cursor == 0 {
            None
        } else {
            self.cursor -= 1;
            Some(self.path[self.cursor])
        };
        BackwardHop {
            forward_next,
            backward_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retraces_in_reverse() {
        let mut forward = ForwardAnt::new(0, 5);
        for node in [0, 1, 2, 5] {
            forward.visit(node);
        }
        let mut backward = BackwardAnt::from_forward(forward);
        assert_eq!(backward.path(), [0, 1, 2, 5]);

        let hops: Vec<BackwardHop> = [5, 2, 1, 0].iter().map(|&n| backward.visit(n)).collect();
        assert_eq!(
            hops,
            [
                BackwardHop {
                    forward_next: None,
                    backward_next: Some(2)
                },
                BackwardHop {
                    forward_next: Some(5),
                    backward_next: Some(1)
                },
                BackwardHop {
                    forward_next: Some(2),
                    backward_next: Some(0)
                },
                BackwardHop {
                    forward_next: Some(1),
                    backward_next: None
                },
            ]
        );
    }

    #[test]
    #[should_panic(expected = "left its path")]
    fn wrong_router_panics() {
        let mut forward = ForwardAnt::new(0, 1);
        forward.visit(0);
        forward.visit(1);
        let mut backward = BackwardAnt::from_forward(forward);
        backward.visit(0);
    }
}
