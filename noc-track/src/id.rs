// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::fmt;

/// Tracking identity of an entity, flit or packet.
///
/// Ids are handed out by the [Tracker](crate::Tracker) and are unique within
/// a simulation. [NO_ID](crate::NO_ID) is never handed out.
#[derive(Copy, Clone, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Id(pub u64);

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can be followed through the trace by its [Id].
pub trait Unique {
    /// The tracking id of this object.
    fn id(&self) -> Id;
}
