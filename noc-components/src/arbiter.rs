// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Round-robin arbitration.
//!
//! The [RoundRobinArbiter] does not own any state about what is being
//! requested. Instead, every call to [next](RoundRobinArbiter::next) is given
//! a view that implements [Arbitrate] and answers whether the resource is free
//! and whether each requester currently wants it. This allows the same
//! arbiter to be used for very different contention points.
//!
//! # Example
//!
//! ```rust
//! use noc_components::arbiter::{Arbitrate, RoundRobinArbiter};
//!
//! struct AllWant;
//!
//! impl Arbitrate<(), usize> for AllWant {
//!     fn resource_available(&self, _: &()) -> bool {
//!         true
//!     }
//!     fn requester_has_requests(&self, _: &usize) -> bool {
//!         true
//!     }
//! }
//!
//! let mut arbiter = RoundRobinArbiter::new((), vec![0, 1, 2]);
//! let grants: Vec<usize> = (0..4).filter_map(|_| arbiter.next(&AllWant)).collect();
//! assert_eq!(grants, [0, 1, 2, 0]);
//! ```

/// Answers the questions an arbiter needs in order to make a grant.
pub trait Arbitrate<R, Q> {
    /// Whether the resource can accept a grant at all.
    fn resource_available(&self, resource: &R) -> bool;

    /// Whether the requester is currently requesting the resource.
    fn requester_has_requests(&self, requester: &Q) -> bool;
}

pub struct RoundRobinArbiter<R, Q> {
    resource: R,
    requesters: Vec<Q>,

    /// Index of the requester with highest priority for the next grant.
    candidate: usize,
}

impl<R, Q> RoundRobinArbiter<R, Q>
where
    Q: Copy,
{
    #[must_use]
    pub fn new(resource: R, requesters: Vec<Q>) -> Self {
        Self {
            resource,
            requesters,
            candidate: 0,
        }
    }

    #[must_use]
    pub fn resource(&self) -> &R {
        &self.resource
    }

    #[must_use]
    pub fn requesters(&self) -> &[Q] {
        &self.requesters
    }

    /// Index of the requester that will be considered first.
    #[must_use]
    pub fn candidate(&self) -> usize {
        self.candidate
    }

    /// Grant the resource to the next eligible requester.
    ///
    /// Returns `None` if the resource is unavailable or nobody is requesting.
    /// Under sustained requests from all `k` requesters each will be granted
    /// once in every `k` calls.
    pub fn next<A>(&mut self, view: &A) -> Option<Q>
    where
        A: Arbitrate<R, Q> + ?Sized,
    {
        if !view.resource_available(&self.resource) {
            return None;
        }

        let num_requesters = self.requesters.len();
        for i in 0..num_requesters {
            let index = (i + self.candidate) % num_requesters;
            let requester = self.requesters[index];
            if view.requester_has_requests(&requester) {
                self.candidate = (index + 1) % num_requesters;
                return Some(requester);
            }
        }
        None
    }
}
