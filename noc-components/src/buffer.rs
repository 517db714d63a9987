// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A bounded FIFO.
//!
//! Unlike a port-connected store, the [InputBuffer] never blocks: callers are
//! expected to check for room first (normally via credits). Pushing into a
//! full buffer means the flow control is broken and therefore panics.

use std::collections::VecDeque;
use std::collections::vec_deque;
use std::rc::Rc;

use noc_track::entity::Entity;
use noc_track::id::Unique;
use noc_track::{enter, exit};

pub struct InputBuffer<T>
where
    T: Unique,
{
    pub entity: Rc<Entity>,
    capacity: usize,
    data: VecDeque<T>,
}

impl<T> InputBuffer<T>
where
    T: Unique,
{
    /// **Panics** if `capacity` is 0.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str, capacity: usize) -> Self {
        assert_ne!(capacity, 0, "Unsupported InputBuffer with 0 capacity");
        Self {
            entity: Rc::new(Entity::new(parent, name)),
            capacity,
            data: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a value to the back of the buffer.
    ///
    /// **Panics** if the buffer is full.
    pub fn push(&mut self, value: T) {
        if self.is_full() {
            panic!("Overflow in {}", self.entity.full_name());
        }
        enter!(self.entity ; value.id());
        self.data.push_back(value);
    }

    pub fn pop(&mut self) -> Option<T> {
        let value = self.data.pop_front()?;
        exit!(self.entity ; value.id());
        Some(value)
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.data.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.data.front_mut()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.data.iter()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn fill_level(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.capacity - self.data.len()
    }

    #[must_use]
    pub fn has_room_for(&self, count: usize) -> bool {
        count <= self.free_slots()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
