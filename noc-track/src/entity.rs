// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Named parts of the simulated mesh.
//!
//! Entities form a tree under a single top level, for example
//! `top::noc::router5::in_E::vc1`. The full name is what the tracker filter
//! regular expressions are matched against.

use std::fmt;
use std::rc::Rc;

use crate::tracker::Event;
use crate::{Id, NO_ID, Tracker};

const JOIN: &str = "::";

pub struct Entity {
    /// Last component of the name.
    pub name: String,
    pub parent: Option<Rc<Entity>>,
    pub id: Id,
    pub tracker: Tracker,
    full_name: String,
}

impl Entity {
    /// Create a child of `parent`. The parent records the creation.
    #[must_use]
    pub fn new(parent: &Rc<Entity>, name: &str) -> Self {
        let full_name = format!("{}{JOIN}{name}", parent.full_name);
        let entity = Self::register(&parent.tracker, Some(parent.clone()), name, full_name);
        if parent.is_enabled(log::Level::Trace) {
            parent.emit(&Event::Created {
                id: entity.id,
                name: &entity.full_name,
            });
        }
        entity
    }

    fn register(tracker: &Tracker, parent: Option<Rc<Entity>>, name: &str, full_name: String) -> Self {
        let id = tracker.unique_id();
        tracker.register(id, &full_name);
        Self {
            name: name.to_string(),
            parent,
            id,
            tracker: tracker.clone(),
            full_name,
        }
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Whether events at `level` from this entity reach any output.
    #[must_use]
    pub fn is_enabled(&self, level: log::Level) -> bool {
        self.tracker.is_enabled(self.id, level)
    }

    /// Emit an event from this entity.
    ///
    /// The macros check [is_enabled](Self::is_enabled) before building the
    /// event.
    pub fn emit(&self, event: &Event) {
        self.tracker.record(self.id, event);
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        let source = self.parent.as_ref().map_or(NO_ID, |parent| parent.id);
        if self.tracker.is_enabled(source, log::Level::Trace) {
            self.tracker.record(source, &Event::Destroyed { id: self.id });
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("full_name", &self.full_name)
            .field("id", &self.id)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// Create the root of the entity tree.
pub fn toplevel(tracker: &Tracker, name: &str) -> Rc<Entity> {
    let top = Entity::register(tracker, None, name, name.to_string());
    if tracker.is_enabled(NO_ID, log::Level::Trace) {
        tracker.record(
            NO_ID,
            &Event::Created {
                id: top.id,
                name,
            },
        );
    }
    Rc::new(top)
}
