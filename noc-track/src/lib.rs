// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Logging and tracing for the NoC simulator.
//!
//! Every part of the mesh (routers, nodes, buffers) owns an
//! [Entity](crate::entity::Entity). Models report through the entity with
//! the macros below, which emit one [Event](crate::tracker::Event) each:
//!
//!   - `trace!` .. `error!` emit text messages at a [log::Level].
//!   - `create!`/`destroy!` mark the lifetime of a flit or packet.
//!   - `enter!`/`exit!` mark a flit moving in and out of a buffer.
//!
//! Whether an event is emitted is decided per entity, so a regular
//! expression can turn on detailed output for one router while the rest of
//! the mesh stays quiet. Message arguments are only formatted when the event
//! is emitted.

pub use log;

pub mod builder;
pub mod entity;
pub mod id;
pub mod test_helpers;
pub mod tracker;

pub use id::Id;
pub use tracker::{Track, Tracker};

/// Source of events that are not emitted by any entity.
pub const NO_ID: Id = Id(0);

/// Emit a text message from an entity at the given level.
#[doc(hidden)]
#[macro_export]
macro_rules! __emit_message {
    ($entity:expr, $level:ident, $($arg:tt)+) => {
        if $entity.is_enabled($crate::log::Level::$level) {
            $entity.emit(&$crate::tracker::Event::Message {
                level: $crate::log::Level::$level,
                args: format_args!($($arg)+),
            });
        }
    };
}

/// Emit a message at `Trace` level: per-flit and per-credit detail.
#[macro_export]
macro_rules! trace {
    ($entity:expr ; $($arg:tt)+) => {
        $crate::__emit_message!($entity, Trace, $($arg)+)
    };
}

/// Emit a message at `Debug` level: packet injection and delivery.
#[macro_export]
macro_rules! debug {
    ($entity:expr ; $($arg:tt)+) => {
        $crate::__emit_message!($entity, Debug, $($arg)+)
    };
}

/// Emit a message at `Info` level: set-up and summaries.
#[macro_export]
macro_rules! info {
    ($entity:expr ; $($arg:tt)+) => {
        $crate::__emit_message!($entity, Info, $($arg)+)
    };
}

/// Emit a message at `Warn` level.
#[macro_export]
macro_rules! warn {
    ($entity:expr ; $($arg:tt)+) => {
        $crate::__emit_message!($entity, Warn, $($arg)+)
    };
}

/// Emit a message at `Error` level.
#[macro_export]
macro_rules! error {
    ($entity:expr ; $($arg:tt)+) => {
        $crate::__emit_message!($entity, Error, $($arg)+)
    };
}

/// Allocate a new [Id] from the entity's tracker.
#[macro_export]
macro_rules! create_id {
    ($entity:expr) => {
        $entity.tracker.unique_id()
    };
}

/// Record that the entity created the object `$id`, described by `$name`.
///
/// `$name` is only evaluated when tracing is enabled for the entity.
#[macro_export]
macro_rules! create {
    ($entity:expr ; $id:expr, $name:expr) => {
        if $entity.is_enabled($crate::log::Level::Trace) {
            $entity.emit(&$crate::tracker::Event::Created {
                id: $id,
                name: &$name,
            });
        }
    };
}

/// Record that the object `$id` has left the simulation at this entity.
#[macro_export]
macro_rules! destroy {
    ($entity:expr ; $id:expr) => {
        if $entity.is_enabled($crate::log::Level::Trace) {
            $entity.emit(&$crate::tracker::Event::Destroyed { id: $id });
        }
    };
}

/// Record the object `$id` entering the entity (e.g. a flit entering a
/// buffer).
#[macro_export]
macro_rules! enter {
    ($entity:expr ; $id:expr) => {
        if $entity.is_enabled($crate::log::Level::Trace) {
            $entity.emit(&$crate::tracker::Event::Entered { id: $id });
        }
    };
}

/// Record the object `$id` leaving the entity.
#[macro_export]
macro_rules! exit {
    ($entity:expr ; $id:expr) => {
        if $entity.is_enabled($crate::log::Level::Trace) {
            $entity.emit(&$crate::tracker::Event::Exited { id: $id });
        }
    };
}
