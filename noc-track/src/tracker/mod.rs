// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The [Track] interface, the events it receives and the level filters that
//! decide which entities are enabled.

pub mod text;

use std::fmt;
use std::rc::Rc;

use regex::Regex;
pub use text::TextTracker;

use crate::Id;

/// Error raised while setting up trackers.
#[derive(Debug)]
pub struct TrackConfigError(pub String);

impl fmt::Display for TrackConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tracker config error: {}", self.0)
    }
}

impl std::error::Error for TrackConfigError {}

/// One thing that happened at an entity.
#[derive(Debug)]
pub enum Event<'a> {
    /// A child entity, flit or packet came into existence.
    Created { id: Id, name: &'a str },

    /// A child entity, flit or packet has gone.
    Destroyed { id: Id },

    /// An object entered the entity (e.g. a flit pushed into a buffer).
    Entered { id: Id },

    /// An object left the entity.
    Exited { id: Id },

    /// A text message.
    Message {
        level: log::Level,
        args: fmt::Arguments<'a>,
    },
}

impl Event<'_> {
    /// The level an entity must be enabled at for this event to be kept.
    #[must_use]
    pub fn level(&self) -> log::Level {
        match self {
            Event::Message { level, .. } => *level,
            _ => log::Level::Trace,
        }
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event::Created { id, name } => write!(f, "created {id}, {name}"),
            Event::Destroyed { id } => write!(f, "destroyed {id}"),
            Event::Entered { id } => write!(f, "{id} entered"),
            Event::Exited { id } => write!(f, "{id} exited"),
            Event::Message { level, args } => write!(f, "{level}: {args}"),
        }
    }
}

/// Receiver of all events in a simulation.
pub trait Track {
    /// Allocate a new id.
    fn unique_id(&self) -> Id;

    /// Called once for every entity with its full hierarchical name.
    fn register(&self, id: Id, full_name: &str);

    /// Whether events at `level` from entity `id` are kept.
    fn is_enabled(&self, id: Id, level: log::Level) -> bool;

    /// Keep an event emitted by entity `source`.
    fn record(&self, source: Id, event: &Event);

    /// The engine has moved on to `cycle`.
    fn set_cycle(&self, cycle: u64);

    /// Flush all output.
    fn shutdown(&self);
}

/// The tracker shared by every entity of a simulation.
pub type Tracker = Rc<dyn Track>;

/// A tracker that keeps nothing.
#[must_use]
pub fn dev_null_tracker() -> Tracker {
    Rc::new(TextTracker::new(Vec::new()))
}

/// Chooses the level of each entity from its full name.
///
/// Without a filter every entity gets `level`. With a filter, matching
/// entities get `level` and all others only report errors.
#[derive(Debug)]
pub struct LevelFilter {
    default_level: log::Level,
    matching: Option<(Regex, log::Level)>,
}

impl LevelFilter {
    pub fn new(level: log::Level, filter_regex: &str) -> Result<Self, TrackConfigError> {
        if filter_regex.is_empty() {
            return Ok(Self {
                default_level: level,
                matching: None,
            });
        }
        let regex = Regex::new(filter_regex).map_err(|e| {
            TrackConfigError(format!("Failed to parse regex {filter_regex}:\n{e}\n"))
        })?;
        Ok(Self {
            default_level: log::Level::Error,
            matching: Some((regex, level)),
        })
    }

    #[must_use]
    pub fn default_level(&self) -> log::Level {
        self.default_level
    }

    #[must_use]
    pub fn level_for(&self, full_name: &str) -> log::Level {
        match &self.matching {
            Some((regex, level)) if regex.is_match(full_name) => *level,
            _ => self.default_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use log::Level;

    use super::*;

    const NAMES: [&str; 4] = [
        "top",
        "top::noc",
        "top::noc::router0",
        "top::noc::router1",
    ];

    #[test]
    fn unfiltered_uses_level_everywhere() {
        let filter = LevelFilter::new(Level::Debug, "").unwrap();
        for name in NAMES {
            assert_eq!(filter.level_for(name), Level::Debug);
        }
    }

    #[test]
    fn filter_quietens_other_entities() {
        let filter = LevelFilter::new(Level::Trace, r"router1$").unwrap();
        let levels: Vec<Level> = NAMES.iter().map(|name| filter.level_for(name)).collect();
        assert_eq!(
            levels,
            [Level::Error, Level::Error, Level::Error, Level::Trace]
        );
    }

    #[test]
    fn bad_regex() {
        assert!(LevelFilter::new(Level::Info, "(").is_err());
    }

    #[test]
    fn message_events_carry_their_level() {
        let credits = 3;
        let describe = |event: &Event| (event.level(), event.to_string());
        assert_eq!(
            describe(&Event::Message {
                level: Level::Warn,
                args: format_args!("credit {credits} low"),
            }),
            (Level::Warn, "WARN: credit 3 low".to_string())
        );
        assert_eq!(Event::Entered { id: Id(7) }.level(), Level::Trace);
    }
}
