// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Build the tracker from command-line options.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::rc::Rc;

use crate::Tracker;
use crate::tracker::text::Sink;
use crate::tracker::{LevelFilter, TextTracker, TrackConfigError};

/// Options for one text output.
pub struct TrackerConfig<'a> {
    pub enable: bool,
    pub level: log::Level,

    /// Restrict `level` to entities whose full name matches. Empty matches
    /// every entity.
    pub filter_regex: &'a str,

    /// Output file. Ignored for stdout.
    pub file: Option<&'a str>,
}

impl Default for TrackerConfig<'_> {
    fn default() -> Self {
        Self {
            enable: true,
            level: log::Level::Warn,
            filter_regex: "",
            file: None,
        }
    }
}

pub struct TrackersConfig<'a> {
    pub stdout: TrackerConfig<'a>,
    pub log_file: TrackerConfig<'a>,
}

fn stdout_sink(config: &TrackerConfig) -> Result<Sink, TrackConfigError> {
    let filter = LevelFilter::new(config.level, config.filter_regex)?;
    Ok(Sink::new(filter, Box::new(BufWriter::new(io::stdout()))))
}

fn file_sink(config: &TrackerConfig) -> Result<Sink, TrackConfigError> {
    let filter = LevelFilter::new(config.level, config.filter_regex)?;
    let Some(filename) = config.file else {
        return Err(TrackConfigError(
            "No filename given for the log file tracker".to_string(),
        ));
    };
    let file = fs::File::create(filename)
        .map_err(|e| TrackConfigError(format!("Failed to create {filename}: {e}")))?;
    let writer: Box<dyn Write> = Box::new(BufWriter::new(file));
    Ok(Sink::new(filter, writer))
}

/// Build a tracker writing to stdout and/or a log file.
///
/// If neither is enabled, warnings and errors still go to stdout.
pub fn setup_trackers(config: &TrackersConfig) -> Result<Tracker, TrackConfigError> {
    let mut sinks = Vec::new();
    if config.stdout.enable {
        sinks.push(stdout_sink(&config.stdout)?);
    }
    if config.log_file.enable {
        sinks.push(file_sink(&config.log_file)?);
    }
    if sinks.is_empty() {
        sinks.push(stdout_sink(&TrackerConfig::default())?);
    }
    Ok(Rc::new(TextTracker::new(sinks)))
}
