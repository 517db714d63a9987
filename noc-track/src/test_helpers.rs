// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Trackers for tests.

use std::cell::{Cell, RefCell};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use std::rc::Rc;

use regex::Regex;

use crate::tracker::text::Sink;
use crate::tracker::{Event, LevelFilter, TextTracker};
use crate::{Id, Track, Tracker};

/// Keeps every event in memory, formatted as `<source>: <event>`.
pub struct TestTracker {
    events: RefCell<Vec<String>>,
    next_id: Cell<u64>,
}

impl TestTracker {
    #[must_use]
    pub fn new(first_id: u64) -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            next_id: Cell::new(first_id),
        }
    }

    /// The events since the last call.
    pub fn take_events(&self) -> Vec<String> {
        self.events.take()
    }
}

impl Track for TestTracker {
    fn unique_id(&self) -> Id {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Id(id)
    }

    fn register(&self, _id: Id, _full_name: &str) {}

    fn is_enabled(&self, _id: Id, _level: log::Level) -> bool {
        true
    }

    fn record(&self, source: Id, event: &Event) {
        self.events.borrow_mut().push(format!("{source}: {event}"));
    }

    fn set_cycle(&self, _cycle: u64) {}

    fn shutdown(&self) {}
}

/// Create a [TestTracker] handing out ids from `$first_id`.
///
/// Returns the concrete tracker, for [check_and_clear], and the shared
/// [Tracker] to build entities with.
///
/// ```
/// use noc_track::entity::toplevel;
/// use noc_track::test_helpers::check_and_clear;
///
/// let (test_tracker, tracker) = noc_track::test_init!(10);
/// let _top = toplevel(&tracker, "top");
/// check_and_clear(&test_tracker, &["^0: created 10, top$"]);
/// ```
#[macro_export]
macro_rules! test_init {
    ($first_id:expr) => {{
        let test_tracker = std::rc::Rc::new($crate::test_helpers::TestTracker::new($first_id));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Assert that the events since the last call match `expected`, one regular
/// expression per event, then forget them.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let events = tracker.take_events();
    assert_eq!(
        expected.len(),
        events.len(),
        "expected {expected:?}, got {events:?}"
    );
    for (pattern, event) in expected.iter().zip(&events) {
        let re = Regex::new(pattern).unwrap();
        assert!(re.is_match(event), "{event:?} does not match {pattern:?}");
    }
}

/// A tracker that writes every event of a test to
/// `traces/<test file stem>.log`.
#[must_use]
pub fn create_tracker(test_file: &str) -> Tracker {
    fs::create_dir_all("traces").unwrap();
    let stem = Path::new(test_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap();
    let file = fs::File::create(format!("traces/{stem}.log")).unwrap();
    let filter = LevelFilter::new(log::Level::Trace, "").unwrap();
    let sink = Sink::new(filter, Box::new(BufWriter::new(file)));
    Rc::new(TextTracker::new(vec![sink]))
}
