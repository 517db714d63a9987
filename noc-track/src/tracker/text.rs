// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::Write;

use crate::Id;
use crate::tracker::{Event, LevelFilter, Track};

/// One text output with its own level filter.
pub struct Sink {
    filter: LevelFilter,

    /// Entities whose level differs from the filter default.
    levels: RefCell<HashMap<Id, log::Level>>,
    writer: RefCell<Box<dyn Write>>,
}

impl Sink {
    #[must_use]
    pub fn new(filter: LevelFilter, writer: Box<dyn Write>) -> Self {
        Self {
            filter,
            levels: RefCell::new(HashMap::new()),
            writer: RefCell::new(writer),
        }
    }

    fn is_enabled(&self, id: Id, level: log::Level) -> bool {
        let entity_level = self
            .levels
            .borrow()
            .get(&id)
            .copied()
            .unwrap_or(self.filter.default_level());
        level <= entity_level
    }
}

/// Writes one line per event, prefixed with the cycle, to each enabled sink.
///
/// ```txt
/// [412] 37: TRACE: flit 12.0 SwitchAllocation at E1
/// ```
///
/// With no sinks nothing is ever enabled, which keeps long runs cheap.
pub struct TextTracker {
    next_id: Cell<u64>,
    cycle: Cell<u64>,
    sinks: Vec<Sink>,
}

impl TextTracker {
    #[must_use]
    pub fn new(sinks: Vec<Sink>) -> Self {
        Self {
            next_id: Cell::new(crate::NO_ID.0 + 1),
            cycle: Cell::new(0),
            sinks,
        }
    }
}

impl Track for TextTracker {
    fn unique_id(&self) -> Id {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Id(id)
    }

    fn register(&self, id: Id, full_name: &str) {
        for sink in &self.sinks {
            let level = sink.filter.level_for(full_name);
            if level != sink.filter.default_level() {
                sink.levels.borrow_mut().insert(id, level);
            }
        }
    }

    fn is_enabled(&self, id: Id, level: log::Level) -> bool {
        self.sinks.iter().any(|sink| sink.is_enabled(id, level))
    }

    fn record(&self, source: Id, event: &Event) {
        let cycle = self.cycle.get();
        for sink in &self.sinks {
            if sink.is_enabled(source, event.level()) {
                // Write failures are ignored.
                let _ = writeln!(sink.writer.borrow_mut(), "[{cycle}] {source}: {event}");
            }
        }
    }

    fn set_cycle(&self, cycle: u64) {
        assert!(cycle >= self.cycle.get(), "Time moving backwards");
        self.cycle.set(cycle);
    }

    fn shutdown(&self) {
        for sink in &self.sinks {
            let _ = sink.writer.borrow_mut().flush();
        }
    }
}
