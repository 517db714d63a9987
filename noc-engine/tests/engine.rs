// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_engine::engine::Engine;
use noc_engine::scheduler::Scheduler;
use noc_engine::sim_error;
use noc_engine::test_helpers::start_test;
use noc_engine::traits::Clocked;
use noc_engine::types::{SimError, SimResult};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Ping {
    Echo(u32),
    Fail,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Part {
    A,
    B,
}

/// Records everything it sees along with the cycle it saw it in.
#[derive(Default)]
struct Recorder {
    seen: Vec<(u64, String)>,
    echo_delay: u64,
}

impl Clocked for Recorder {
    type Event = Ping;
    type Component = Part;

    fn handle_event(&mut self, scheduler: &mut Scheduler<Ping>, event: Ping) -> SimResult {
        match event {
            Ping::Echo(n) => {
                self.seen.push((scheduler.now(), format!("echo{n}")));
                if self.echo_delay > 0 && n < 3 {
                    scheduler.schedule(self.echo_delay, Ping::Echo(n + 1));
                }
                Ok(())
            }
            Ping::Fail => sim_error!("failed"),
        }
    }

    fn tick(&mut self, scheduler: &mut Scheduler<Ping>, component: Part) -> SimResult {
        self.seen
            .push((scheduler.now(), format!("{component:?}").to_lowercase()));
        Ok(())
    }
}

#[test]
fn events_before_components() {
    let mut engine: Engine<Recorder> = start_test(file!());
    engine.register(Part::B);
    engine.register(Part::A);
    engine.schedule(1, Ping::Echo(0));

    let mut model = Recorder::default();
    engine.run_for(&mut model, 2).unwrap();

    let expected: Vec<(u64, String)> = [(0, "b"), (0, "a"), (1, "echo0"), (1, "b"), (1, "a")]
        .iter()
        .map(|(c, s)| (*c, s.to_string()))
        .collect();
    assert_eq!(model.seen, expected);
    assert_eq!(engine.now(), 2);
}

#[test]
fn same_cycle_events_in_schedule_order() {
    let mut engine: Engine<Recorder> = start_test(file!());
    engine.schedule(2, Ping::Echo(7));
    engine.schedule(1, Ping::Echo(5));
    engine.schedule(2, Ping::Echo(6));

    let mut model = Recorder::default();
    engine.run_for(&mut model, 3).unwrap();
    let names: Vec<&str> = model.seen.iter().map(|(_, s)| s.as_str()).collect();
    assert_eq!(names, ["echo5", "echo7", "echo6"]);
    assert_eq!(engine.pending_events(), 0);
}

#[test]
fn events_can_reschedule() {
    let mut engine: Engine<Recorder> = start_test(file!());
    engine.schedule(1, Ping::Echo(0));

    let mut model = Recorder {
        echo_delay: 3,
        ..Recorder::default()
    };
    engine.run_for(&mut model, 20).unwrap();
    let cycles: Vec<u64> = model.seen.iter().map(|(c, _)| *c).collect();
    assert_eq!(cycles, [1, 4, 7, 10]);
}

#[test]
fn error_stops_run() {
    let mut engine: Engine<Recorder> = start_test(file!());
    engine.schedule(3, Ping::Fail);

    let mut model = Recorder::default();
    let result = engine.run_for(&mut model, 10);
    assert_eq!(result, Err(SimError("failed".to_string())));
    assert_eq!(engine.now(), 3);
}

#[test]
fn run_until_times_out() {
    let mut engine: Engine<Recorder> = start_test(file!());
    engine.register(Part::A);

    let mut model = Recorder::default();
    engine
        .run_until(&mut model, 100, |m| m.seen.len() == 5)
        .unwrap();
    assert_eq!(engine.now(), 5);

    let result = engine.run_until(&mut model, 10, |_| false);
    assert!(result.is_err());
    assert_eq!(engine.now(), 15);
}

#[test]
#[should_panic(expected = "at least one cycle ahead")]
fn zero_delay_is_rejected() {
    let mut engine: Engine<Recorder> = start_test(file!());
    engine.schedule(0, Ping::Echo(0));
}
