// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use noc_components::buffer::InputBuffer;
use noc_track::entity::toplevel;
use noc_track::id::Unique;
use noc_track::test_helpers::check_and_clear;
use noc_track::{Id, test_init};

#[derive(Debug, PartialEq)]
struct Item(u64);

impl Unique for Item {
    fn id(&self) -> Id {
        Id(self.0)
    }
}

#[test]
fn fifo_order_and_levels() {
    let (test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let mut buffer = InputBuffer::new(&top, "buffer", 3);
    check_and_clear(&test_tracker, &["created 1", "created 2, top::buffer"]);

    buffer.push(Item(100));
    buffer.push(Item(101));
    assert_eq!(buffer.fill_level(), 2);
    assert_eq!(buffer.free_slots(), 1);
    assert!(buffer.has_room_for(1));
    assert!(!buffer.has_room_for(2));
    assert_eq!(buffer.front(), Some(&Item(100)));

    buffer.push(Item(102));
    assert!(buffer.is_full());
    let order: Vec<u64> = buffer.iter().map(|i| i.0).collect();
    assert_eq!(order, [100, 101, 102]);

    assert_eq!(buffer.pop(), Some(Item(100)));
    assert_eq!(buffer.pop(), Some(Item(101)));
    assert_eq!(buffer.pop(), Some(Item(102)));
    assert_eq!(buffer.pop(), None);
    assert!(buffer.is_empty());

    check_and_clear(
        &test_tracker,
        &[
            "^2: 100 entered$",
            "^2: 101 entered$",
            "^2: 102 entered$",
            "^2: 100 exited$",
            "^2: 101 exited$",
            "^2: 102 exited$",
        ],
    );
}

#[test]
#[should_panic(expected = "Overflow in top::buffer")]
fn overflow_panics() {
    let (_test_tracker, tracker) = test_init!(1);
    let top = toplevel(&tracker, "top");
    let mut buffer = InputBuffer::new(&top, "buffer", 1);
    buffer.push(Item(1));
    buffer.push(Item(2));
}
