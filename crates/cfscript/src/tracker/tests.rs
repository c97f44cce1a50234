//! Unit tests for command pacing.

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::*;
use crate::test_support::{Loopback, LoopbackSink};

#[fixture]
fn client() -> Loopback {
    let loopback = Loopback::silent();
    loopback.set_auto_acknowledge(false);
    loopback
}

fn ordinary(text: &str) -> Command {
    Command::new(text)
}

fn special(index: usize) -> Command {
    Command::special(format!("apply {index}"))
}

#[rstest]
fn target_one_sends_one_and_queues_the_rest(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(1);
    for text in ["north", "east", "south"] {
        tracker.enqueue(ordinary(text), &mut sink).expect("enqueue");
    }
    assert_eq!(client.take_sent(), ["issue 1 1 north"]);
    assert_eq!(tracker.queued_len(), 2);

    tracker.on_acknowledgement(&mut sink).expect("ack");
    assert_eq!(client.take_sent(), ["issue 1 1 east"]);
    assert_eq!(tracker.queued_len(), 1);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(5)]
fn acknowledged_commands_fill_exactly_the_target(client: Loopback, #[case] target: usize) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(target);
    for text in ["north", "east", "south", "west", "north", "east", "south"] {
        tracker.enqueue(ordinary(text), &mut sink).expect("enqueue");
    }
    assert_eq!(client.sent().len(), target);
    assert_eq!(tracker.lower_bound_pending(), target);
    assert_eq!(tracker.queued_len(), 7 - target);

    tracker.on_acknowledgement(&mut sink).expect("ack");
    assert_eq!(client.sent().len(), target + 1);
    assert_eq!(tracker.lower_bound_pending(), target);
}

#[rstest]
fn special_then_ordinary_counts_only_the_acknowledged_tail(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(2);
    tracker.enqueue(special(0), &mut sink).expect("enqueue");
    for text in ["north", "east", "south"] {
        tracker.enqueue(ordinary(text), &mut sink).expect("enqueue");
    }
    assert_eq!(
        client.sent(),
        ["issue apply 0", "issue 1 1 north", "issue 1 1 east"]
    );
    assert_eq!(tracker.lower_bound_pending(), 2);
    assert_eq!(tracker.queued_len(), 1);
}

#[rstest]
fn target_two_interleaves_no_ops_between_specials(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(2);
    for index in 0..5 {
        tracker.enqueue(special(index), &mut sink).expect("enqueue");
    }
    while tracker.queued_len() > 0 {
        tracker.on_acknowledgement(&mut sink).expect("ack");
    }
    assert_eq!(
        client.sent(),
        [
            "issue apply 0",
            "issue 1 1 stay",
            "issue apply 1",
            "issue 1 1 stay",
            "issue apply 2",
            "issue 1 1 stay",
            "issue apply 3",
            "issue 1 1 stay",
            "issue apply 4",
        ]
    );
}

#[rstest]
fn target_three_injects_after_two_consecutive_specials(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(3);
    for index in 0..10 {
        tracker.enqueue(special(index), &mut sink).expect("enqueue");
    }
    assert_eq!(
        client.sent(),
        [
            "issue apply 0",
            "issue apply 1",
            "issue 1 1 stay",
            "issue apply 2",
            "issue apply 3",
        ]
    );
    assert_eq!(tracker.lower_bound_pending(), 3);
    assert_eq!(tracker.upper_bound_pending(), 5);
    assert_eq!(tracker.queued_len(), 6);
}

#[rstest]
fn target_one_allows_a_single_special_then_no_op(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(1);
    tracker.enqueue(special(0), &mut sink).expect("enqueue");
    tracker.enqueue(special(1), &mut sink).expect("enqueue");
    assert_eq!(
        client.sent(),
        ["issue apply 0", "issue 1 1 stay", "issue apply 1"]
    );
    assert_eq!(tracker.lower_bound_pending(), 2);
    assert!(tracker.has_target_pending());
}

#[rstest]
fn acknowledgement_resolves_leading_specials(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(4);
    tracker.enqueue(special(0), &mut sink).expect("enqueue");
    tracker.enqueue(ordinary("east"), &mut sink).expect("enqueue");
    tracker.enqueue(special(1), &mut sink).expect("enqueue");
    assert_eq!(tracker.upper_bound_pending(), 3);
    assert_eq!(tracker.lower_bound_pending(), 2);

    tracker.on_acknowledgement(&mut sink).expect("ack");
    assert_eq!(tracker.upper_bound_pending(), 1);
    assert_eq!(tracker.lower_bound_pending(), 0);
    assert!(!tracker.can_safely_await());
}

#[rstest]
fn stray_acknowledgement_is_ignored(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(2);
    tracker.on_acknowledgement(&mut sink).expect("ack");
    assert!(tracker.is_idle());
    assert!(client.sent().is_empty());
}

#[rstest]
fn ensure_can_await_sends_one_no_op_only_when_needed(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(3);
    tracker.ensure_can_await(&mut sink).expect("empty tracker");
    assert!(client.sent().is_empty());

    tracker.enqueue(special(0), &mut sink).expect("enqueue");
    assert!(!tracker.can_safely_await());
    tracker.ensure_can_await(&mut sink).expect("no-op");
    tracker.ensure_can_await(&mut sink).expect("already safe");
    assert_eq!(client.sent(), ["issue apply 0", "issue 1 1 stay"]);
    assert!(tracker.can_safely_await());
}

#[rstest]
fn raising_the_target_dispatches_queued_work(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(1);
    for text in ["north", "east", "south"] {
        tracker.enqueue(ordinary(text), &mut sink).expect("enqueue");
    }
    tracker.set_target(3, &mut sink).expect("raise");
    assert_eq!(tracker.queued_len(), 0);
    assert_eq!(tracker.upper_bound_pending(), 3);

    tracker.set_target(1, &mut sink).expect("lower");
    assert_eq!(tracker.upper_bound_pending(), 3);
}

#[rstest]
fn dropping_queued_commands_is_idempotent(client: Loopback) {
    let mut sink = client.sink();
    let mut tracker = PendingCommandTracker::new(1);
    for text in ["north", "east", "south"] {
        tracker.enqueue(ordinary(text), &mut sink).expect("enqueue");
    }
    assert_eq!(tracker.drop_queued(), 2);
    assert_eq!(tracker.drop_queued(), 0);
    assert_eq!(tracker.queued_len(), 0);
    assert_eq!(tracker.upper_bound_pending(), 1);
    assert!(tracker.invariant_holds());
}

#[rstest]
fn failed_dispatch_keeps_the_command_queued() {
    struct BrokenSink;

    impl LineSink for BrokenSink {
        fn send_line(&mut self, _line: &str) -> Result<(), TransportError> {
            Err(TransportError::Closed)
        }

        fn send_console(&mut self, _line: &str) {}
    }

    let mut tracker = PendingCommandTracker::new(2);
    let result = tracker.enqueue(ordinary("east"), &mut BrokenSink);
    assert!(matches!(result, Err(TransportError::Closed)));
    assert_eq!(tracker.queued_len(), 1);
    assert_eq!(tracker.upper_bound_pending(), 0);
}

#[derive(Debug, Clone)]
enum Step {
    Ordinary,
    Special,
    Acknowledge,
    Pump,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Ordinary),
        Just(Step::Special),
        Just(Step::Acknowledge),
        Just(Step::Pump),
    ]
}

fn apply(step: &Step, tracker: &mut PendingCommandTracker, sink: &mut LoopbackSink) -> usize {
    let before = tracker.upper_bound_pending();
    match step {
        Step::Ordinary => tracker.enqueue(ordinary("east"), sink).expect("enqueue"),
        Step::Special => tracker.enqueue(special(0), sink).expect("enqueue"),
        Step::Acknowledge => tracker.on_acknowledgement(sink).expect("ack"),
        Step::Pump => {
            tracker.pump(sink).expect("pump");
        }
    }
    tracker.upper_bound_pending().saturating_sub(before)
}

proptest! {
    #[test]
    fn invariant_holds_after_every_operation(
        target in 0_usize..6,
        steps in proptest::collection::vec(step(), 0..64),
    ) {
        let client = Loopback::silent();
        client.set_auto_acknowledge(false);
        let mut sink = client.sink();
        let mut tracker = PendingCommandTracker::new(target);
        for step in &steps {
            apply(step, &mut tracker, &mut sink);
            prop_assert!(
                tracker.lower_bound_pending() >= target || tracker.queued_len() == 0
            );
        }
    }

    #[test]
    fn dispatch_never_overshoots_the_target(
        target in 1_usize..6,
        steps in proptest::collection::vec(step(), 0..64),
    ) {
        let client = Loopback::silent();
        client.set_auto_acknowledge(false);
        let mut sink = client.sink();
        let mut tracker = PendingCommandTracker::new(target);
        for step in &steps {
            let dispatched = apply(step, &mut tracker, &mut sink);
            if dispatched > 0 {
                prop_assert!(tracker.lower_bound_pending() <= target.max(2));
            }
        }
    }

    #[test]
    fn unacknowledged_runs_stay_bounded(
        target in 1_usize..6,
        count in 1_usize..40,
    ) {
        let client = Loopback::silent();
        let mut sink = client.sink();
        let mut tracker = PendingCommandTracker::new(target);
        for index in 0..count {
            tracker.enqueue(special(index), &mut sink).expect("enqueue");
        }
        let longest_run = client
            .sent()
            .split(|line| line == "issue 1 1 stay")
            .map(<[String]>::len)
            .max()
            .unwrap_or_default();
        prop_assert!(longest_run <= target.saturating_sub(1).max(1));
    }
}
