//! Composite behavior nodes.
//!
//! Composite nodes control the execution flow of multiple child behaviors.
//! This module implements the evaluation rules of the three composites:
//! `Sequence` (AND logic), `Selector` (OR logic) and `Parallel`
//! (policy-combined, no short-circuit). Any number of children is allowed.

use crate::node::{BehaviorNode, ParallelPolicy};
use crate::state::Frame;
use crate::Status;

/// Executes children in order until one does not fail.
///
/// # Semantics
///
/// - If a child returns `Success`, the selector **stops immediately** and returns `Success`
/// - If a child returns `Running`, the selector **stops immediately** and returns `Running`
/// - If a child returns `Failure`, the selector **continues** to the next child
/// - If all children return `Failure` (or there are none), the selector returns `Failure`
///
/// An `Invalid` child aborts evaluation and surfaces as `Invalid`.
pub(crate) fn selector<C>(children: &[BehaviorNode<C>], ctx: &mut C, frame: &mut Frame<'_>) -> Status {
    for child in children {
        match child.execute(ctx, frame) {
            Status::Failure => continue,
            other => return other, // Short-circuit
        }
    }
    Status::Failure
}

/// Executes children in order until one does not succeed.
///
/// # Semantics
///
/// - If a child returns `Failure` or `Running`, the sequence **stops immediately** with it
/// - If a child returns `Success`, the sequence **continues** to the next child
/// - If all children return `Success` (or there are none), the sequence returns `Success`
pub(crate) fn sequence<C>(children: &[BehaviorNode<C>], ctx: &mut C, frame: &mut Frame<'_>) -> Status {
    for child in children {
        match child.execute(ctx, frame) {
            Status::Success => continue,
            other => return other, // Short-circuit
        }
    }
    Status::Success
}

/// Executes **all** children every call and combines their statuses.
pub(crate) fn parallel<C>(
    policy: ParallelPolicy,
    children: &[BehaviorNode<C>],
    ctx: &mut C,
    frame: &mut Frame<'_>,
) -> Status {
    let mut successes = 0usize;
    let mut failures = 0usize;
    let mut running = 0usize;
    let mut invalid = false;

    for child in children {
        match child.execute(ctx, frame) {
            Status::Success => successes += 1,
            Status::Failure => failures += 1,
            Status::Running => running += 1,
            Status::Invalid => invalid = true,
        }
    }

    if invalid {
        return Status::Invalid;
    }

    combine(policy, successes, failures, running, children.len())
}

fn combine(
    policy: ParallelPolicy,
    successes: usize,
    failures: usize,
    running: usize,
    total: usize,
) -> Status {
    match policy {
        ParallelPolicy::RequireOne => {
            if successes > 0 {
                Status::Success
            } else if running > 0 {
                Status::Running
            } else {
                Status::Failure
            }
        }
        ParallelPolicy::RequireAll => {
            if failures > 0 {
                Status::Failure
            } else if running > 0 {
                Status::Running
            } else {
                Status::Success
            }
        }
        ParallelPolicy::RequireSuccess => {
            // Strict majority; an empty parallel never reaches it.
            if total > 0 && successes * 2 > total {
                Status::Success
            } else if running > 0 {
                Status::Running
            } else {
                Status::Failure
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::*;
    use crate::{BehaviorNode, BehaviorTree, ParallelPolicy, Status};

    #[derive(Default)]
    struct TestContext {
        value: i32,
        calls: u32,
    }

    fn increment() -> BehaviorNode<TestContext> {
        action("increment", |ctx: &mut TestContext| {
            ctx.value += 1;
            ctx.calls += 1;
            Status::Success
        })
    }

    fn decrement() -> BehaviorNode<TestContext> {
        action("decrement", |ctx: &mut TestContext| {
            ctx.value -= 1;
            ctx.calls += 1;
            Status::Success
        })
    }

    fn fixed(status: Status) -> BehaviorNode<TestContext> {
        action("fixed", move |ctx: &mut TestContext| {
            ctx.calls += 1;
            status
        })
    }

    fn run(root: BehaviorNode<TestContext>) -> (Status, TestContext) {
        let mut tree = BehaviorTree::new("test", root);
        let mut ctx = TestContext::default();
        let status = tree.update(&mut ctx, 0);
        (status, ctx)
    }

    #[test]
    fn sequence_all_success() {
        let (status, ctx) = run(sequence("seq", vec![increment(), increment()]));
        assert_eq!(status, Status::Success);
        assert_eq!(ctx.value, 2);
    }

    #[test]
    fn sequence_fails_on_first_failure() {
        let (status, ctx) = run(sequence(
            "seq",
            vec![
                increment(),
                fixed(Status::Failure),
                increment(), // Should not execute
            ],
        ));
        assert_eq!(status, Status::Failure);
        assert_eq!(ctx.value, 1);
        assert_eq!(ctx.calls, 2);
    }

    #[test]
    fn sequence_stops_on_running() {
        let (status, ctx) = run(sequence("seq", vec![fixed(Status::Running), increment()]));
        assert_eq!(status, Status::Running);
        assert_eq!(ctx.value, 0);
    }

    #[test]
    fn selector_succeeds_on_first_success() {
        let (status, ctx) = run(selector(
            "sel",
            vec![
                fixed(Status::Failure),
                increment(),
                decrement(), // Should not execute
            ],
        ));
        assert_eq!(status, Status::Success);
        assert_eq!(ctx.value, 1);
        assert_eq!(ctx.calls, 2);
    }

    #[test]
    fn selector_short_circuits_on_running() {
        let (status, ctx) = run(selector("sel", vec![fixed(Status::Running), increment()]));
        assert_eq!(status, Status::Running);
        assert_eq!(ctx.calls, 1);
    }

    #[test]
    fn selector_fails_when_all_fail() {
        let (status, _) = run(selector(
            "sel",
            vec![fixed(Status::Failure), fixed(Status::Failure)],
        ));
        assert_eq!(status, Status::Failure);
    }

    #[test]
    fn empty_composites() {
        assert_eq!(run(selector("sel", vec![])).0, Status::Failure);
        assert_eq!(run(sequence("seq", vec![])).0, Status::Success);
        assert_eq!(
            run(parallel("par", ParallelPolicy::RequireAll, vec![])).0,
            Status::Success
        );
        assert_eq!(
            run(parallel("par", ParallelPolicy::RequireOne, vec![])).0,
            Status::Failure
        );
        assert_eq!(
            run(parallel("par", ParallelPolicy::RequireSuccess, vec![])).0,
            Status::Failure
        );
    }

    #[test]
    fn parallel_evaluates_every_child() {
        let (status, ctx) = run(parallel(
            "par",
            ParallelPolicy::RequireOne,
            vec![increment(), fixed(Status::Failure), increment()],
        ));
        assert_eq!(status, Status::Success);
        assert_eq!(ctx.calls, 3);
        assert_eq!(ctx.value, 2);
    }

    #[test]
    fn parallel_require_one() {
        let policy = ParallelPolicy::RequireOne;
        let (status, _) = run(parallel(
            "par",
            policy,
            vec![fixed(Status::Failure), fixed(Status::Running)],
        ));
        assert_eq!(status, Status::Running);

        let (status, _) = run(parallel(
            "par",
            policy,
            vec![fixed(Status::Failure), fixed(Status::Failure)],
        ));
        assert_eq!(status, Status::Failure);
    }

    #[test]
    fn parallel_require_all() {
        let policy = ParallelPolicy::RequireAll;
        let (status, _) = run(parallel(
            "par",
            policy,
            vec![fixed(Status::Running), fixed(Status::Failure)],
        ));
        assert_eq!(status, Status::Failure);

        let (status, _) = run(parallel(
            "par",
            policy,
            vec![fixed(Status::Success), fixed(Status::Running)],
        ));
        assert_eq!(status, Status::Running);

        let (status, _) = run(parallel(
            "par",
            policy,
            vec![fixed(Status::Success), fixed(Status::Success)],
        ));
        assert_eq!(status, Status::Success);
    }

    #[test]
    fn parallel_require_success_needs_majority() {
        let policy = ParallelPolicy::RequireSuccess;
        let (status, _) = run(parallel(
            "par",
            policy,
            vec![
                fixed(Status::Success),
                fixed(Status::Success),
                fixed(Status::Failure),
            ],
        ));
        assert_eq!(status, Status::Success);

        // Exactly half is not a majority.
        let (status, _) = run(parallel(
            "par",
            policy,
            vec![fixed(Status::Success), fixed(Status::Failure)],
        ));
        assert_eq!(status, Status::Failure);

        let (status, _) = run(parallel(
            "par",
            policy,
            vec![fixed(Status::Success), fixed(Status::Running)],
        ));
        assert_eq!(status, Status::Running);
    }

    #[test]
    fn invalid_child_surfaces_through_composites() {
        let broken = || BehaviorNode::new("broken", crate::NodeKind::Inverter, vec![]);
        assert_eq!(run(selector("sel", vec![broken(), increment()])).0, Status::Invalid);
        assert_eq!(run(sequence("seq", vec![broken()])).0, Status::Invalid);
        assert_eq!(
            run(parallel("par", ParallelPolicy::RequireOne, vec![increment(), broken()])).0,
            Status::Invalid
        );
    }
}
