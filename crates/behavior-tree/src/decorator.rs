//! Decorator behavior nodes.
//!
//! Decorators wrap a single child behavior and modify its result or execution.
//! [`NodeKind::Inverter`](crate::NodeKind::Inverter) is stateless; repeater,
//! retry and cooldown keep their counters in the frame's state arena.

use crate::node::BehaviorNode;
use crate::state::{Frame, NodeId};
use crate::Status;

/// Swaps Success and Failure; Running and Invalid pass through.
pub(crate) fn inverter<C>(child: &BehaviorNode<C>, ctx: &mut C, frame: &mut Frame<'_>) -> Status {
    child.execute(ctx, frame).invert()
}

/// Re-invokes the child while it succeeds, up to `count` times.
///
/// # Semantics
///
/// - `count >= 0`: Success once the child has succeeded `count` times
/// - `count == -1`: repeat until the child stops succeeding
/// - the first non-Success child result is returned as-is
///
/// Every child invocation spends one unit of the update's shared iteration
/// budget, so nested repeaters cannot multiply it. When the budget is spent
/// the repeater returns `Running` and keeps its counter, so the next update
/// resumes where this one stopped.
pub(crate) fn repeater<C>(
    id: NodeId,
    count: i32,
    child: &BehaviorNode<C>,
    ctx: &mut C,
    frame: &mut Frame<'_>,
) -> Status {
    if count < -1 {
        tracing::warn!(node = %id, count, "repeater count must be -1 or non-negative");
        return Status::Invalid;
    }
    let limit = u32::try_from(count).ok();

    let mut state = frame.state(id);

    loop {
        if let Some(limit) = limit
            && state.repeat_count >= limit
        {
            state.repeat_count = 0;
            frame.store(id, state);
            return Status::Success;
        }

        if !frame.spend() {
            tracing::debug!(node = %id, repeated = state.repeat_count, "repeater yielding");
            frame.store(id, state);
            return Status::Running;
        }

        match child.execute(ctx, frame) {
            Status::Success => state.repeat_count = state.repeat_count.saturating_add(1),
            Status::Running => {
                frame.store(id, state);
                return Status::Running;
            }
            other => {
                state.repeat_count = 0;
                frame.store(id, state);
                return other;
            }
        }
    }
}

/// Re-invokes a failing child up to `max_retries` additional times.
///
/// # Semantics
///
/// - child Success ⇒ Success, counter reset
/// - child Running ⇒ Running immediately, attempts so far are kept
/// - child Failure after `max_retries` retries ⇒ Failure, counter reset
///
/// Each retry after a failure spends from the update's iteration budget.
/// Once it is exhausted the node yields `Running` with its attempt count
/// kept, and the next update continues retrying.
pub(crate) fn retry<C>(
    id: NodeId,
    max_retries: u32,
    child: &BehaviorNode<C>,
    ctx: &mut C,
    frame: &mut Frame<'_>,
) -> Status {
    let mut state = frame.state(id);

    loop {
        match child.execute(ctx, frame) {
            Status::Failure => {
                if state.retry_count >= max_retries {
                    state.retry_count = 0;
                    frame.store(id, state);
                    return Status::Failure;
                }
                state.retry_count += 1;
                if !frame.spend() {
                    tracing::debug!(node = %id, attempts = state.retry_count, "retry yielding");
                    frame.store(id, state);
                    return Status::Running;
                }
                tracing::trace!(node = %id, attempt = state.retry_count, "retrying");
            }
            Status::Running => {
                frame.store(id, state);
                return Status::Running;
            }
            other => {
                state.retry_count = 0;
                frame.store(id, state);
                return other;
            }
        }
    }
}

/// Refuses to run the child until `cooldown_ms` has elapsed since its last
/// Success/Running outcome.
pub(crate) fn cooldown<C>(
    id: NodeId,
    cooldown_ms: u64,
    child: &BehaviorNode<C>,
    ctx: &mut C,
    frame: &mut Frame<'_>,
) -> Status {
    let mut state = frame.state(id);
    let now = frame.now();

    if let Some(last) = state.last_execution
        && now.saturating_sub(last) < cooldown_ms
    {
        return Status::Failure;
    }

    let status = child.execute(ctx, frame);
    if matches!(status, Status::Success | Status::Running) {
        state.last_execution = Some(now);
        frame.store(id, state);
    }
    status
}
