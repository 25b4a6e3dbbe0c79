//! Per-node execution state.
//!
//! Decorators (repeat/retry counters, cooldown timestamps) need state that
//! survives across ticks. That state lives in a [`NodeStates`] arena keyed by
//! [`NodeId`] and owned by the tree, never inside the node values themselves,
//! so two trees compiled from the same blueprint never share counters.

use std::collections::BTreeMap;

/// Stable identifier of a node within one tree.
///
/// Ids are assigned in pre-order when a [`crate::BehaviorTree`] is built, so
/// the same tree shape always produces the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable execution state of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeState {
    /// Successful child completions counted by a `Repeater`.
    pub repeat_count: u32,
    /// Failed attempts counted by a `Retry`.
    pub retry_count: u32,
    /// Timestamp (ms) of the last Success/Running outcome under a `Cooldown`.
    pub last_execution: Option<u64>,
}

impl NodeState {
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }
}

/// Arena of node states keyed by node identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStates {
    states: BTreeMap<NodeId, NodeState>,
}

impl NodeStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the state for `id` (default if never touched).
    pub fn get(&self, id: NodeId) -> NodeState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    /// Stores `state` for `id`. Pristine states are dropped to keep the arena small.
    pub fn set(&mut self, id: NodeId, state: NodeState) {
        if state.is_pristine() {
            self.states.remove(&id);
        } else {
            self.states.insert(id, state);
        }
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeState)> + '_ {
        self.states.iter().map(|(id, state)| (*id, *state))
    }
}

/// Everything a node needs from the outside world during one tick besides
/// the user context: the state arena, the current time, and the loop budget.
pub struct Frame<'a> {
    states: &'a mut NodeStates,
    now: u64,
    max_iterations: u32,
    remaining: u32,
}

impl<'a> Frame<'a> {
    /// Default bound on decorator loop iterations within one update.
    pub const DEFAULT_MAX_ITERATIONS: u32 = 1_000;

    pub fn new(states: &'a mut NodeStates, now: u64) -> Self {
        Self {
            states,
            now,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            remaining: Self::DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Sets the iteration budget shared by every looping decorator of this
    /// update (min 1).
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self.remaining = self.max_iterations;
        self
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Takes one loop iteration from the budget. Returns `false` once it is
    /// exhausted; the caller must then yield `Running`.
    #[inline]
    pub fn spend(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    #[inline]
    pub fn state(&self, id: NodeId) -> NodeState {
        self.states.get(id)
    }

    #[inline]
    pub fn store(&mut self, id: NodeId, state: NodeState) {
        self.states.set(id, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pristine_state_is_not_stored() {
        let mut states = NodeStates::new();
        states.set(NodeId(3), NodeState::default());
        assert!(states.is_empty());

        states.set(
            NodeId(3),
            NodeState {
                retry_count: 2,
                ..NodeState::default()
            },
        );
        assert_eq!(states.len(), 1);
        assert_eq!(states.get(NodeId(3)).retry_count, 2);

        states.set(NodeId(3), NodeState::default());
        assert!(states.is_empty());
    }

    #[test]
    fn frame_budget_is_at_least_one() {
        let mut states = NodeStates::new();
        let frame = Frame::new(&mut states, 0).with_max_iterations(0);
        assert_eq!(frame.max_iterations(), 1);
    }

    #[test]
    fn spending_stops_at_zero() {
        let mut states = NodeStates::new();
        let mut frame = Frame::new(&mut states, 0).with_max_iterations(2);
        assert!(frame.spend());
        assert!(frame.spend());
        assert!(!frame.spend());
        assert_eq!(frame.remaining(), 0);
        assert_eq!(frame.max_iterations(), 2);
    }
}
