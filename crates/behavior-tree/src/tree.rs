//! Behavior tree container.
//!
//! [`BehaviorTree`] owns a root node, the decorator state arena, run-time
//! statistics and a bounded execution history. It is created once per agent
//! and ticked through [`BehaviorTree::update`].

use std::collections::VecDeque;
use std::time::Instant;

use crate::state::{Frame, NodeId, NodeState, NodeStates};
use crate::{BehaviorNode, Status, TreeError};

/// Default number of history entries kept per tree.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Aggregated run-time statistics of one tree.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeStats {
    pub execution_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub running_count: u64,
    pub invalid_count: u64,
    /// Running mean of update latency in microseconds.
    pub average_latency_us: f64,
}

impl TreeStats {
    fn record(&mut self, status: Status, latency_us: u64) {
        self.execution_count += 1;
        match status {
            Status::Success => self.success_count += 1,
            Status::Failure => self.failure_count += 1,
            Status::Running => self.running_count += 1,
            Status::Invalid => self.invalid_count += 1,
        }
        let n = self.execution_count as f64;
        self.average_latency_us += (latency_us as f64 - self.average_latency_us) / n;
    }
}

/// One entry of the execution history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionRecord {
    pub timestamp: u64,
    pub status: Status,
    pub latency_us: u64,
    pub aborted: bool,
}

/// Plain snapshot of everything mutable in a tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeSnapshot {
    pub name: String,
    pub node_count: usize,
    pub stats: TreeStats,
    pub history: Vec<ExecutionRecord>,
    pub node_states: Vec<(NodeId, NodeState)>,
    pub aborted: bool,
}

/// A behavior tree with its execution state and telemetry.
pub struct BehaviorTree<C> {
    name: String,
    root: BehaviorNode<C>,
    node_count: usize,
    states: NodeStates,
    stats: TreeStats,
    history: VecDeque<ExecutionRecord>,
    history_capacity: usize,
    max_iterations: u32,
    aborted: bool,
}

impl<C> BehaviorTree<C> {
    /// Creates a tree around `root`, assigning pre-order node ids.
    pub fn new(name: impl Into<String>, mut root: BehaviorNode<C>) -> Self {
        let node_count = root.assign_ids(0) as usize;
        Self {
            name: name.into(),
            root,
            node_count,
            states: NodeStates::new(),
            stats: TreeStats::default(),
            history: VecDeque::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_iterations: Frame::DEFAULT_MAX_ITERATIONS,
            aborted: false,
        }
    }

    pub fn builder(name: impl Into<String>) -> TreeBuilder<C> {
        TreeBuilder::new(name)
    }

    /// Sets the per-update iteration budget of looping decorators.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Sets how many history entries are kept (oldest dropped first).
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self.trim_history();
        self
    }

    /// Ticks the tree once.
    ///
    /// If [`abort`](Self::abort) was requested, this update returns `Failure`
    /// without touching any node and clears the abort flag.
    pub fn update(&mut self, ctx: &mut C, now: u64) -> Status {
        let started = Instant::now();
        let was_aborted = std::mem::take(&mut self.aborted);

        let status = if was_aborted {
            tracing::debug!(tree = %self.name, "update aborted");
            Status::Failure
        } else {
            let mut frame =
                Frame::new(&mut self.states, now).with_max_iterations(self.max_iterations);
            self.root.execute(ctx, &mut frame)
        };

        if status.is_invalid() {
            tracing::warn!(tree = %self.name, "tree evaluated to Invalid; check node structure");
        }

        let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.stats.record(status, latency_us);
        self.history.push_back(ExecutionRecord {
            timestamp: now,
            status,
            latency_us,
            aborted: was_aborted,
        });
        self.trim_history();

        status
    }

    /// Forces the next update to return `Failure` without evaluating nodes.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Clears decorator state, statistics and history.
    pub fn reset(&mut self) {
        self.states.clear();
        self.stats = TreeStats::default();
        self.history.clear();
        self.aborted = false;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &BehaviorNode<C> {
        &self.root
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    pub fn history(&self) -> impl Iterator<Item = &ExecutionRecord> {
        self.history.iter()
    }

    pub fn node_states(&self) -> &NodeStates {
        &self.states
    }

    /// Finds a node by display name (first match in pre-order).
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.root.visit(&mut |node| {
            if found.is_none() && node.name() == name {
                found = Some(node.id());
            }
        });
        found
    }

    /// Exports stats, history, decorator state and the abort flag.
    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            name: self.name.clone(),
            node_count: self.node_count,
            stats: self.stats.clone(),
            history: self.history.iter().copied().collect(),
            node_states: self.states.iter().collect(),
            aborted: self.aborted,
        }
    }

    /// Restores state exported by [`snapshot`](Self::snapshot).
    ///
    /// The snapshot must come from a tree of the same shape; otherwise the
    /// tree is left untouched and an error is returned.
    pub fn restore(&mut self, snapshot: TreeSnapshot) -> Result<(), TreeError> {
        if snapshot.node_count != self.node_count {
            return Err(TreeError::ShapeMismatch {
                expected: snapshot.node_count,
                actual: self.node_count,
            });
        }
        if let Some((id, _)) = snapshot
            .node_states
            .iter()
            .find(|(id, _)| id.0 as usize >= self.node_count)
        {
            return Err(TreeError::UnknownNode(*id));
        }

        let mut states = NodeStates::new();
        for (id, state) in snapshot.node_states {
            states.set(id, state);
        }

        self.states = states;
        self.stats = snapshot.stats;
        self.history = snapshot.history.into();
        self.aborted = snapshot.aborted;
        self.trim_history();
        Ok(())
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
        }
    }
}

impl<C> std::fmt::Debug for BehaviorTree<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("name", &self.name)
            .field("node_count", &self.node_count)
            .field("stats", &self.stats)
            .field("aborted", &self.aborted)
            .finish()
    }
}

/// Fallible builder for [`BehaviorTree`].
pub struct TreeBuilder<C> {
    name: String,
    root: Option<BehaviorNode<C>>,
    max_iterations: u32,
    history_capacity: usize,
}

impl<C> TreeBuilder<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
            max_iterations: Frame::DEFAULT_MAX_ITERATIONS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    pub fn root(mut self, root: BehaviorNode<C>) -> Self {
        self.root = Some(root);
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// # Errors
    ///
    /// Returns [`TreeError::MissingRoot`] if no root was supplied.
    pub fn build(self) -> Result<BehaviorTree<C>, TreeError> {
        let root = self.root.ok_or_else(|| TreeError::MissingRoot(self.name.clone()))?;
        Ok(BehaviorTree::new(self.name, root)
            .with_max_iterations(self.max_iterations)
            .with_history_capacity(self.history_capacity))
    }
}
