//! Stateful behavior tree engine for turn-based games.
//!
//! This library provides a deterministic behavior tree implementation designed
//! for per-turn NPC decision making.
//!
//! - **Tri-state results**: Success, Failure and Running, plus Invalid for
//!   structurally malformed nodes
//! - **No intra-tick suspension**: Running is a continuation marker; looping
//!   decorators are bounded by a per-update iteration budget and resume on the
//!   next update
//! - **State arena**: decorator counters and cooldown stamps live in the tree,
//!   keyed by node id, never inside shared node values
//!
//! # Architecture
//!
//! - [`Behavior`]: Callback trait behind action leaves
//! - [`Status`]: Success / Failure / Running / Invalid
//! - [`BehaviorNode`]: Tagged node ([`NodeKind`]) with children and optional guard
//! - Composites: Selector, Sequence, Parallel ([`ParallelPolicy`])
//! - Decorators: Inverter, Repeater, Retry, Cooldown
//! - [`BehaviorTree`]: Root owner with stats, bounded history and abort flag

pub mod behavior;
pub mod builder;
pub mod composite;
pub mod decorator;
pub mod error;
pub mod node;
pub mod state;
pub mod status;
pub mod tree;

// Re-export core types for ergonomic API
pub use behavior::{Behavior, FnBehavior};
pub use error::TreeError;
pub use node::{BehaviorNode, NodeKind, ParallelPolicy, Predicate};
pub use state::{Frame, NodeId, NodeState, NodeStates};
pub use status::Status;
pub use tree::{BehaviorTree, ExecutionRecord, TreeBuilder, TreeSnapshot, TreeStats};
