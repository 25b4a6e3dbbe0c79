//! Builder utilities for ergonomic behavior tree construction.
//!
//! This module provides helper functions to reduce boilerplate when building
//! behavior trees. Instead of writing verbose
//! `BehaviorNode::new(name, NodeKind::Sequence, vec![...])`, you can use
//! shorter functions like `sequence(name, vec![...])`.

use crate::behavior::FnBehavior;
use crate::{Behavior, BehaviorNode, NodeKind, ParallelPolicy, Status};

/// Creates a sequence node.
#[inline]
pub fn sequence<C>(name: impl Into<String>, children: Vec<BehaviorNode<C>>) -> BehaviorNode<C> {
    BehaviorNode::new(name, NodeKind::Sequence, children)
}

/// Creates a selector node.
#[inline]
pub fn selector<C>(name: impl Into<String>, children: Vec<BehaviorNode<C>>) -> BehaviorNode<C> {
    BehaviorNode::new(name, NodeKind::Selector, children)
}

/// Creates a parallel node with the given combination policy.
#[inline]
pub fn parallel<C>(
    name: impl Into<String>,
    policy: ParallelPolicy,
    children: Vec<BehaviorNode<C>>,
) -> BehaviorNode<C> {
    BehaviorNode::new(name, NodeKind::Parallel(policy), children)
}

/// Creates an inverter node.
#[inline]
pub fn inverter<C>(name: impl Into<String>, child: BehaviorNode<C>) -> BehaviorNode<C> {
    BehaviorNode::new(name, NodeKind::Inverter, vec![child])
}

/// Creates a repeater node. `count == -1` repeats without bound.
#[inline]
pub fn repeater<C>(name: impl Into<String>, count: i32, child: BehaviorNode<C>) -> BehaviorNode<C> {
    BehaviorNode::new(name, NodeKind::Repeater { count }, vec![child])
}

/// Creates a retry node.
#[inline]
pub fn retry<C>(name: impl Into<String>, max_retries: u32, child: BehaviorNode<C>) -> BehaviorNode<C> {
    BehaviorNode::new(name, NodeKind::Retry { max_retries }, vec![child])
}

/// Creates a cooldown node.
#[inline]
pub fn cooldown<C>(name: impl Into<String>, cooldown_ms: u64, child: BehaviorNode<C>) -> BehaviorNode<C> {
    BehaviorNode::new(name, NodeKind::Cooldown { cooldown_ms }, vec![child])
}

/// Creates a condition leaf from a predicate.
#[inline]
pub fn condition<C, F>(name: impl Into<String>, predicate: F) -> BehaviorNode<C>
where
    F: Fn(&C) -> bool + Send + Sync + 'static,
{
    BehaviorNode::new(name, NodeKind::Condition(Box::new(predicate)), Vec::new())
}

/// Creates an action leaf from a closure.
#[inline]
pub fn action<C, F>(name: impl Into<String>, f: F) -> BehaviorNode<C>
where
    C: 'static,
    F: Fn(&mut C) -> Status + Send + Sync + 'static,
{
    BehaviorNode::new(name, NodeKind::Action(Box::new(FnBehavior::new(f))), Vec::new())
}

/// Creates an action leaf from any [`Behavior`] implementation.
#[inline]
pub fn leaf<C, B>(name: impl Into<String>, behavior: B) -> BehaviorNode<C>
where
    B: Behavior<C> + 'static,
{
    BehaviorNode::new(name, NodeKind::Action(Box::new(behavior)), Vec::new())
}
