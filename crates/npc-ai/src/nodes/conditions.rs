//! Condition leaves over the [`Blackboard`].
//!
//! Conditions read the blackboard and succeed or fail. They never propose
//! actions.

use behavior_tree::{BehaviorNode, builder};
use game_core::Needs;

use crate::blackboard::Blackboard;
use crate::oracle::ThreatLevel;

type Node = BehaviorNode<Blackboard>;

/// Succeeds if at least one enemy is perceived.
pub fn has_enemies() -> Node {
    builder::condition("has_enemies", Blackboard::has_enemies)
}

/// Succeeds if `health / max_health < threshold`.
///
/// # Example
///
/// ```rust,ignore
/// // Flee below 30% health
/// sequence("flee", vec![health_below(0.3), leaf("flee", FleeFromThreat)])
/// ```
pub fn health_below(threshold: f32) -> Node {
    builder::condition("health_below", move |board: &Blackboard| {
        board.health_ratio() < threshold
    })
}

/// Succeeds if the nearest enemy stands within `range`.
pub fn enemy_within(range: f32) -> Node {
    builder::condition("enemy_within", move |board: &Blackboard| {
        board
            .nearest_enemy()
            .is_some_and(|e| board.position.distance_to(e.position) <= range)
    })
}

/// Succeeds if the nearest enemy is within the blackboard's melee range.
pub fn enemy_in_melee() -> Node {
    builder::condition("enemy_in_melee", |board: &Blackboard| {
        board
            .nearest_enemy()
            .is_some_and(|e| board.position.distance_to(e.position) <= board.melee_range)
    })
}

/// Succeeds if the highest perceived threat is at least `level`.
pub fn threat_at_least(level: ThreatLevel) -> Node {
    builder::condition("threat_at_least", move |board: &Blackboard| {
        board.highest_threat.is_some_and(|t| t.level >= level)
    })
}

/// Succeeds if any of `needs` is flagged.
pub fn needs_any(needs: Needs) -> Node {
    builder::condition("needs_any", move |board: &Blackboard| {
        board.needs.intersects(needs)
    })
}

/// Succeeds if the agent stands on its patrol waypoint.
pub fn at_waypoint() -> Node {
    builder::condition("at_waypoint", |board: &Blackboard| {
        board.waypoint == Some(board.position)
    })
}

/// Succeeds if a non-hostile entity is perceived.
pub fn has_neighbor() -> Node {
    builder::condition("has_neighbor", |board: &Blackboard| {
        !board.neighbors.is_empty()
    })
}

/// Succeeds if no Critical threat stands close to the agent.
pub fn is_safe() -> Node {
    builder::condition("is_safe", |board: &Blackboard| board.safe)
}
