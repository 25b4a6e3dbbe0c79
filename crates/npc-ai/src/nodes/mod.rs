//! Behavior tree leaves for NPCs.
//!
//! - [`conditions`]: Check blackboard state (Success/Failure)
//! - [`actions`]: Propose actions on the blackboard
mod actions;
mod conditions;

pub use actions::{
    ApproachNeighbor, AttackNearestEnemy, Consume, FleeFromThreat, InteractWithNeighbor,
    MoveToWaypoint, Wait,
};
pub use conditions::{
    at_waypoint, enemy_in_melee, enemy_within, has_enemies, has_neighbor, health_below,
    is_safe, needs_any, threat_at_least,
};
