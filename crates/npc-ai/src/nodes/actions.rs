//! Action leaves over the [`Blackboard`].
//!
//! Action nodes propose an [`AiAction`] on the blackboard; the controller
//! turns the proposal into a decision. They fail when their action does not
//! make sense this tick so a surrounding selector can fall through.

use behavior_tree::{Behavior, Status};

use crate::blackboard::Blackboard;
use crate::decision::AiAction;

/// Proposes attacking the nearest enemy.
///
/// The turn executor closes distance first if the enemy is out of melee range.
pub struct AttackNearestEnemy;

impl Behavior<Blackboard> for AttackNearestEnemy {
    fn tick(&self, board: &mut Blackboard) -> Status {
        let Some(enemy) = board.nearest_enemy().copied() else {
            return Status::Failure;
        };
        board.propose(AiAction::attack(enemy.target, enemy.position));
        Status::Success
    }
}

/// Proposes fleeing from the highest threat.
pub struct FleeFromThreat;

impl Behavior<Blackboard> for FleeFromThreat {
    fn tick(&self, board: &mut Blackboard) -> Status {
        let Some(threat) = board.highest_threat.filter(|t| t.level.is_hostile()) else {
            return Status::Failure;
        };
        board.propose(AiAction::flee(threat.target, threat.position));
        Status::Success
    }
}

/// Walks towards the current patrol waypoint.
///
/// Returns `Running` while travelling and `Success` once standing on it.
pub struct MoveToWaypoint;

impl Behavior<Blackboard> for MoveToWaypoint {
    fn tick(&self, board: &mut Blackboard) -> Status {
        match board.waypoint {
            None => Status::Failure,
            Some(waypoint) if waypoint == board.position => Status::Success,
            Some(waypoint) => {
                board.propose(AiAction::move_to(waypoint));
                Status::Running
            }
        }
    }
}

/// Eats, drinks or sleeps according to the most urgent flagged need.
pub struct Consume;

impl Behavior<Blackboard> for Consume {
    fn tick(&self, board: &mut Blackboard) -> Status {
        match AiAction::for_needs(board.needs) {
            Some(action) => {
                board.propose(action);
                Status::Success
            }
            None => Status::Failure,
        }
    }
}

/// Follows the nearest neighbour until adjacent to it.
pub struct ApproachNeighbor;

impl Behavior<Blackboard> for ApproachNeighbor {
    fn tick(&self, board: &mut Blackboard) -> Status {
        let Some(neighbor) = board.nearest_neighbor() else {
            return Status::Failure;
        };
        if board.position.is_adjacent(neighbor.position) {
            return Status::Failure;
        }
        let action = AiAction::follow(neighbor.id, neighbor.position);
        board.propose(action);
        Status::Running
    }
}

/// Interacts with the nearest neighbour if it stands adjacent.
pub struct InteractWithNeighbor;

impl Behavior<Blackboard> for InteractWithNeighbor {
    fn tick(&self, board: &mut Blackboard) -> Status {
        let Some(neighbor) = board.nearest_neighbor() else {
            return Status::Failure;
        };
        if !board.position.is_adjacent(neighbor.position) {
            return Status::Failure;
        }
        let action = AiAction::interact(neighbor.id);
        board.propose(action);
        Status::Success
    }
}

/// Does nothing this turn. Always succeeds.
pub struct Wait;

impl Behavior<Blackboard> for Wait {
    fn tick(&self, board: &mut Blackboard) -> Status {
        board.propose(AiAction::wait());
        Status::Success
    }
}
