//! Patrol policy: walk a fixed route of waypoints.

use behavior_tree::builder;
use game_core::Position;
use serde::{Deserialize, Serialize};

use super::{NodeFactory, StrategyPredicate};
use crate::nodes::{MoveToWaypoint, Wait, at_waypoint};

/// Waypoints and the index of the one currently targeted.
///
/// The cursor only moves through [`advance`](Self::advance); querying the
/// current waypoint never changes it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolRoute {
    pub waypoints: Vec<Position>,
    pub cursor: usize,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Position>) -> Self {
        Self {
            waypoints,
            cursor: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn current(&self) -> Option<Position> {
        self.waypoints.get(self.cursor).copied()
    }

    /// Moves to the next waypoint, wrapping around, and returns it.
    pub fn advance(&mut self) -> Option<Position> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.waypoints.len();
        self.current()
    }
}

pub(super) fn predicates() -> Vec<StrategyPredicate> {
    vec![StrategyPredicate::new(|_, params| {
        params.route().is_some_and(|route| !route.is_empty())
    })]
}

pub(super) fn nodes() -> Vec<NodeFactory> {
    vec![
        NodeFactory::new(|_| {
            builder::sequence(
                "arrived",
                vec![at_waypoint(), builder::leaf("pause", Wait)],
            )
        }),
        NodeFactory::new(|_| builder::leaf("walk", MoveToWaypoint)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_and_only_moves_on_advance() {
        let a = Position::new(1, 0, 0);
        let b = Position::new(5, 0, 0);
        let mut route = PatrolRoute::new(vec![a, b]);

        assert_eq!(route.current(), Some(a));
        assert_eq!(route.current(), Some(a));
        assert_eq!(route.advance(), Some(b));
        assert_eq!(route.advance(), Some(a));
        assert_eq!(PatrolRoute::default().advance(), None);
    }
}
