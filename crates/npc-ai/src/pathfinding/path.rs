//! Path values, search requests and movement cost rules.

use game_core::Position;
use serde::{Deserialize, Serialize};

/// Cost of one orthogonal lateral step.
pub const ORTHOGONAL_COST: f32 = 1.0;
/// Cost of one diagonal lateral step.
pub const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;
/// Multiplier applied to any step that changes level.
pub const LEVEL_CHANGE_MULTIPLIER: f32 = 2.0;

/// Cost of moving between two neighbouring tiles.
pub fn step_cost(from: Position, to: Position) -> f32 {
    let lateral = from.x.abs_diff(to.x) + from.y.abs_diff(to.y);
    let base = if lateral >= 2 {
        DIAGONAL_COST
    } else {
        ORTHOGONAL_COST
    };
    if from.z != to.z {
        base * LEVEL_CHANGE_MULTIPLIER
    } else {
        base
    }
}

/// Manhattan distance with the vertical term weighted like level changes.
///
/// Admissible for 4-neighbour searches. With diagonal moves it overestimates
/// (a diagonal step costs `DIAGONAL_COST` but counts as 2 here), so searches
/// that allow diagonals are fast but may return a slightly longer route
/// around obstacles. Straight and pure-diagonal routes on open ground are
/// still minimal.
pub fn heuristic(from: Position, to: Position) -> f32 {
    let lateral = from.x.abs_diff(to.x) + from.y.abs_diff(to.y);
    lateral as f32 + from.z.abs_diff(to.z) as f32 * LEVEL_CHANGE_MULTIPLIER
}

/// Parameters of one path search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathRequest {
    pub start: Position,
    pub end: Position,
    pub allow_diagonal: bool,
    pub max_cost: f32,
    /// Treat tiles occupied by creatures as free.
    pub ignore_creatures: bool,
}

impl PathRequest {
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            allow_diagonal: true,
            max_cost: 1_000.0,
            ignore_creatures: false,
        }
    }

    #[must_use]
    pub fn allow_diagonal(mut self, allow: bool) -> Self {
        self.allow_diagonal = allow;
        self
    }

    #[must_use]
    pub fn max_cost(mut self, max_cost: f32) -> Self {
        self.max_cost = max_cost;
        self
    }

    #[must_use]
    pub fn ignore_creatures(mut self, ignore: bool) -> Self {
        self.ignore_creatures = ignore;
        self
    }
}

/// Ordered tiles from start to end, both included, with total movement cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<Position>,
    cost: f32,
}

impl Path {
    /// Builds a path from points, computing its cost.
    pub fn new(points: Vec<Position>) -> Self {
        let cost = Self::compute_cost(&points);
        Self { points, cost }
    }

    /// Single-point path at zero cost.
    pub fn trivial(at: Position) -> Self {
        Self {
            points: vec![at],
            cost: 0.0,
        }
    }

    /// Sum of step costs along `points`.
    pub fn compute_cost(points: &[Position]) -> f32 {
        points.windows(2).map(|w| step_cost(w[0], w[1])).sum()
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn cost(&self) -> f32 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Option<Position> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Position> {
        self.points.last().copied()
    }

    /// The tile after `index`, if any.
    pub fn next_position(&self, index: usize) -> Option<Position> {
        self.points.get(index.checked_add(1)?).copied()
    }

    /// Drops interior points that continue in the same direction as the step
    /// before them, leaving only the turning points.
    ///
    /// The cost is kept: it still describes the full walk.
    #[must_use]
    pub fn simplify(&self) -> Self {
        if self.points.len() <= 2 {
            return self.clone();
        }

        let mut points = Vec::with_capacity(self.points.len());
        points.push(self.points[0]);
        for w in self.points.windows(3) {
            if direction(w[0], w[1]) != direction(w[1], w[2]) {
                points.push(w[1]);
            }
        }
        points.extend(self.points.last().copied());

        Self {
            points,
            cost: self.cost,
        }
    }
}

fn direction(from: Position, to: Position) -> (i32, i32, i32) {
    (
        (to.x - from.x).signum(),
        (to.y - from.y).signum(),
        (to.z - from.z).signum(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_overestimates_only_diagonals() {
        let o = Position::ORIGIN;
        assert_eq!(heuristic(o, Position::new(3, 0, 0)), 3.0);
        assert_eq!(heuristic(o, Position::new(0, 0, 2)), 2.0 * LEVEL_CHANGE_MULTIPLIER);
        assert!(heuristic(o, Position::new(3, 3, 0)) > 3.0 * DIAGONAL_COST);
    }

    #[test]
    fn step_costs() {
        let o = Position::ORIGIN;
        assert_eq!(step_cost(o, Position::new(1, 0, 0)), 1.0);
        assert_eq!(step_cost(o, Position::new(1, 1, 0)), DIAGONAL_COST);
        assert_eq!(step_cost(o, Position::new(0, 0, 1)), 2.0);
        assert_eq!(heuristic(o, Position::new(2, -3, 1)), 7.0);
    }

    #[test]
    fn next_position_by_index() {
        let path = Path::new(vec![
            Position::new(0, 0, 0),
            Position::new(1, 0, 0),
            Position::new(2, 0, 0),
        ]);
        assert_eq!(path.cost(), 2.0);
        assert_eq!(path.next_position(0), Some(Position::new(1, 0, 0)));
        assert_eq!(path.next_position(2), None);
        assert_eq!(path.next_position(usize::MAX), None);
    }

    #[test]
    fn simplify_keeps_turning_points() {
        let path = Path::new(vec![
            Position::new(0, 0, 0),
            Position::new(1, 0, 0),
            Position::new(2, 0, 0),
            Position::new(2, 1, 0),
            Position::new(2, 2, 0),
        ]);
        let simple = path.simplify();
        assert_eq!(
            simple.points(),
            &[
                Position::new(0, 0, 0),
                Position::new(2, 0, 0),
                Position::new(2, 2, 0)
            ]
        );
        assert_eq!(simple.cost(), path.cost());
        assert_eq!(Path::trivial(Position::ORIGIN).simplify().len(), 1);
    }
}
