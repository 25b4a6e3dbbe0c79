//! Grid A* search.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use arrayvec::ArrayVec;
use game_core::{Pathable, Position};
use tracing::trace;

use super::path::{Path, PathRequest, heuristic, step_cost};
use crate::error::PathError;

/// 8 lateral neighbours plus one level up and one down.
const MAX_NEIGHBORS: usize = 10;

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Open-set entry. Lowest `f` first, then lowest `h`, then earliest pushed.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    position: Position,
    g: f32,
    f: f32,
    h: f32,
    seq: u64,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    // Reversed: BinaryHeap is a max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Tiles reachable in one step from `at`.
fn neighbors(at: Position, allow_diagonal: bool) -> ArrayVec<Position, MAX_NEIGHBORS> {
    let mut out = ArrayVec::new();
    for (dx, dy) in ORTHOGONAL {
        out.push(at.offset(dx, dy, 0));
    }
    if allow_diagonal {
        for (dx, dy) in DIAGONAL {
            out.push(at.offset(dx, dy, 0));
        }
    }
    out.push(at.offset(0, 0, 1));
    out.push(at.offset(0, 0, -1));
    out
}

/// Runs A* over `map` for `request`.
///
/// Tiles occupied by creatures are blocked unless the request ignores
/// creatures; the end tile is always enterable. Steps that would push the
/// cost-so-far over `max_cost` are never taken.
pub fn search<M>(map: &M, request: &PathRequest, max_expansions: usize) -> Result<Path, PathError>
where
    M: Pathable + ?Sized,
{
    let PathRequest { start, end, .. } = *request;

    for position in [start, end] {
        if !map.contains(position) {
            return Err(PathError::OutOfBounds(position));
        }
    }
    if start == end {
        return Ok(Path::trivial(start));
    }
    if !map.is_passable(start) {
        return Err(PathError::StartBlocked(start));
    }
    if !map.is_passable(end) {
        return Err(PathError::EndBlocked(end));
    }

    let enterable = |position: Position| {
        map.is_passable(position)
            && (position == end || request.ignore_creatures || !map.is_occupied(position))
    };

    let mut open = BinaryHeap::new();
    let mut best_g: HashMap<Position, f32> = HashMap::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut seq = 0u64;
    let mut expansions = 0usize;
    let mut pruned_by_cost = false;

    let h = heuristic(start, end);
    open.push(OpenNode {
        position: start,
        g: 0.0,
        f: h,
        h,
        seq,
    });
    best_g.insert(start, 0.0);

    while let Some(node) = open.pop() {
        if best_g.get(&node.position).is_some_and(|&g| node.g > g) {
            continue;
        }
        if node.position == end {
            trace!(target: "npc_ai::pathfinding", %start, %end, cost = node.g, expansions, "path found");
            return Ok(Path::new(reconstruct(&came_from, end)));
        }

        expansions += 1;
        if expansions > max_expansions {
            return Err(PathError::SearchLimitReached {
                expansions: max_expansions,
            });
        }

        for next in neighbors(node.position, request.allow_diagonal) {
            if !enterable(next) {
                continue;
            }
            let g = node.g + step_cost(node.position, next);
            if g > request.max_cost {
                pruned_by_cost = true;
                continue;
            }
            if best_g.get(&next).is_some_and(|&known| g >= known) {
                continue;
            }

            best_g.insert(next, g);
            came_from.insert(next, node.position);
            seq += 1;
            let h = heuristic(next, end);
            open.push(OpenNode {
                position: next,
                g,
                f: g + h,
                h,
                seq,
            });
        }
    }

    if pruned_by_cost {
        Err(PathError::MaxCostExceeded {
            max_cost: request.max_cost,
        })
    } else {
        Err(PathError::NoPath)
    }
}

fn reconstruct(came_from: &HashMap<Position, Position>, end: Position) -> Vec<Position> {
    let mut points = vec![end];
    let mut current = end;
    while let Some(&previous) = came_from.get(&current) {
        points.push(previous);
        current = previous;
    }
    points.reverse();
    points
}
