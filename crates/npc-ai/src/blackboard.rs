//! Per-tick blackboard handed to behavior trees.
//!
//! The [`Blackboard`] is an owned copy of everything a tree may read this
//! tick (agent facts and the oracle's conclusions) plus a slot for the
//! action the tree proposes. Nodes never reach into the world directly, so
//! trees stay `'static` and can be stored next to the state they read.

use game_core::{AgentBody, EntityId, Needs, Position};
use tracing::trace;

use crate::decision::AiAction;
use crate::oracle::{Oracle, PerceivedEntity, ThreatAssessment};
use crate::state::AiState;

/// Facts available to behavior nodes during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Blackboard {
    pub agent: EntityId,
    pub position: Position,
    pub health: f32,
    pub max_health: f32,
    pub needs: Needs,
    pub state: AiState,
    pub now: u64,

    /// Perceived entities with threat Medium or above, in encounter order.
    pub enemies: Vec<ThreatAssessment>,
    pub highest_threat: Option<ThreatAssessment>,
    /// Perceived entities that are not enemies, in encounter order.
    pub neighbors: Vec<PerceivedEntity>,
    /// Whether a Critical threat stands close to the agent.
    pub safe: bool,

    /// Current patrol waypoint, if the agent patrols.
    pub waypoint: Option<Position>,
    pub melee_range: f32,

    proposed: Option<AiAction>,
}

impl Blackboard {
    /// An empty blackboard for `agent` standing at `position` with full health.
    pub fn new(agent: EntityId, position: Position) -> Self {
        Self {
            agent,
            position,
            health: 1.0,
            max_health: 1.0,
            needs: Needs::empty(),
            state: AiState::Idle,
            now: 0,
            enemies: Vec::new(),
            highest_threat: None,
            neighbors: Vec::new(),
            safe: true,
            waypoint: None,
            melee_range: 1.5,
            proposed: None,
        }
    }

    /// Collects the agent's body facts and the oracle's current snapshot.
    pub fn observe<B>(body: &B, oracle: &Oracle, state: AiState, now: u64) -> Self
    where
        B: AgentBody + ?Sized,
    {
        let position = body.position();
        let enemies: Vec<_> = oracle.enemies().copied().collect();
        let neighbors = oracle
            .perceived_entities()
            .iter()
            .filter(|p| !enemies.iter().any(|e| e.target == p.id))
            .cloned()
            .collect();

        Self {
            agent: body.id(),
            position,
            health: body.health(),
            max_health: body.max_health(),
            needs: body.needs(),
            state,
            now,
            enemies,
            highest_threat: oracle.highest_threat().copied(),
            neighbors,
            safe: oracle.is_location_safe(position),
            waypoint: None,
            melee_range: 1.5,
            proposed: None,
        }
    }

    #[must_use]
    pub fn with_waypoint(mut self, waypoint: Option<Position>) -> Self {
        self.waypoint = waypoint;
        self
    }

    #[must_use]
    pub fn with_melee_range(mut self, melee_range: f32) -> Self {
        self.melee_range = melee_range;
        self
    }

    /// Health as a fraction of maximum.
    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    pub fn has_enemies(&self) -> bool {
        !self.enemies.is_empty()
    }

    /// Closest enemy; ties go to the one encountered first.
    pub fn nearest_enemy(&self) -> Option<&ThreatAssessment> {
        nearest(self.position, &self.enemies, |e| e.position)
    }

    /// Closest non-hostile perceived entity.
    pub fn nearest_neighbor(&self) -> Option<&PerceivedEntity> {
        nearest(self.position, &self.neighbors, |n| n.position)
    }

    /// Records the tree's proposal. Only the first proposal of a tick is kept.
    ///
    /// Returns `false` if an action had already been proposed.
    pub fn propose(&mut self, action: AiAction) -> bool {
        if let Some(existing) = self.proposed {
            trace!(target: "npc_ai::blackboard", agent = %self.agent, kept = %existing.kind, dropped = %action.kind, "proposal ignored");
            return false;
        }
        self.proposed = Some(action);
        true
    }

    pub fn proposed(&self) -> Option<&AiAction> {
        self.proposed.as_ref()
    }

    pub fn take_proposal(&mut self) -> Option<AiAction> {
        self.proposed.take()
    }
}

fn nearest<T>(origin: Position, items: &[T], position: impl Fn(&T) -> Position) -> Option<&T> {
    let mut best: Option<(&T, f32)> = None;
    for item in items {
        let distance = origin.distance_to(position(item));
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((item, distance));
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PerceptionConfig;
    use crate::decision::AiActionKind;
    use game_core::{Actor, EntityInfo, GridMap, MapBounds, SurvivalStats};

    #[test]
    fn observe_splits_enemies_and_neighbors() {
        let me = Actor::new(EntityId(1), Position::new(5, 5, 0), 100.0)
            .with_health(40.0)
            .with_survival(SurvivalStats::new(60.0, 0.0, 0.0));
        let mut map = GridMap::new(MapBounds::flat(20, 20));
        map.insert_entity(EntityInfo::new(EntityId(2), Position::new(8, 5, 0)).hostile())
            .unwrap();
        map.insert_entity(EntityInfo::new(EntityId(3), Position::new(5, 7, 0)))
            .unwrap();

        let mut oracle = Oracle::new(me.id, PerceptionConfig::default());
        oracle.update(&map, me.position, 0);
        let board = Blackboard::observe(&me, &oracle, AiState::Idle, 0);

        assert_eq!(board.health_ratio(), 0.4);
        assert!(board.needs.contains(Needs::HUNGRY));
        assert_eq!(board.enemies.len(), 1);
        assert_eq!(board.nearest_enemy().map(|e| e.target), Some(EntityId(2)));
        assert_eq!(board.nearest_neighbor().map(|n| n.id), Some(EntityId(3)));
        assert!(!board.safe);
    }

    #[test]
    fn first_proposal_wins() {
        let mut board = Blackboard::new(EntityId(1), Position::ORIGIN);
        assert!(board.propose(AiAction::wait()));
        assert!(!board.propose(AiAction::move_to(Position::new(3, 3, 0))));
        assert_eq!(board.take_proposal().map(|a| a.kind), Some(AiActionKind::Wait));
        assert!(board.proposed().is_none());
    }
}
