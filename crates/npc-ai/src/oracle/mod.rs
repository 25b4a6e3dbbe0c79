//! Perception, memory and threat assessment for one agent.
//!
//! Every [`Oracle::update`] rebuilds the perception snapshot from scratch:
//!
//! 1. existing memories decay and expired ones are purged
//! 2. the vision pass records every entity in range and in sight, refreshes
//!    its memory and scores its threat
//! 3. the hearing pass records every moving entity in hearing range and
//!    merges it into the perceived-entity view
//!
//! Queries read the snapshot only; they never touch the world.
mod memory;
mod perception;
mod threat;

pub use memory::{MemoryBank, MemoryEntry};
pub use perception::{PerceivedEntity, PerceptionChannel, PerceptionRecord, Senses};
pub use threat::{ThreatAssessment, ThreatLevel, assess};

use game_core::{EntityId, Perceivable, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::PerceptionConfig;
use crate::error::AiError;
use perception::falloff;

/// Per-agent perception state.
#[derive(Clone, Debug)]
pub struct Oracle {
    owner: EntityId,
    config: PerceptionConfig,
    last_update: Option<u64>,
    perceptions: Vec<PerceptionRecord>,
    perceived: Vec<PerceivedEntity>,
    threats: Vec<ThreatAssessment>,
    memories: MemoryBank,
}

/// Plain export of an [`Oracle`]'s mutable state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OracleSnapshot {
    pub owner: EntityId,
    pub last_update: Option<u64>,
    pub perceptions: Vec<PerceptionRecord>,
    pub perceived: Vec<PerceivedEntity>,
    pub threats: Vec<ThreatAssessment>,
    pub memories: MemoryBank,
}

impl Oracle {
    pub fn new(owner: EntityId, config: PerceptionConfig) -> Self {
        Self {
            owner,
            config,
            last_update: None,
            perceptions: Vec::new(),
            perceived: Vec::new(),
            threats: Vec::new(),
            memories: MemoryBank::new(),
        }
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn last_update(&self) -> Option<u64> {
        self.last_update
    }

    /// Refreshes the snapshot as seen from `origin` at time `now` (ms).
    pub fn update<W>(&mut self, world: &W, origin: Position, now: u64)
    where
        W: Perceivable + ?Sized,
    {
        let elapsed = self
            .last_update
            .map_or(0, |last| now.saturating_sub(last));
        let purged = self.memories.decay(
            now,
            elapsed,
            self.config.confidence_decay_per_ms,
            self.config.memory_retention_ms,
        );

        self.perceptions.clear();
        self.perceived.clear();
        self.threats.clear();

        let entities = world.entities();

        for entity in entities.iter().filter(|e| e.id != self.owner) {
            let distance = origin.distance_to(entity.position);
            if distance > self.config.vision_range
                || !world.has_line_of_sight(origin, entity.position)
            {
                continue;
            }

            let intensity = falloff(distance, self.config.vision_range);
            let level = assess(entity, distance, &self.config);
            trace!(target: "npc_ai::oracle", observer = %self.owner, seen = %entity.id, distance, %level, "vision");

            self.perceptions.push(PerceptionRecord {
                channel: PerceptionChannel::Vision,
                source: self.owner,
                target: entity.id,
                position: entity.position,
                intensity,
                timestamp: now,
            });
            self.perceived.push(PerceivedEntity::new(
                entity,
                distance,
                PerceptionChannel::Vision,
                intensity,
            ));
            self.threats.push(ThreatAssessment {
                target: entity.id,
                level,
                position: entity.position,
                distance,
            });
            self.memories.remember(MemoryEntry::new(
                entity.id,
                entity.position,
                PerceptionChannel::Vision,
                now,
                f32::from(level.as_u8()) * self.config.importance_scale,
            ));
        }

        for entity in entities
            .iter()
            .filter(|e| e.id != self.owner && e.moving)
        {
            let distance = origin.distance_to(entity.position);
            if distance > self.config.hearing_range {
                continue;
            }

            let intensity =
                falloff(distance, self.config.hearing_range) * self.config.hearing_intensity_scale;
            trace!(target: "npc_ai::oracle", observer = %self.owner, heard = %entity.id, distance, "hearing");

            self.perceptions.push(PerceptionRecord {
                channel: PerceptionChannel::Hearing,
                source: self.owner,
                target: entity.id,
                position: entity.position,
                intensity,
                timestamp: now,
            });
            match self.perceived.iter_mut().find(|p| p.id == entity.id) {
                Some(existing) => existing.merge(PerceptionChannel::Hearing, intensity),
                None => self.perceived.push(PerceivedEntity::new(
                    entity,
                    distance,
                    PerceptionChannel::Hearing,
                    intensity,
                )),
            }
        }

        self.last_update = Some(now);
        debug!(
            target: "npc_ai::oracle",
            observer = %self.owner,
            perceived = self.perceived.len(),
            threats = self.threats.iter().filter(|t| t.level.is_hostile()).count(),
            memories = self.memories.len(),
            purged,
            "perception updated"
        );
    }

    /// Target with the highest threat level.
    ///
    /// Ties go to the entity encountered first. Returns `None` when nothing
    /// perceived poses any threat.
    pub fn highest_threat(&self) -> Option<&ThreatAssessment> {
        let mut best: Option<&ThreatAssessment> = None;
        for threat in &self.threats {
            if threat.level > best.map_or(ThreatLevel::None, |b| b.level) {
                best = Some(threat);
            }
        }
        best
    }

    /// Perceived entities with threat Medium or above, in encounter order.
    pub fn enemies(&self) -> impl Iterator<Item = &ThreatAssessment> {
        self.threats.iter().filter(|t| t.level.is_hostile())
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies().count()
    }

    /// Closest enemy to `origin`; ties go to the one encountered first.
    pub fn nearest_enemy(&self, origin: Position) -> Option<&ThreatAssessment> {
        let mut best: Option<(&ThreatAssessment, f32)> = None;
        for enemy in self.enemies() {
            let distance = origin.distance_to(enemy.position);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((enemy, distance));
            }
        }
        best.map(|(enemy, _)| enemy)
    }

    /// A location is unsafe if a Critical threat stands within near distance of it.
    pub fn is_location_safe(&self, position: Position) -> bool {
        !self.threats.iter().any(|t| {
            t.level == ThreatLevel::Critical
                && t.position.distance_to(position) <= self.config.near_distance
        })
    }

    pub fn threat_of(&self, target: EntityId) -> ThreatLevel {
        self.threats
            .iter()
            .find(|t| t.target == target)
            .map_or(ThreatLevel::None, |t| t.level)
    }

    pub fn threats(&self) -> &[ThreatAssessment] {
        &self.threats
    }

    pub fn perceptions(&self) -> &[PerceptionRecord] {
        &self.perceptions
    }

    pub fn perceived_entities(&self) -> &[PerceivedEntity] {
        &self.perceived
    }

    pub fn perceived(&self, target: EntityId) -> Option<&PerceivedEntity> {
        self.perceived.iter().find(|p| p.id == target)
    }

    pub fn memories(&self) -> &MemoryBank {
        &self.memories
    }

    pub fn memory_of(&self, target: EntityId) -> Option<&MemoryEntry> {
        self.memories.get(target)
    }

    /// Current position if perceived this tick, otherwise the remembered one.
    pub fn last_known_position(&self, target: EntityId) -> Option<Position> {
        self.perceived(target)
            .map(|p| p.position)
            .or_else(|| self.memory_of(target).map(|m| m.last_position))
    }

    /// Forgets everything, including memories.
    pub fn clear(&mut self) {
        self.last_update = None;
        self.perceptions.clear();
        self.perceived.clear();
        self.threats.clear();
        self.memories.clear();
    }

    pub fn snapshot(&self) -> OracleSnapshot {
        OracleSnapshot {
            owner: self.owner,
            last_update: self.last_update,
            perceptions: self.perceptions.clone(),
            perceived: self.perceived.clone(),
            threats: self.threats.clone(),
            memories: self.memories.clone(),
        }
    }

    /// Replaces all mutable state with `snapshot`. Configuration and owner
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::AgentMismatch`] for a snapshot of another agent's
    /// oracle; nothing changes in that case.
    pub fn restore(&mut self, snapshot: OracleSnapshot) -> Result<(), AiError> {
        if snapshot.owner != self.owner {
            return Err(AiError::AgentMismatch {
                expected: self.owner,
                found: snapshot.owner,
            });
        }
        self.last_update = snapshot.last_update;
        self.perceptions = snapshot.perceptions;
        self.perceived = snapshot.perceived;
        self.threats = snapshot.threats;
        self.memories = snapshot.memories;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{EntityInfo, GridMap, MapBounds};

    const OWNER: EntityId = EntityId(1);

    fn world(entities: &[EntityInfo]) -> GridMap {
        let mut map = GridMap::new(MapBounds::flat(40, 40));
        for entity in entities {
            map.insert_entity(entity.clone()).unwrap();
        }
        map
    }

    fn oracle() -> Oracle {
        Oracle::new(OWNER, PerceptionConfig::default())
    }

    #[test]
    fn vision_ignores_self_and_out_of_range() {
        let origin = Position::new(10, 10, 0);
        let map = world(&[
            EntityInfo::new(OWNER, origin),
            EntityInfo::new(EntityId(2), Position::new(14, 10, 0)),
            EntityInfo::new(EntityId(3), Position::new(25, 10, 0)),
        ]);
        let mut oracle = oracle();
        oracle.update(&map, origin, 0);

        assert_eq!(oracle.perceived_entities().len(), 1);
        let seen = oracle.perceived(EntityId(2)).unwrap();
        assert!(seen.is_seen());
        assert!((seen.intensity - 0.6).abs() < 1e-6);
        assert!(oracle.memory_of(EntityId(3)).is_none());
    }

    #[test]
    fn hearing_merges_with_vision() {
        let origin = Position::new(10, 10, 0);
        let map = world(&[
            EntityInfo::new(EntityId(2), Position::new(13, 10, 0)).moving(),
            EntityInfo::new(EntityId(3), Position::new(22, 10, 0)).moving(),
        ]);
        let mut oracle = oracle();
        oracle.update(&map, origin, 0);

        let both = oracle.perceived(EntityId(2)).unwrap();
        assert!(both.is_seen() && both.is_heard());
        assert!((both.intensity - 0.7).abs() < 1e-6);

        let heard = oracle.perceived(EntityId(3)).unwrap();
        assert!(!heard.is_seen() && heard.is_heard());
        assert!((heard.intensity - 0.14).abs() < 1e-6);
        assert_eq!(oracle.threat_of(EntityId(3)), ThreatLevel::None);
        assert!(oracle.memory_of(EntityId(3)).is_none());
        assert_eq!(oracle.perceptions().len(), 3);
    }

    #[test]
    fn highest_threat_prefers_first_encountered() {
        let origin = Position::new(10, 10, 0);
        let map = world(&[
            EntityInfo::new(EntityId(2), Position::new(18, 10, 0)).player(),
            EntityInfo::new(EntityId(3), Position::new(10, 18, 0)).hostile(),
            EntityInfo::new(EntityId(4), Position::new(2, 10, 0)).hostile(),
        ]);
        let mut oracle = oracle();
        oracle.update(&map, origin, 0);

        let first = oracle.highest_threat().map(|t| t.target);
        assert_eq!(first, Some(EntityId(3)));
        assert_eq!(oracle.highest_threat().map(|t| t.target), first);
        assert_eq!(oracle.enemy_count(), 3);
    }

    #[test]
    fn no_threat_when_everything_is_harmless() {
        let origin = Position::new(10, 10, 0);
        let map = world(&[EntityInfo::new(EntityId(2), Position::new(18, 10, 0))]);
        let mut oracle = oracle();
        oracle.update(&map, origin, 0);

        assert!(oracle.highest_threat().is_none());
        assert!(oracle.nearest_enemy(origin).is_none());
    }

    #[test]
    fn safety_depends_on_critical_threats_nearby() {
        let origin = Position::new(10, 10, 0);
        let map = world(&[EntityInfo::new(EntityId(2), Position::new(12, 10, 0)).hostile()]);
        let mut oracle = oracle();
        oracle.update(&map, origin, 0);

        assert_eq!(oracle.threat_of(EntityId(2)), ThreatLevel::Critical);
        assert!(!oracle.is_location_safe(origin));
        assert!(oracle.is_location_safe(Position::new(20, 10, 0)));
    }

    #[test]
    fn memories_outlive_perception_until_retention() {
        let origin = Position::new(10, 10, 0);
        let mut map = world(&[EntityInfo::new(EntityId(2), Position::new(12, 10, 0)).hostile()]);
        let mut oracle = oracle();
        oracle.update(&map, origin, 0);
        assert_eq!(oracle.memory_of(EntityId(2)).unwrap().importance, 2.0);

        map.remove_entity(EntityId(2));
        oracle.update(&map, origin, 30_000);
        assert!(oracle.perceived(EntityId(2)).is_none());
        assert_eq!(
            oracle.last_known_position(EntityId(2)),
            Some(Position::new(12, 10, 0))
        );
        assert!((oracle.memory_of(EntityId(2)).unwrap().confidence - 0.5).abs() < 1e-4);

        oracle.update(&map, origin, 60_000);
        assert!(oracle.memory_of(EntityId(2)).is_none());
    }

    #[test]
    fn snapshot_round_trip() {
        let origin = Position::new(10, 10, 0);
        let map = world(&[EntityInfo::new(EntityId(2), Position::new(12, 10, 0)).moving()]);
        let mut oracle = oracle();
        oracle.update(&map, origin, 100);

        let json = serde_json::to_string(&oracle.snapshot()).unwrap();
        let mut restored = Oracle::new(OWNER, PerceptionConfig::default());
        restored.restore(serde_json::from_str(&json).unwrap()).unwrap();

        assert_eq!(restored.snapshot(), oracle.snapshot());
    }

    #[test]
    fn restore_keeps_owner() {
        let map = world(&[EntityInfo::new(EntityId(2), Position::new(12, 10, 0))]);
        let mut other = Oracle::new(EntityId(5), PerceptionConfig::default());
        other.update(&map, Position::new(10, 10, 0), 100);

        let mut oracle = oracle();
        let before = oracle.snapshot();
        assert!(matches!(
            oracle.restore(other.snapshot()),
            Err(AiError::AgentMismatch { expected: OWNER, found: EntityId(5) })
        ));
        assert_eq!(oracle.owner(), OWNER);
        assert_eq!(oracle.snapshot(), before);
    }
}
