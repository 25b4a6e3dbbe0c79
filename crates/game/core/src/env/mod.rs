//! Capability traits describing the world around an NPC.
//!
//! The NPC stack never reaches into concrete game types. It consumes the map
//! through [`Pathable`], other entities through [`Perceivable`], its own body
//! through [`AgentBody`] / [`SurvivalNeedsProvider`], and combat through the
//! opaque [`CombatResolver`]. [`GridMap`] is an in-memory implementation of
//! the world-side traits.
mod grid;
mod map;

pub use grid::GridMap;
pub use map::{MapBounds, Pathable, TileInfo};

use crate::state::{EntityId, EntityInfo, Needs, Position};

/// Read-only view of the entities an observer might perceive.
pub trait Perceivable: Send + Sync {
    /// Every entity currently in the world, in a stable order.
    fn entities(&self) -> Vec<EntityInfo>;

    fn entity(&self, id: EntityId) -> Option<EntityInfo> {
        self.entities().into_iter().find(|entity| entity.id == id)
    }

    fn position_of(&self, id: EntityId) -> Option<Position> {
        self.entity(id).map(|entity| entity.position)
    }

    /// Entities standing on `position`.
    fn occupants(&self, position: Position) -> Vec<EntityId> {
        self.entities()
            .into_iter()
            .filter(|entity| entity.position == position)
            .map(|entity| entity.id)
            .collect()
    }

    /// Whether `to` can be seen from `from`.
    ///
    /// The default is unobstructed sight. Worlds with occlusion override it;
    /// doing so changes what agents perceive.
    fn has_line_of_sight(&self, _from: Position, _to: Position) -> bool {
        true
    }
}

/// Survival state of an agent.
///
/// Meters are on a 0–100 scale where higher is worse.
pub trait SurvivalNeedsProvider {
    fn hunger(&self) -> f32;
    fn thirst(&self) -> f32;
    fn fatigue(&self) -> f32;

    fn is_hungry(&self) -> bool;
    fn is_thirsty(&self) -> bool;
    fn is_tired(&self) -> bool;
    fn is_starving(&self) -> bool;
    fn is_dehydrated(&self) -> bool;
    fn is_exhausted(&self) -> bool;

    /// All flagged needs as a bit set.
    fn needs(&self) -> Needs {
        let mut needs = Needs::empty();
        needs.set(Needs::HUNGRY, self.is_hungry());
        needs.set(Needs::THIRSTY, self.is_thirsty());
        needs.set(Needs::TIRED, self.is_tired());
        needs.set(Needs::STARVING, self.is_starving());
        needs.set(Needs::DEHYDRATED, self.is_dehydrated());
        needs.set(Needs::EXHAUSTED, self.is_exhausted());
        needs
    }
}

/// The body an NPC controller steers.
pub trait AgentBody: SurvivalNeedsProvider {
    fn id(&self) -> EntityId;
    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);
    fn health(&self) -> f32;
    fn max_health(&self) -> f32;

    /// Current health as a fraction of maximum (0.0 for a body without max health).
    fn health_ratio(&self) -> f32 {
        let max = self.max_health();
        if max <= 0.0 {
            0.0
        } else {
            (self.health() / max).clamp(0.0, 1.0)
        }
    }

    fn is_dead(&self) -> bool {
        self.health() <= 0.0
    }
}

/// Result of a resolved attack as reported by the combat collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    Hit { damage: f32 },
    Miss,
    /// The target could not be attacked (gone, invalid, ...).
    Rejected,
}

/// Opaque attack resolution.
pub trait CombatResolver {
    fn resolve_attack(&mut self, attacker: EntityId, target: EntityId) -> AttackOutcome;
}
