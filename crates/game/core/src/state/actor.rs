//! Minimal in-memory agent body.

use super::{EntityId, Position, SurvivalStats};
use crate::env::{AgentBody, SurvivalNeedsProvider};

/// Agent body backed by plain fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Actor {
    pub id: EntityId,
    pub position: Position,
    pub health: f32,
    pub max_health: f32,
    pub survival: SurvivalStats,
}

impl Actor {
    pub fn new(id: EntityId, position: Position, max_health: f32) -> Self {
        Self {
            id,
            position,
            health: max_health,
            max_health,
            survival: SurvivalStats::default(),
        }
    }

    #[must_use]
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health.clamp(0.0, self.max_health);
        self
    }

    #[must_use]
    pub fn with_survival(mut self, survival: SurvivalStats) -> Self {
        self.survival = survival;
        self
    }
}

impl SurvivalNeedsProvider for Actor {
    fn hunger(&self) -> f32 {
        self.survival.hunger()
    }

    fn thirst(&self) -> f32 {
        self.survival.thirst()
    }

    fn fatigue(&self) -> f32 {
        self.survival.fatigue()
    }

    fn is_hungry(&self) -> bool {
        self.survival.is_hungry()
    }

    fn is_thirsty(&self) -> bool {
        self.survival.is_thirsty()
    }

    fn is_tired(&self) -> bool {
        self.survival.is_tired()
    }

    fn is_starving(&self) -> bool {
        self.survival.is_starving()
    }

    fn is_dehydrated(&self) -> bool {
        self.survival.is_dehydrated()
    }

    fn is_exhausted(&self) -> bool {
        self.survival.is_exhausted()
    }
}

impl AgentBody for Actor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn health(&self) -> f32 {
        self.health
    }

    fn max_health(&self) -> f32 {
        self.max_health
    }
}
