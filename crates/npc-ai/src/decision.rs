//! Actions an NPC can choose and the immutable decision records built from them.

use game_core::{EntityId, Needs, Position};
use serde::{Deserialize, Serialize};

/// Primitive action kinds understood by the turn executor.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum AiActionKind {
    /// Step to an adjacent tile.
    Move,
    /// Walk towards a distant tile.
    MoveTo,
    /// Get away from the target.
    Flee,
    /// Walk next to the target.
    Follow,
    Attack,
    Eat,
    Drink,
    Sleep,
    Wait,
    Interact,
}

impl AiActionKind {
    /// Kinds whose execution goes through pathfinding.
    pub const fn is_movement(self) -> bool {
        matches!(self, Self::Move | Self::MoveTo | Self::Flee | Self::Follow)
    }

    /// Kinds acknowledged without touching the world.
    pub const fn is_passive(self) -> bool {
        matches!(self, Self::Eat | Self::Drink | Self::Sleep | Self::Wait | Self::Interact)
    }
}

/// An action with its optional target entity and position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAction {
    pub kind: AiActionKind,
    pub target: Option<EntityId>,
    pub position: Option<Position>,
}

impl AiAction {
    pub const fn new(kind: AiActionKind) -> Self {
        Self {
            kind,
            target: None,
            position: None,
        }
    }

    pub const fn wait() -> Self {
        Self::new(AiActionKind::Wait)
    }

    pub const fn step(to: Position) -> Self {
        Self::new(AiActionKind::Move).at(to)
    }

    pub const fn move_to(position: Position) -> Self {
        Self::new(AiActionKind::MoveTo).at(position)
    }

    pub const fn attack(target: EntityId, position: Position) -> Self {
        Self::new(AiActionKind::Attack).on(target).at(position)
    }

    /// Flee from `threat`, last seen at `position`.
    pub const fn flee(threat: EntityId, position: Position) -> Self {
        Self::new(AiActionKind::Flee).on(threat).at(position)
    }

    pub const fn follow(target: EntityId, position: Position) -> Self {
        Self::new(AiActionKind::Follow).on(target).at(position)
    }

    pub const fn interact(target: EntityId) -> Self {
        Self::new(AiActionKind::Interact).on(target)
    }

    /// The survival action for the most urgent need, if any.
    ///
    /// Critical needs come first (thirst, hunger, fatigue), then ordinary ones
    /// in the same order.
    pub fn for_needs(needs: Needs) -> Option<Self> {
        const URGENCY: [(Needs, AiActionKind); 6] = [
            (Needs::DEHYDRATED, AiActionKind::Drink),
            (Needs::STARVING, AiActionKind::Eat),
            (Needs::EXHAUSTED, AiActionKind::Sleep),
            (Needs::THIRSTY, AiActionKind::Drink),
            (Needs::HUNGRY, AiActionKind::Eat),
            (Needs::TIRED, AiActionKind::Sleep),
        ];
        URGENCY
            .iter()
            .find(|(need, _)| needs.contains(*need))
            .map(|&(_, kind)| Self::new(kind))
    }

    #[must_use]
    pub const fn on(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub const fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// Immutable record of one chosen action.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiDecision {
    id: u64,
    action: AiAction,
    priority: u8,
    timestamp: u64,
}

impl AiDecision {
    pub const fn new(id: u64, action: AiAction, priority: u8, timestamp: u64) -> Self {
        Self {
            id,
            action,
            priority,
            timestamp,
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn action(&self) -> &AiAction {
        &self.action
    }

    pub const fn kind(&self) -> AiActionKind {
        self.action.kind
    }

    pub const fn target(&self) -> Option<EntityId> {
        self.action.target
    }

    pub const fn position(&self) -> Option<Position> {
        self.action.position
    }

    pub const fn priority(&self) -> u8 {
        self.priority
    }

    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn needs_urgency_order() {
        let kind = |needs| AiAction::for_needs(needs).map(|a| a.kind);

        assert_eq!(kind(Needs::empty()), None);
        assert_eq!(kind(Needs::HUNGRY | Needs::TIRED), Some(AiActionKind::Eat));
        assert_eq!(
            kind(Needs::HUNGRY | Needs::THIRSTY | Needs::STARVING),
            Some(AiActionKind::Eat)
        );
        assert_eq!(
            kind(Needs::STARVING | Needs::DEHYDRATED | Needs::EXHAUSTED),
            Some(AiActionKind::Drink)
        );
        assert_eq!(
            kind(Needs::EXHAUSTED | Needs::THIRSTY),
            Some(AiActionKind::Sleep)
        );
    }

    #[test]
    fn kind_tags() {
        assert_eq!(AiActionKind::MoveTo.as_ref(), "move_to");
        assert_eq!(AiActionKind::from_str("flee"), Ok(AiActionKind::Flee));
        assert!(AiActionKind::Follow.is_movement());
        assert!(AiActionKind::Sleep.is_passive());
        assert!(!AiActionKind::Attack.is_passive());
    }
}
