//! Observable facts about an entity, as exposed to perception.

use super::{EntityId, Position};

/// What an observer can learn about another entity by looking at it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityInfo {
    pub id: EntityId,
    pub position: Position,
    /// Actively hostile towards NPCs.
    pub hostile: bool,
    /// Controlled by a player.
    pub is_player: bool,
    /// Has a weapon equipped.
    pub armed: bool,
    /// Moved since the previous turn (audible).
    pub moving: bool,
}

impl EntityInfo {
    pub const fn new(id: EntityId, position: Position) -> Self {
        Self {
            id,
            position,
            hostile: false,
            is_player: false,
            armed: false,
            moving: false,
        }
    }

    #[must_use]
    pub const fn hostile(mut self) -> Self {
        self.hostile = true;
        self
    }

    #[must_use]
    pub const fn player(mut self) -> Self {
        self.is_player = true;
        self
    }

    #[must_use]
    pub const fn armed(mut self) -> Self {
        self.armed = true;
        self
    }

    #[must_use]
    pub const fn moving(mut self) -> Self {
        self.moving = true;
        self
    }
}
