//! Coarse activity state of an NPC.

use serde::{Deserialize, Serialize};

use crate::decision::AiActionKind;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum AiState {
    #[default]
    Idle,
    Patrol,
    Combat,
    Fleeing,
    Interacting,
    Resting,
    Dead,
}

impl AiState {
    /// `Dead` is terminal; every other state may move to any state.
    pub const fn can_transition_to(self, next: AiState) -> bool {
        !matches!(self, AiState::Dead) || matches!(next, AiState::Dead)
    }

    pub const fn is_dead(self) -> bool {
        matches!(self, AiState::Dead)
    }

    /// The state an agent is in while carrying out `kind`.
    pub const fn for_action(kind: AiActionKind) -> Self {
        match kind {
            AiActionKind::Attack => AiState::Combat,
            AiActionKind::Flee => AiState::Fleeing,
            AiActionKind::Move | AiActionKind::MoveTo => AiState::Patrol,
            AiActionKind::Follow | AiActionKind::Interact => AiState::Interacting,
            AiActionKind::Eat | AiActionKind::Drink | AiActionKind::Sleep => AiState::Resting,
            AiActionKind::Wait => AiState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn dead_is_terminal() {
        for state in AiState::iter() {
            assert!(state.can_transition_to(AiState::Dead));
            assert_eq!(
                AiState::Dead.can_transition_to(state),
                state == AiState::Dead
            );
            if state != AiState::Dead {
                assert!(AiState::iter().all(|next| state.can_transition_to(next)));
            }
        }
    }
}
