//! Threat bands and per-entity scoring.

use game_core::{EntityId, EntityInfo, Position};
use serde::{Deserialize, Serialize};

use crate::config::PerceptionConfig;

/// Totally ordered threat band, `None` (0) through `Critical` (4).
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum ThreatLevel {
    #[default]
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl ThreatLevel {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Critical,
        }
    }

    /// One band up, capped at `Critical`.
    pub const fn promote(self) -> Self {
        Self::from_u8(self.as_u8().saturating_add(1))
    }

    /// One band down, but never below `Low`. `None` stays `None`.
    pub const fn demote(self) -> Self {
        match self {
            Self::None | Self::Low => self,
            _ => Self::from_u8(self.as_u8() - 1),
        }
    }

    /// Medium or above: the entity counts as an enemy.
    pub const fn is_hostile(self) -> bool {
        self.as_u8() >= Self::Medium.as_u8()
    }
}

/// Threat posed by one perceived entity this tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub target: EntityId,
    pub level: ThreatLevel,
    pub position: Position,
    pub distance: f32,
}

/// Scores `entity` as seen from `distance` away.
///
/// Hostiles start at High and recognised players at Medium. Being close
/// promotes one band, being far demotes one band, carrying a weapon promotes
/// one band.
pub fn assess(entity: &EntityInfo, distance: f32, config: &PerceptionConfig) -> ThreatLevel {
    let mut level = if entity.hostile {
        ThreatLevel::High
    } else if entity.is_player {
        ThreatLevel::Medium
    } else {
        ThreatLevel::None
    };

    if distance <= config.near_distance {
        level = level.promote();
    } else if distance > config.far_distance {
        level = level.demote();
    }

    if entity.armed {
        level = level.promote();
    }

    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn entity() -> EntityInfo {
        EntityInfo::new(EntityId(2), Position::ORIGIN)
    }

    #[test]
    fn bands_are_ordered() {
        let levels: Vec<_> = ThreatLevel::iter().collect();
        assert!(levels.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ThreatLevel::Critical.promote(), ThreatLevel::Critical);
        assert_eq!(ThreatLevel::Low.demote(), ThreatLevel::Low);
        assert_eq!(ThreatLevel::None.demote(), ThreatLevel::None);
        assert_eq!(ThreatLevel::High.to_string(), "high");
    }

    #[test]
    fn scoring_bands() {
        let config = PerceptionConfig::default();

        assert_eq!(assess(&entity(), 8.0, &config), ThreatLevel::None);
        assert_eq!(assess(&entity(), 3.0, &config), ThreatLevel::Low);
        assert_eq!(assess(&entity().player(), 8.0, &config), ThreatLevel::Medium);
        assert_eq!(assess(&entity().hostile(), 8.0, &config), ThreatLevel::High);
        assert_eq!(assess(&entity().hostile(), 5.0, &config), ThreatLevel::Critical);
        assert_eq!(
            assess(&entity().hostile().armed(), 2.0, &config),
            ThreatLevel::Critical
        );
        assert_eq!(assess(&entity().hostile(), 20.0, &config), ThreatLevel::Medium);
        assert_eq!(
            assess(&entity().player().armed(), 20.0, &config),
            ThreatLevel::Medium
        );
    }
}
