//! Survival meters (hunger, thirst, fatigue) and the need flags derived from them.

use bitflags::bitflags;

use crate::env::SurvivalNeedsProvider;

bitflags! {
    /// Survival needs currently flagged for an agent.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Needs: u8 {
        const HUNGRY = 1 << 0;
        const THIRSTY = 1 << 1;
        const TIRED = 1 << 2;
        const STARVING = 1 << 3;
        const DEHYDRATED = 1 << 4;
        const EXHAUSTED = 1 << 5;
    }
}

impl Needs {
    /// Needs that demand immediate attention.
    pub const CRITICAL: Self = Self::STARVING
        .union(Self::DEHYDRATED)
        .union(Self::EXHAUSTED);

    pub fn is_critical(self) -> bool {
        self.intersects(Self::CRITICAL)
    }
}

/// Meter thresholds, all on a 0–100 scale where higher is worse.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurvivalThresholds {
    pub need: f32,
    pub critical: f32,
}

impl Default for SurvivalThresholds {
    fn default() -> Self {
        Self {
            need: 50.0,
            critical: 85.0,
        }
    }
}

/// Plain survival meters of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurvivalStats {
    pub hunger: f32,
    pub thirst: f32,
    pub fatigue: f32,
    pub thresholds: SurvivalThresholds,
}

impl SurvivalStats {
    pub fn new(hunger: f32, thirst: f32, fatigue: f32) -> Self {
        Self {
            hunger: hunger.clamp(0.0, 100.0),
            thirst: thirst.clamp(0.0, 100.0),
            fatigue: fatigue.clamp(0.0, 100.0),
            thresholds: SurvivalThresholds::default(),
        }
    }
}

impl SurvivalNeedsProvider for SurvivalStats {
    fn hunger(&self) -> f32 {
        self.hunger
    }

    fn thirst(&self) -> f32 {
        self.thirst
    }

    fn fatigue(&self) -> f32 {
        self.fatigue
    }

    fn is_hungry(&self) -> bool {
        self.hunger >= self.thresholds.need
    }

    fn is_thirsty(&self) -> bool {
        self.thirst >= self.thresholds.need
    }

    fn is_tired(&self) -> bool {
        self.fatigue >= self.thresholds.need
    }

    fn is_starving(&self) -> bool {
        self.hunger >= self.thresholds.critical
    }

    fn is_dehydrated(&self) -> bool {
        self.thirst >= self.thresholds.critical
    }

    fn is_exhausted(&self) -> bool {
        self.fatigue >= self.thresholds.critical
    }
}
