//! Tunable parameters of the NPC stack.
//!
//! All sections deserialize with defaults for missing fields, so a RON file
//! only needs to mention the values it changes.
use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for one NPC controller and its subsystems.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcAiConfig {
    pub perception: PerceptionConfig,
    pub pathfinding: PathfindingConfig,
    pub behavior: BehaviorConfig,
    pub controller: ControllerConfig,
}

impl NpcAiConfig {
    /// Parses a RON document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed RON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with process environment variables.
    ///
    /// Environment variables:
    /// - `NPC_VISION_RANGE` - Vision radius in tiles (default: 10)
    /// - `NPC_HEARING_RANGE` - Hearing radius in tiles (default: 15)
    /// - `NPC_PATH_CACHE_SIZE` - Max cached paths per agent (default: 100)
    /// - `NPC_PATH_CACHE_TIMEOUT_MS` - Path cache TTL (default: 5000)
    /// - `NPC_MAX_ITERATIONS` - Decorator loop budget per update (default: 1000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(range) = read_env::<f32>("NPC_VISION_RANGE") {
            config.perception.vision_range = range;
        }
        if let Some(range) = read_env::<f32>("NPC_HEARING_RANGE") {
            config.perception.hearing_range = range;
        }
        if let Some(size) = read_env::<usize>("NPC_PATH_CACHE_SIZE") {
            config.pathfinding.max_cache_size = size;
        }
        if let Some(timeout) = read_env::<u64>("NPC_PATH_CACHE_TIMEOUT_MS") {
            config.pathfinding.cache_timeout_ms = timeout;
        }
        if let Some(budget) = read_env::<u32>("NPC_MAX_ITERATIONS") {
            config.behavior.max_iterations_per_tick = budget.max(1);
        }

        config
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.perception;
        if !(p.vision_range > 0.0) {
            return Err(ConfigError::invalid("perception.vision_range", "must be positive"));
        }
        if !(p.hearing_range > 0.0) {
            return Err(ConfigError::invalid("perception.hearing_range", "must be positive"));
        }
        if p.memory_retention_ms == 0 {
            return Err(ConfigError::invalid("perception.memory_retention_ms", "must be positive"));
        }
        if p.confidence_decay_per_ms < 0.0 {
            return Err(ConfigError::invalid(
                "perception.confidence_decay_per_ms",
                "must not be negative",
            ));
        }

        let keep = self.pathfinding.eviction_keep_ratio;
        if !(keep > 0.0 && keep <= 1.0) {
            return Err(ConfigError::invalid(
                "pathfinding.eviction_keep_ratio",
                "must be in (0, 1]",
            ));
        }
        if self.pathfinding.max_expansions == 0 {
            return Err(ConfigError::invalid("pathfinding.max_expansions", "must be positive"));
        }

        if self.behavior.max_iterations_per_tick == 0 {
            return Err(ConfigError::invalid(
                "behavior.max_iterations_per_tick",
                "must be positive",
            ));
        }

        let c = &self.controller;
        if !(c.melee_range > 0.0) {
            return Err(ConfigError::invalid("controller.melee_range", "must be positive"));
        }
        if !(0.0..=1.0).contains(&c.retreat_threshold) {
            return Err(ConfigError::invalid("controller.retreat_threshold", "must be in [0, 1]"));
        }

        Ok(())
    }
}

/// Oracle (perception, memory, threat) parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    pub vision_range: f32,
    pub hearing_range: f32,
    /// Scale applied to hearing intensities relative to vision.
    pub hearing_intensity_scale: f32,
    /// Memories older than this are purged.
    pub memory_retention_ms: u64,
    /// Linear confidence loss per elapsed millisecond.
    pub confidence_decay_per_ms: f32,
    /// Threats within this distance are promoted one band.
    pub near_distance: f32,
    /// Threats beyond this distance are demoted one band.
    pub far_distance: f32,
    /// Memory importance per threat band.
    pub importance_scale: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            vision_range: 10.0,
            hearing_range: 15.0,
            hearing_intensity_scale: 0.7,
            memory_retention_ms: 60_000,
            confidence_decay_per_ms: 1.0 / 60_000.0,
            near_distance: 5.0,
            far_distance: 15.0,
            importance_scale: 0.5,
        }
    }
}

/// Pathfinding and path cache parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfindingConfig {
    pub max_cache_size: usize,
    pub cache_timeout_ms: u64,
    /// Fraction of entries (by hit count) kept when frequency eviction runs.
    pub eviction_keep_ratio: f32,
    /// Node expansions before a search gives up.
    pub max_expansions: usize,
    pub default_max_cost: f32,
    pub allow_diagonal: bool,
}

impl Default for PathfindingConfig {
    fn default() -> Self {
        Self {
            max_cache_size: 100,
            cache_timeout_ms: 5_000,
            eviction_keep_ratio: 0.8,
            max_expansions: 10_000,
            default_max_cost: 1_000.0,
            allow_diagonal: true,
        }
    }
}

/// Behavior tree execution parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub max_iterations_per_tick: u32,
    pub history_capacity: usize,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            max_iterations_per_tick: 1_000,
            history_capacity: 100,
        }
    }
}

/// Decision arbitration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub melee_range: f32,
    /// Health fraction below which threats are fled rather than fought.
    pub retreat_threshold: f32,
    /// How far (tiles) a fleeing agent tries to get from its threat.
    pub flee_distance: i32,
    pub survival_priority: u8,
    pub threat_priority: u8,
    pub behavior_priority: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            melee_range: 1.5,
            retreat_threshold: 0.3,
            flee_distance: 5,
            survival_priority: 10,
            threat_priority: 8,
            behavior_priority: 1,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        NpcAiConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = NpcAiConfig::from_ron(
            "(perception: (vision_range: 6.0), pathfinding: (max_cache_size: 8))",
        )
        .unwrap();
        assert_eq!(config.perception.vision_range, 6.0);
        assert_eq!(config.perception.hearing_range, 15.0);
        assert_eq!(config.pathfinding.max_cache_size, 8);
        assert_eq!(config.controller, ControllerConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = NpcAiConfig::from_ron("(pathfinding: (eviction_keep_ratio: 0.0))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field, .. } if field == "pathfinding.eviction_keep_ratio"));

        assert!(matches!(
            NpcAiConfig::from_ron("(perception: oops)"),
            Err(ConfigError::Parse(_))
        ));
    }
}
