//! RON scenario files.
//!
//! ```ron
//! Scenario(
//!     map: (width: 24, height: 16, walls: [(6, 3, 0)]),
//!     entities: [(id: 50, position: (12, 8, 0), hostile: true, route: [(12, 8, 0), (14, 8, 0)])],
//!     agents: [(
//!         id: 1,
//!         position: (2, 2, 0),
//!         archetype: Guard(flee_threshold: 0.3),
//!         strategies: [Patrol(waypoints: [(4, 2, 0), (4, 8, 0)])],
//!     )],
//! )
//! ```
//!
//! Positions are written as `(x, y, z)` tuples.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use game_core::{EntityId, EntityInfo, GridMap, MapBounds, Position, SurvivalStats};
use npc_ai::strategy::{CombatParams, SocialParams};
use npc_ai::{NpcAiConfig, Strategy, presets};
use serde::Deserialize;

pub type Coord = (i32, i32, i32);

pub fn position((x, y, z): Coord) -> Position {
    Position::new(x, y, z)
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub map: MapSpec,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    pub agents: Vec<AgentSpec>,
    /// Shared agent configuration; `NPC_*` environment defaults when absent.
    #[serde(default)]
    pub config: Option<NpcAiConfig>,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Damage dealt by every resolved attack.
    #[serde(default = "default_attack_damage")]
    pub attack_damage: f32,
    /// Survival meter growth per tick (hunger, thirst, fatigue).
    #[serde(default)]
    pub needs_per_tick: (f32, f32, f32),
}

fn default_tick_ms() -> u64 {
    100
}

fn default_attack_damage() -> f32 {
    10.0
}

#[derive(Debug, Deserialize)]
pub struct MapSpec {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub min_z: i32,
    #[serde(default)]
    pub max_z: i32,
    #[serde(default)]
    pub walls: Vec<Coord>,
    /// Inclusive wall rectangles, `(from, to)` on `from`'s level.
    #[serde(default)]
    pub wall_rects: Vec<(Coord, Coord)>,
}

/// A scripted, non-agent entity.
#[derive(Debug, Deserialize)]
pub struct EntitySpec {
    pub id: u32,
    pub position: Coord,
    #[serde(default)]
    pub hostile: bool,
    #[serde(default)]
    pub player: bool,
    #[serde(default)]
    pub armed: bool,
    #[serde(default = "default_entity_health")]
    pub health: f32,
    /// Positions visited in a loop, one per tick.
    #[serde(default)]
    pub route: Vec<Coord>,
}

fn default_entity_health() -> f32 {
    30.0
}

#[derive(Debug, Deserialize)]
pub struct AgentSpec {
    pub id: u32,
    pub position: Coord,
    #[serde(default = "default_max_health")]
    pub max_health: f32,
    #[serde(default)]
    pub health: Option<f32>,
    /// Initial (hunger, thirst, fatigue).
    #[serde(default)]
    pub survival: (f32, f32, f32),
    #[serde(default)]
    pub archetype: ArchetypeSpec,
    #[serde(default)]
    pub strategies: Vec<StrategySpec>,
}

fn default_max_health() -> f32 {
    100.0
}

#[derive(Debug, Default, Deserialize)]
pub enum ArchetypeSpec {
    Guard {
        flee_threshold: f32,
    },
    Villager,
    #[default]
    Passive,
}

#[derive(Debug, Deserialize)]
pub enum StrategySpec {
    Combat {
        aggressiveness: f32,
        retreat_threshold: f32,
        #[serde(default)]
        priority: Option<u8>,
    },
    Survival {
        #[serde(default)]
        priority: Option<u8>,
    },
    Social {
        trade_interest: f32,
        #[serde(default)]
        priority: Option<u8>,
    },
    Patrol {
        waypoints: Vec<Coord>,
        #[serde(default)]
        priority: Option<u8>,
    },
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        let scenario: Self = ron::from_str(source).context("Failed to parse scenario RON")?;
        scenario.check()?;
        Ok(scenario)
    }

    fn check(&self) -> Result<()> {
        if self.agents.is_empty() {
            bail!("scenario has no agents");
        }
        let mut ids: Vec<u32> = self
            .agents
            .iter()
            .map(|a| a.id)
            .chain(self.entities.iter().map(|e| e.id))
            .collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            bail!("entity id {} is used twice", pair[0]);
        }
        if let Some(config) = &self.config {
            config.validate().context("Invalid agent configuration")?;
        }
        Ok(())
    }

    pub fn bounds(&self) -> MapBounds {
        MapBounds::new(self.map.width, self.map.height, self.map.min_z, self.map.max_z)
    }

    /// The walled map with all scripted entities placed.
    pub fn build_map(&self) -> Result<GridMap> {
        let mut map = GridMap::new(self.bounds());
        for &wall in &self.map.walls {
            map.add_wall(position(wall));
        }
        for &(from, to) in &self.map.wall_rects {
            map.add_wall_rect(position(from), position(to));
        }
        for spec in &self.entities {
            map.insert_entity(spec.info())
                .with_context(|| format!("Failed to place entity {}", spec.id))?;
        }
        Ok(map)
    }

    pub fn agent_config(&self) -> NpcAiConfig {
        self.config.clone().unwrap_or_else(NpcAiConfig::from_env)
    }
}

impl EntitySpec {
    pub fn info(&self) -> EntityInfo {
        EntityInfo {
            id: EntityId(self.id),
            position: position(self.position),
            hostile: self.hostile,
            is_player: self.player,
            armed: self.armed,
            moving: false,
        }
    }
}

impl AgentSpec {
    pub fn survival(&self) -> SurvivalStats {
        let (hunger, thirst, fatigue) = self.survival;
        SurvivalStats::new(hunger, thirst, fatigue)
    }

    pub fn archetype(&self) -> presets::Archetype {
        match self.archetype {
            ArchetypeSpec::Guard { flee_threshold } => presets::guard(flee_threshold),
            ArchetypeSpec::Villager => presets::villager(),
            ArchetypeSpec::Passive => presets::passive(),
        }
    }

    pub fn strategies(&self) -> Result<Vec<Strategy>> {
        self.strategies
            .iter()
            .map(|spec| -> Result<Strategy> {
                let (strategy, priority) = match spec {
                    StrategySpec::Combat {
                        aggressiveness,
                        retreat_threshold,
                        priority,
                    } => (
                        Strategy::combat(CombatParams::new(*aggressiveness, *retreat_threshold)?),
                        priority,
                    ),
                    StrategySpec::Survival { priority } => (Strategy::survival(), priority),
                    StrategySpec::Social {
                        trade_interest,
                        priority,
                    } => (Strategy::social(SocialParams::new(*trade_interest)?), priority),
                    StrategySpec::Patrol {
                        waypoints,
                        priority,
                    } => (
                        Strategy::patrol(waypoints.iter().copied().map(position).collect()),
                        priority,
                    ),
                };
                Ok(match priority {
                    Some(priority) => strategy.with_priority(*priority),
                    None => strategy,
                })
            })
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Invalid strategies for agent {}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VILLAGE: &str = r#"
        Scenario(
            name: "village",
            map: (width: 12, height: 8, walls: [(5, 1, 0)], wall_rects: [((8, 0, 0), (8, 3, 0))]),
            entities: [(id: 9, position: (10, 6, 0), hostile: true, route: [(10, 6, 0), (10, 5, 0)])],
            agents: [
                (id: 1, position: (1, 1, 0), archetype: Guard(flee_threshold: 0.3),
                 strategies: [Patrol(waypoints: [(3, 1, 0), (3, 5, 0)], priority: Some(30))]),
                (id: 2, position: (2, 6, 0), archetype: Villager, survival: (0.0, 60.0, 0.0)),
            ],
            needs_per_tick: (0.5, 1.0, 0.2),
        )
    "#;

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VILLAGE.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        assert_eq!(scenario.name, "village");
        assert_eq!(scenario.tick_ms, 100);
        assert_eq!(scenario.agents.len(), 2);

        let map = scenario.build_map().unwrap();
        use game_core::{Pathable, Perceivable, SurvivalNeedsProvider};
        assert!(!map.is_passable(Position::new(5, 1, 0)));
        assert!(!map.is_passable(Position::new(8, 2, 0)));
        assert!(map.entity(EntityId(9)).unwrap().hostile);

        let strategies = scenario.agents[0].strategies().unwrap();
        assert_eq!(strategies[0].priority(), 30);
        assert!(scenario.agents[1].survival().is_thirsty());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let source = r#"
            Scenario(
                map: (width: 4, height: 4),
                entities: [(id: 1, position: (0, 0, 0))],
                agents: [(id: 1, position: (1, 1, 0))],
            )
        "#;
        let err = Scenario::parse(source).unwrap_err();
        assert!(err.to_string().contains("used twice"));
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let source = r#"
            Scenario(
                map: (width: 4, height: 4),
                agents: [(id: 1, position: (1, 1, 0),
                          strategies: [Combat(aggressiveness: 1.5, retreat_threshold: 0.3)])],
            )
        "#;
        let scenario = Scenario::parse(source).unwrap();
        assert!(scenario.agents[0].strategies().is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::load(&dir.path().join("absent.ron")).unwrap_err();
        assert!(err.to_string().contains("Failed to read scenario"));
    }
}
