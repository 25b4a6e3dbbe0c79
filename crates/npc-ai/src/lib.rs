//! NPC intelligence for turn-based simulations.
//!
//! The stack is layered bottom-up:
//!
//! - [`oracle`]: what an agent sees, hears, remembers and fears
//! - [`pathfinding`]: A* over a [`game_core::Pathable`] map with a per-agent
//!   TTL cache
//! - [`nodes`] / [`presets`]: behavior tree leaves and archetype trees
//!   operating on a per-tick [`Blackboard`]
//! - [`strategy`]: prioritised policies that swap the active tree
//! - [`controller`]: [`NpcAi`], which ticks all of the above and turns the
//!   result into an ordered list of [`AiDecision`]s
//!
//! Every agent owns its own oracle, path cache and trees; the world is only
//! ever borrowed, so agents can be processed in any order.
//!
//! # Example
//!
//! ```
//! use game_core::{Actor, EntityId, EntityInfo, GridMap, MapBounds, Position};
//! use npc_ai::{AiActionKind, NpcAi, NpcAiConfig, presets};
//!
//! let mut map = GridMap::new(MapBounds::flat(20, 20));
//! map.insert_entity(EntityInfo::new(EntityId(2), Position::new(8, 5, 0)).hostile())
//!     .unwrap();
//!
//! let body = Actor::new(EntityId(1), Position::new(5, 5, 0), 100.0);
//! let mut ai = NpcAi::builder(EntityId(1))
//!     .config(NpcAiConfig::default())
//!     .archetype(presets::guard(0.3))
//!     .build()
//!     .unwrap();
//!
//! let decision = ai.tick(&body, &map, 0).unwrap();
//! assert_eq!(decision.kind(), AiActionKind::Attack);
//! ```

pub mod blackboard;
pub mod config;
pub mod controller;
pub mod decision;
pub mod error;
pub mod nodes;
pub mod oracle;
pub mod pathfinding;
pub mod presets;
pub mod state;
pub mod strategy;

pub use blackboard::Blackboard;
pub use config::{BehaviorConfig, ControllerConfig, NpcAiConfig, PathfindingConfig, PerceptionConfig};
pub use controller::{NpcAi, NpcAiBuilder, NpcAiSnapshot, TurnOutcome};
pub use decision::{AiAction, AiActionKind, AiDecision};
pub use error::{AiError, ConfigError, PathError, StrategyError};
pub use oracle::{Oracle, OracleSnapshot, ThreatAssessment, ThreatLevel};
pub use pathfinding::{Path, PathRequest, Pathfinder};
pub use state::AiState;
pub use strategy::{Strategy, StrategyKind, StrategyManager};
