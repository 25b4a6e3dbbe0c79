//! World-side types and capability traits shared across the NPC stack.
//!
//! `game-core` defines the spatial primitive (3-axis grid [`Position`]), the
//! entity facts exposed to perception, survival meters, and the traits the
//! NPC stack consumes ([`Pathable`], [`Perceivable`], [`AgentBody`],
//! [`SurvivalNeedsProvider`], [`CombatResolver`]). [`GridMap`] and [`Actor`]
//! are in-memory implementations used by tests and the simulation harness.
pub mod env;
pub mod error;
pub mod state;

pub use env::{
    AgentBody, AttackOutcome, CombatResolver, GridMap, MapBounds, Pathable, Perceivable,
    SurvivalNeedsProvider, TileInfo,
};
pub use error::{ErrorSeverity, GameError, WorldError};
pub use state::{
    Actor, EntityId, EntityInfo, Needs, Position, SurvivalStats, SurvivalThresholds,
};
