//! Plain world-side data: coordinates, entity facts, survival meters and a
//! reference agent body.
mod actor;
mod common;
mod entity;
mod survival;

pub use actor::Actor;
pub use common::{EntityId, Position};
pub use entity::EntityInfo;
pub use survival::{Needs, SurvivalStats, SurvivalThresholds};
