//! Headless harness that runs NPC agents through a scripted grid world.

pub mod scenario;
pub mod sim;

pub use scenario::Scenario;
pub use sim::{Report, Simulation};
