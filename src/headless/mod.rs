//! Headless scenario execution: drive the caster and timeline with a
//! fixed timestep and no rendering, for automated runs and CI.

pub mod runner;
pub mod scenario;

pub use runner::{run_scenario, ScenarioResult};
pub use scenario::{ScenarioCast, ScenarioConfig, ScenarioScheduled, ScenarioStep};
