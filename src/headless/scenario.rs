//! JSON scenario parsing for headless mode
//!
//! A scenario lists casts to fire at given simulation times plus
//! timeline operations (round execution, counter advancement,
//! concentration breaks) keyed the same way.

use serde::Deserialize;
use std::path::Path;

use crate::effects::EffectOverrides;
use crate::error::FxError;
use crate::timeline::PersistenceSpec;

/// Headless scenario loaded from JSON
#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    /// Fixed simulation framerate (default: 60)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Maximum simulation length in seconds (default: 30)
    #[serde(default = "default_max_sim_secs")]
    pub max_sim_secs: f32,
    /// Custom output path for the merged log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Direct casts, fired at their `at` time
    #[serde(default)]
    pub casts: Vec<ScenarioCast>,
    /// Effects registered on the timeline before the run starts
    #[serde(default)]
    pub schedule: Vec<ScenarioScheduled>,
    /// Timeline operations, fired at their `at` time
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

fn default_frame_rate() -> u32 {
    60
}

fn default_max_sim_secs() -> f32 {
    30.0
}

/// One cast in the scenario script
#[derive(Debug, Deserialize)]
pub struct ScenarioCast {
    /// Simulation time in seconds at which to fire
    pub at: f32,
    pub effect: String,
    #[serde(default)]
    pub overrides: EffectOverrides,
    /// Extra cast delay passed through to the caster
    #[serde(default)]
    pub delay: f32,
    /// Enqueue instead of casting immediately
    #[serde(default)]
    pub queued: bool,
}

/// One timeline registration
#[derive(Debug, Deserialize)]
pub struct ScenarioScheduled {
    pub round: u32,
    pub event: u32,
    pub effect: String,
    #[serde(default)]
    pub overrides: EffectOverrides,
    #[serde(default)]
    pub persistence: Option<PersistenceSpec>,
}

/// One timeline operation in the scenario script
#[derive(Debug, Deserialize)]
#[serde(tag = "op")]
pub enum ScenarioStep {
    /// Fire all events registered at (round, event)
    ExecuteRound { at: f32, round: u32, event: u32 },
    AdvanceRound { at: f32 },
    AdvanceEvent { at: f32 },
    BreakConcentration { at: f32, caster_id: String },
}

impl ScenarioStep {
    pub fn at(&self) -> f32 {
        match self {
            ScenarioStep::ExecuteRound { at, .. } => *at,
            ScenarioStep::AdvanceRound { at } => *at,
            ScenarioStep::AdvanceEvent { at } => *at,
            ScenarioStep::BreakConcentration { at, .. } => *at,
        }
    }
}

impl ScenarioConfig {
    /// Load a scenario from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, FxError> {
        let contents = std::fs::read_to_string(path).map_err(|e| FxError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: ScenarioConfig =
            serde_json::from_str(&contents).map_err(|e| FxError::Scenario {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), FxError> {
        if self.frame_rate == 0 {
            return Err(FxError::Scenario {
                path: path.display().to_string(),
                message: "frame_rate must be at least 1".to_string(),
            });
        }
        if self.max_sim_secs <= 0.0 {
            return Err(FxError::Scenario {
                path: path.display().to_string(),
                message: "max_sim_secs must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Built-in demo scenario used when no file is supplied: a projectile
    /// volley, then a scheduled round-scoped persistent that a later
    /// round advancement expires.
    pub fn demo() -> Self {
        use bevy::prelude::Vec3;

        Self {
            frame_rate: 60,
            max_sim_secs: 12.0,
            output_path: None,
            casts: vec![
                ScenarioCast {
                    at: 0.0,
                    effect: "Fireball".to_string(),
                    overrides: EffectOverrides::from_to(
                        Vec3::new(-5.0, 1.0, 0.0),
                        Vec3::new(5.0, 1.0, 0.0),
                    ),
                    delay: 0.0,
                    queued: false,
                },
                ScenarioCast {
                    at: 0.5,
                    effect: "MagicMissile".to_string(),
                    overrides: EffectOverrides::from_to(
                        Vec3::new(-5.0, 1.0, 2.0),
                        Vec3::new(5.0, 1.0, -2.0),
                    ),
                    delay: 0.0,
                    queued: true,
                },
            ],
            schedule: vec![ScenarioScheduled {
                round: 1,
                event: 0,
                effect: "Darkness".to_string(),
                overrides: EffectOverrides::at(Vec3::ZERO),
                persistence: Some(PersistenceSpec {
                    duration_type: crate::effects::config::DurationType::Rounds,
                    duration: 2.0,
                    magnitude: 0.0,
                    concentration: false,
                    caster_id: None,
                }),
            }],
            steps: vec![
                ScenarioStep::ExecuteRound {
                    at: 2.0,
                    round: 1,
                    event: 0,
                },
                ScenarioStep::AdvanceRound { at: 6.0 },
                ScenarioStep::AdvanceRound { at: 9.0 },
            ],
        }
    }
}
