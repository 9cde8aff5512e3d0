//! Area variant: ground-anchored field (auras, zones of darkness/light).

use super::config::{DurationType, EffectConfig};
use crate::error::FxError;

/// Counter-based expiry for Area/Ray effects persisted in round or event
/// time. Pure over the matching counter; wall-clock expiry is handled
/// generically by the duration override.
#[derive(Debug, Clone, Copy)]
pub struct CounterExpiry {
    pub duration_type: DurationType,
    pub duration: f32,
    pub created_round: u32,
    pub created_event: u32,
}

impl CounterExpiry {
    pub fn is_expired(&self, current_round: u32, current_event: u32) -> bool {
        match self.duration_type {
            // Time-based expiry never routes through the counter predicate
            DurationType::Time => false,
            DurationType::Rounds => {
                current_round.saturating_sub(self.created_round) as f32 >= self.duration
            }
            DurationType::Events => {
                current_event.saturating_sub(self.created_event) as f32 >= self.duration
            }
        }
    }
}

/// Derived state for an area field.
#[derive(Debug, Default)]
pub struct AreaState {
    pub expiry: Option<CounterExpiry>,
}

impl AreaState {
    pub fn new(_config: &EffectConfig) -> Result<Self, FxError> {
        Ok(Self { expiry: None })
    }

    /// Opacity pulses on a sine of elapsed time when flagged, else steady.
    pub fn opacity(&self, config: &EffectConfig, elapsed: f32) -> f32 {
        if config.params.pulse {
            let wave = (elapsed * config.params.pulse_rate * std::f32::consts::TAU).sin();
            // Oscillate between 0.55 and 1.0 so the field never vanishes
            0.775 + wave * 0.225
        } else {
            1.0
        }
    }

    /// Footprint rotation in radians, linear in elapsed time when flagged.
    pub fn rotation(&self, config: &EffectConfig, elapsed: f32) -> f32 {
        if config.params.rotate {
            elapsed * config.params.rotate_speed
        } else {
            0.0
        }
    }

    pub fn is_expired(&self, current_round: u32, current_event: u32) -> bool {
        self.expiry
            .map(|e| e.is_expired(current_round, current_event))
            .unwrap_or(false)
    }
}
