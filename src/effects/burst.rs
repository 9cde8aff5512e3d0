//! Burst variant: expanding shock ring with a three-phase timeline.

use super::config::EffectConfig;
use crate::error::FxError;
use crate::motion::ease_out_cubic;

/// Which part of the expansion → peak → fade timeline a burst is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstPhase {
    Expansion,
    Peak,
    Fade,
}

/// Derived state for a burst. The three sub-durations are fixed at
/// construction (config merge normalizes them); everything else is a pure
/// function of elapsed time.
#[derive(Debug)]
pub struct BurstState {
    expansion: f32,
    peak: f32,
    fade: f32,
}

impl BurstState {
    pub fn new(config: &EffectConfig) -> Result<Self, FxError> {
        let p = &config.params;
        if p.expansion <= 0.0 && p.fade <= 0.0 {
            return Err(FxError::MissingGeometry {
                name: config.name.clone(),
                what: "burst sub-durations",
            });
        }
        Ok(Self {
            expansion: p.expansion,
            peak: p.peak,
            fade: p.fade,
        })
    }

    pub fn phase(&self, elapsed: f32) -> BurstPhase {
        if elapsed < self.expansion {
            BurstPhase::Expansion
        } else if elapsed < self.expansion + self.peak {
            BurstPhase::Peak
        } else {
            BurstPhase::Fade
        }
    }

    /// Radius eases out cubically during expansion, then holds at peak.
    pub fn radius(&self, elapsed: f32, max_radius: f32) -> f32 {
        match self.phase(elapsed) {
            BurstPhase::Expansion => {
                let t = if self.expansion > 0.0 {
                    elapsed / self.expansion
                } else {
                    1.0
                };
                ease_out_cubic(t) * max_radius
            }
            BurstPhase::Peak | BurstPhase::Fade => max_radius,
        }
    }

    /// Opaque through expansion and peak, then a linear fade to zero.
    pub fn opacity(&self, elapsed: f32) -> f32 {
        match self.phase(elapsed) {
            BurstPhase::Expansion | BurstPhase::Peak => 1.0,
            BurstPhase::Fade => {
                let into_fade = elapsed - self.expansion - self.peak;
                if self.fade > 0.0 {
                    (1.0 - into_fade / self.fade).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
        }
    }
}
