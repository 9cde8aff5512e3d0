//! Projectile variant: travels origin → target along a motion path.

use bevy::prelude::*;
use smallvec::SmallVec;

use super::config::EffectConfig;
use crate::error::FxError;
use crate::motion::MotionKind;

/// One-shot sub-effect triggers a projectile can latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubEffectKind {
    Trail,
    Glow,
    Particles,
    Sound,
    Impact,
}

/// Derived state for a projectile in flight.
///
/// `applied` is the applied-mutation set: each configured sub-effect fires
/// exactly once per play, latched here so re-ticks never double-trigger.
#[derive(Debug)]
pub struct ProjectileState {
    pub motion: MotionKind,
    applied: SmallVec<[SubEffectKind; 4]>,
}

impl ProjectileState {
    pub fn new(config: &EffectConfig) -> Result<Self, FxError> {
        if config.target.is_none() {
            return Err(FxError::MissingGeometry {
                name: config.name.clone(),
                what: "target position",
            });
        }
        Ok(Self {
            motion: config.params.motion,
            applied: SmallVec::new(),
        })
    }

    /// Current position along the flight path.
    pub fn position(&self, config: &EffectConfig, progress: f32) -> Vec3 {
        // Constructor guarantees a target exists
        let target = config.target.unwrap_or(config.origin);
        self.motion.position_at(progress, config.origin, target)
    }

    /// Latch and return the sub-effects that newly trigger at `progress`.
    /// Start-scoped sub-effects (trail, glow, particles, sound) trigger on
    /// the first tick; impact triggers at arrival.
    pub fn latch_triggers(
        &mut self,
        config: &EffectConfig,
        progress: f32,
    ) -> SmallVec<[SubEffectKind; 4]> {
        let mut fired = SmallVec::new();
        let subs = &config.params.sub_effects;

        let mut latch = |kind: SubEffectKind,
                         configured: bool,
                         applied: &mut SmallVec<[SubEffectKind; 4]>,
                         fired: &mut SmallVec<[SubEffectKind; 4]>| {
            if configured && !applied.contains(&kind) {
                applied.push(kind);
                fired.push(kind);
            }
        };

        latch(
            SubEffectKind::Trail,
            subs.trail.is_some(),
            &mut self.applied,
            &mut fired,
        );
        latch(
            SubEffectKind::Glow,
            subs.glow.is_some(),
            &mut self.applied,
            &mut fired,
        );
        latch(
            SubEffectKind::Particles,
            subs.particles.is_some(),
            &mut self.applied,
            &mut fired,
        );
        latch(
            SubEffectKind::Sound,
            subs.sound.is_some(),
            &mut self.applied,
            &mut fired,
        );
        if progress >= 1.0 {
            latch(
                SubEffectKind::Impact,
                subs.impact.is_some(),
                &mut self.applied,
                &mut fired,
            );
        }

        fired
    }

    pub fn applied_mutations(&self) -> &[SubEffectKind] {
        &self.applied
    }

    /// Whether the impact trigger has already fired this play.
    pub fn impact_fired(&self) -> bool {
        self.applied.contains(&SubEffectKind::Impact)
    }

    pub fn reset(&mut self) {
        self.applied.clear();
    }
}
