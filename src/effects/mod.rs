//! Effect instances: the lifecycle state machine shared by all five
//! variants.
//!
//! Every variant runs the same machine — idle → `play()` → playing (ticked
//! once per frame) → complete or stopped — and differs only in derived
//! state math (a burst's phase timeline, a projectile's flight path). The
//! variant set is a closed tagged union; nothing dispatches on name
//! strings.
//!
//! Instances are owned exclusively by whichever component started them
//! (the caster's active set, or a timeline's persistent record) and are
//! driven by that owner's `tick`.

pub mod area;
pub mod burst;
pub mod cone;
pub mod config;
pub mod projectile;
pub mod ray;

pub use area::{AreaState, CounterExpiry};
pub use burst::{BurstPhase, BurstState};
pub use cone::ConeState;
pub use config::{
    DurationType, EffectCategory, EffectConfig, EffectHooks, EffectOverrides, EffectParams,
    SubEffects,
};
pub use projectile::{ProjectileState, SubEffectKind};
pub use ray::RayState;

use bevy::prelude::*;

use crate::error::FxError;

/// Result of one frame tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not playing; nothing happened.
    Idle,
    /// Still in flight, with the current progress.
    Playing(f32),
    /// This tick finished the effect; completion hooks have fired.
    Completed,
}

/// Variant-specific derived state.
#[derive(Debug)]
pub enum EffectKind {
    Projectile(ProjectileState),
    Burst(BurstState),
    Area(AreaState),
    Ray(RayState),
    Cone(ConeState),
}

/// One playing/idle occurrence of a visual effect with its own progress
/// and timers.
#[derive(Debug)]
pub struct EffectInstance {
    config: EffectConfig,
    playing: bool,
    elapsed: f32,
    progress: f32,
    kind: EffectKind,
}

impl EffectInstance {
    /// Construct from a merged config, validating category-required
    /// geometry. Missing geometry fails here, never later.
    pub fn from_config(config: EffectConfig) -> Result<Self, FxError> {
        let kind = match config.category {
            EffectCategory::Projectile => EffectKind::Projectile(ProjectileState::new(&config)?),
            EffectCategory::Burst => EffectKind::Burst(BurstState::new(&config)?),
            EffectCategory::Area => EffectKind::Area(AreaState::new(&config)?),
            EffectCategory::Ray => EffectKind::Ray(RayState::new(&config)?),
            EffectCategory::Cone => EffectKind::Cone(ConeState::new(&config)?),
        };
        Ok(Self {
            config,
            playing: false,
            elapsed: 0.0,
            progress: 0.0,
            kind,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start playing. No-op while already playing. Resets progress, fires
    /// `on_start`, and runs the first tick immediately so progress is
    /// never queried before any tick has run.
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.reset_derived();
        if let Some(f) = self.config.hooks.on_start.as_mut() {
            f();
        }
        self.tick(0.0);
    }

    /// Advance by one frame's delta. Progress is a pure function of
    /// elapsed time over the effective duration, so a dropped frame never
    /// desynchronizes the visual from the clock.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        if !self.playing {
            return TickOutcome::Idle;
        }

        self.elapsed += dt;
        let duration = self.config.effective_duration();
        self.progress = if duration <= 0.0 {
            1.0
        } else if duration.is_finite() {
            (self.elapsed / duration).clamp(0.0, 1.0)
        } else {
            // Counter-persisted instances hold at zero until stopped
            0.0
        };

        if let Some(f) = self.config.hooks.on_update.as_mut() {
            f(self.progress);
        }
        if let EffectKind::Projectile(state) = &mut self.kind {
            state.latch_triggers(&self.config, self.progress);
        }

        if self.progress >= 1.0 {
            self.finish();
            TickOutcome::Completed
        } else {
            TickOutcome::Playing(self.progress)
        }
    }

    /// Halt without completing: playing goes false, no further ticks run,
    /// `on_complete` does not fire. Idempotent.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Stop and return to the idle state: progress, elapsed, and derived
    /// phase all zeroed.
    pub fn reset(&mut self) {
        self.stop();
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.reset_derived();
    }

    fn finish(&mut self) {
        self.playing = false;
        self.progress = 1.0;
        if let Some(f) = self.config.hooks.on_complete.as_mut() {
            f();
        }
        if let EffectKind::Projectile(state) = &self.kind {
            if self.config.params.sub_effects.impact.is_some() {
                let pos = state.position(&self.config, 1.0);
                if let Some(f) = self.config.hooks.on_impact.as_mut() {
                    f(pos);
                }
            }
        }
    }

    fn reset_derived(&mut self) {
        if let EffectKind::Projectile(state) = &mut self.kind {
            state.reset();
        }
    }

    // ========================================================================
    // Shared getters
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn category(&self) -> EffectCategory {
        self.config.category
    }

    pub fn is_animating(&self) -> bool {
        self.playing
    }

    /// Progress in [0, 1]. Monotonically non-decreasing while playing;
    /// idle/default 0.0 before the first play.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }

    /// Current world position: a projectile's point along its flight path,
    /// every other variant's anchor origin.
    pub fn position(&self) -> Vec3 {
        match &self.kind {
            EffectKind::Projectile(state) => state.position(&self.config, self.progress),
            _ => self.config.origin,
        }
    }

    /// Current opacity in [0, 1], per variant rules.
    pub fn opacity(&self) -> f32 {
        match &self.kind {
            EffectKind::Burst(state) => state.opacity(self.elapsed),
            EffectKind::Area(state) => state.opacity(&self.config, self.elapsed),
            EffectKind::Ray(state) => state.opacity(&self.config, self.elapsed),
            EffectKind::Projectile(_) | EffectKind::Cone(_) => 1.0,
        }
    }

    /// Footprint rotation in radians: linear in elapsed time for a
    /// rotating area, zero for everything else.
    pub fn rotation(&self) -> f32 {
        match &self.kind {
            EffectKind::Area(state) => state.rotation(&self.config, self.elapsed),
            _ => 0.0,
        }
    }

    /// Burst phase, when this is a burst.
    pub fn burst_phase(&self) -> Option<BurstPhase> {
        match &self.kind {
            EffectKind::Burst(state) => Some(state.phase(self.elapsed)),
            _ => None,
        }
    }

    /// Burst radius at the current elapsed time, when this is a burst.
    pub fn burst_radius(&self) -> Option<f32> {
        match &self.kind {
            EffectKind::Burst(state) => Some(state.radius(self.elapsed, self.config.params.radius)),
            _ => None,
        }
    }

    // ========================================================================
    // Counter expiry (Area/Ray)
    // ========================================================================

    /// Attach round/event expiry to an Area or Ray instance. Other
    /// variants expire purely by duration and ignore this.
    pub fn set_counter_expiry(&mut self, expiry: CounterExpiry) {
        match &mut self.kind {
            EffectKind::Area(state) => state.expiry = Some(expiry),
            EffectKind::Ray(state) => state.expiry = Some(expiry),
            _ => {}
        }
    }

    /// Counter-based expiry predicate; always false for variants without
    /// one attached.
    pub fn is_expired(&self, current_round: u32, current_event: u32) -> bool {
        match &self.kind {
            EffectKind::Area(state) => state.is_expired(current_round, current_event),
            EffectKind::Ray(state) => state.is_expired(current_round, current_event),
            _ => false,
        }
    }

    // ========================================================================
    // Retargeting & persistence overrides
    // ========================================================================

    /// Replace the base duration for progress math (persistence).
    pub fn set_duration_override(&mut self, duration: f32) {
        self.config.duration_override = Some(duration);
    }

    /// Live-retarget the destination position (the one config mutation the
    /// data model supports besides direction).
    pub fn retarget(&mut self, target: Vec3) {
        self.config.target = Some(target);
    }

    /// Live-redirect the facing direction for Ray/Cone variants.
    pub fn redirect(&mut self, direction: Vec3) {
        let normalized = direction.normalize_or_zero();
        if normalized == Vec3::ZERO {
            return;
        }
        self.config.direction = Some(normalized);
        match &mut self.kind {
            EffectKind::Ray(state) => state.redirect(normalized),
            EffectKind::Cone(state) => state.redirect(normalized),
            _ => {}
        }
    }
}
