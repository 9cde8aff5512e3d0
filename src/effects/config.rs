//! Effect configuration: parameter defaults, caller overrides, and the
//! merged per-instance config.
//!
//! Catalog templates carry an [`EffectParams`] block of defaults; callers
//! supply an [`EffectOverrides`] (every field optional) which is merged on
//! top exactly once at instantiation. After construction the config is
//! immutable except for target/direction retargeting, which goes through
//! explicit methods on the instance rather than field pokes.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::motion::MotionKind;

/// The five effect categories. Control flow dispatches on this closed set,
/// never on name strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCategory {
    Projectile,
    Burst,
    Area,
    Ray,
    Cone,
}

impl EffectCategory {
    pub fn name(&self) -> &'static str {
        match self {
            EffectCategory::Projectile => "Projectile",
            EffectCategory::Burst => "Burst",
            EffectCategory::Area => "Area",
            EffectCategory::Ray => "Ray",
            EffectCategory::Cone => "Cone",
        }
    }
}

/// Which external counter governs a persistent effect's lifetime.
///
/// Fixed at creation and never reinterpreted: a `Rounds` effect only ever
/// compares round counters, regardless of what wall-clock time does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationType {
    /// Wall-clock seconds since creation.
    Time,
    /// Whole combat rounds since the creation round.
    Rounds,
    /// Whole combat events since the creation event.
    Events,
}

// ============================================================================
// Sub-effect descriptors
// ============================================================================

/// Trailing after-images behind a travelling effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailSpec {
    /// Seconds between trail segment spawns
    pub interval: f32,
    /// Seconds each segment lingers before fading out
    pub fade: f32,
    /// Segment RGB color (0.0-1.0 range)
    pub color: [f32; 3],
}

/// Emissive glow halo around the effect body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlowSpec {
    /// Emissive intensity multiplier (can exceed 1.0 for bloom)
    pub intensity: f32,
    pub color: [f32; 3],
}

/// Loose particles shed while the effect is alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSpec {
    pub count: u32,
    /// Seconds each particle lives
    pub lifetime: f32,
    /// Emission cone half-angle in degrees
    pub spread: f32,
}

/// Sound cue keyed into the host's audio bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundSpec {
    pub key: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

/// Impact flash spawned where a projectile lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactSpec {
    pub radius: f32,
    pub duration: f32,
}

/// Optional sub-effect descriptors attached to a template. All data, no
/// behavior: the presentation layer reads these, the lifecycle engine only
/// latches their one-shot triggers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubEffects {
    #[serde(default)]
    pub trail: Option<TrailSpec>,
    #[serde(default)]
    pub glow: Option<GlowSpec>,
    #[serde(default)]
    pub particles: Option<ParticleSpec>,
    #[serde(default)]
    pub sound: Option<SoundSpec>,
    #[serde(default)]
    pub impact: Option<ImpactSpec>,
}

// ============================================================================
// Parameters & overrides
// ============================================================================

/// Complete parameter block for one effect. Templates store these as
/// defaults; the merged copy lives in [`EffectConfig`].
///
/// Category-specific fields are simply ignored by the other variants, the
/// same way unused ability fields default to zero in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectParams {
    /// Base lifetime in seconds (Burst derives its own from sub-durations)
    #[serde(default = "default_duration")]
    pub duration: f32,
    /// Base RGB color (0.0-1.0 range)
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    /// Emissive RGB (can exceed 1.0 for glow)
    #[serde(default)]
    pub emissive: [f32; 3],

    // === Projectile ===
    /// Flight path shape
    #[serde(default)]
    pub motion: MotionKind,

    // === Burst / Area ===
    /// Burst peak radius, or Area footprint radius, in world units
    #[serde(default = "default_radius")]
    pub radius: f32,
    /// Burst expansion sub-duration in seconds (0 = derive from duration)
    #[serde(default)]
    pub expansion: f32,
    /// Burst hold-at-peak sub-duration in seconds
    #[serde(default)]
    pub peak: f32,
    /// Burst fade sub-duration in seconds (0 = derive from duration)
    #[serde(default)]
    pub fade: f32,
    /// Area: pulse opacity on a sine of elapsed time
    #[serde(default)]
    pub pulse: bool,
    /// Pulse frequency in Hz
    #[serde(default = "default_pulse_rate")]
    pub pulse_rate: f32,
    /// Area: spin the footprint
    #[serde(default)]
    pub rotate: bool,
    /// Rotation speed in radians/second
    #[serde(default = "default_rotate_speed")]
    pub rotate_speed: f32,

    // === Ray / Cone ===
    /// Beam or cone length in world units
    #[serde(default = "default_length")]
    pub length: f32,
    /// Beam width at the origin in world units
    #[serde(default = "default_width")]
    pub width: f32,
    /// Fan/cone full angle in degrees
    #[serde(default = "default_spread")]
    pub spread_degrees: f32,
    /// Number of rays fanned across the spread
    #[serde(default = "default_ray_count")]
    pub ray_count: u32,
    /// Flicker noise amplitude on ray opacity (0 = steady)
    #[serde(default = "default_flicker")]
    pub flicker: f32,
    /// Fraction of width lost at full progress (0 = constant width)
    #[serde(default = "default_taper")]
    pub taper: f32,

    #[serde(default)]
    pub sub_effects: SubEffects,
}

fn default_duration() -> f32 {
    1.0
}
fn default_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_radius() -> f32 {
    1.0
}
fn default_pulse_rate() -> f32 {
    2.0
}
fn default_rotate_speed() -> f32 {
    1.0
}
fn default_length() -> f32 {
    5.0
}
fn default_width() -> f32 {
    0.3
}
fn default_spread() -> f32 {
    30.0
}
fn default_ray_count() -> u32 {
    1
}
fn default_flicker() -> f32 {
    0.15
}
fn default_taper() -> f32 {
    0.5
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            color: default_color(),
            emissive: [0.0; 3],
            motion: MotionKind::default(),
            radius: default_radius(),
            expansion: 0.0,
            peak: 0.0,
            fade: 0.0,
            pulse: false,
            pulse_rate: default_pulse_rate(),
            rotate: false,
            rotate_speed: default_rotate_speed(),
            length: default_length(),
            width: default_width(),
            spread_degrees: default_spread(),
            ray_count: default_ray_count(),
            flicker: default_flicker(),
            taper: default_taper(),
            sub_effects: SubEffects::default(),
        }
    }
}

/// Caller-supplied overrides merged onto template defaults at creation.
/// Every field is optional; `None` keeps the template value. Cloneable and
/// serializable so scheduled events can rebuild fresh instances later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectOverrides {
    #[serde(default)]
    pub origin: Option<Vec3>,
    #[serde(default)]
    pub target: Option<Vec3>,
    #[serde(default)]
    pub direction: Option<Vec3>,
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub color: Option<[f32; 3]>,
    #[serde(default)]
    pub motion: Option<MotionKind>,
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub length: Option<f32>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub spread_degrees: Option<f32>,
    #[serde(default)]
    pub ray_count: Option<u32>,
    #[serde(default)]
    pub pulse: Option<bool>,
}

impl EffectOverrides {
    /// Overrides with just an origin position, the common case.
    pub fn at(origin: Vec3) -> Self {
        Self {
            origin: Some(origin),
            ..Default::default()
        }
    }

    /// Overrides with an origin and a target, for travelling effects.
    pub fn from_to(origin: Vec3, target: Vec3) -> Self {
        Self {
            origin: Some(origin),
            target: Some(target),
            ..Default::default()
        }
    }

    /// Apply this override set onto a copy of the template defaults.
    pub fn apply(&self, defaults: &EffectParams) -> EffectParams {
        let mut p = defaults.clone();
        if let Some(d) = self.duration {
            p.duration = d;
        }
        if let Some(c) = self.color {
            p.color = c;
        }
        if let Some(m) = self.motion {
            p.motion = m;
        }
        if let Some(r) = self.radius {
            p.radius = r;
        }
        if let Some(l) = self.length {
            p.length = l;
        }
        if let Some(w) = self.width {
            p.width = w;
        }
        if let Some(s) = self.spread_degrees {
            p.spread_degrees = s;
        }
        if let Some(n) = self.ray_count {
            p.ray_count = n;
        }
        if let Some(b) = self.pulse {
            p.pulse = b;
        }
        p
    }
}

// ============================================================================
// Lifecycle hooks & merged config
// ============================================================================

pub type StartHook = Box<dyn FnMut() + Send + Sync>;
pub type UpdateHook = Box<dyn FnMut(f32) + Send + Sync>;
pub type CompleteHook = Box<dyn FnMut() + Send + Sync>;
pub type ImpactHook = Box<dyn FnMut(Vec3) + Send + Sync>;

/// Lifecycle callbacks owned by an instance. The caster layers its own
/// caller-supplied hooks on top of these; both always run.
#[derive(Default)]
pub struct EffectHooks {
    pub on_start: Option<StartHook>,
    pub on_update: Option<UpdateHook>,
    pub on_complete: Option<CompleteHook>,
    pub on_impact: Option<ImpactHook>,
}

impl EffectHooks {
    pub fn with_on_start(mut self, f: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn with_on_update(mut self, f: impl FnMut(f32) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn with_on_complete(mut self, f: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn with_on_impact(mut self, f: impl FnMut(Vec3) + Send + Sync + 'static) -> Self {
        self.on_impact = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for EffectHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_impact", &self.on_impact.is_some())
            .finish()
    }
}

/// The merged, per-instance configuration. Built once; immutable afterwards
/// except for target/direction retargeting via the instance API.
#[derive(Debug)]
pub struct EffectConfig {
    pub name: String,
    pub category: EffectCategory,
    pub params: EffectParams,
    pub origin: Vec3,
    pub target: Option<Vec3>,
    pub direction: Option<Vec3>,
    /// Persistent-duration override; when present it replaces the base
    /// duration in progress math (infinite for counter-based persistence).
    pub duration_override: Option<f32>,
    pub hooks: EffectHooks,
}

impl EffectConfig {
    /// Build a config by merging overrides onto defaults.
    ///
    /// Burst sub-durations are normalized here: explicit sub-durations
    /// redefine the total, otherwise the base duration is split 40/20/40
    /// across expansion/peak/fade.
    pub fn merge(
        name: &str,
        category: EffectCategory,
        defaults: &EffectParams,
        overrides: &EffectOverrides,
        hooks: EffectHooks,
    ) -> Self {
        let mut params = overrides.apply(defaults);

        if category == EffectCategory::Burst {
            let explicit = params.expansion + params.peak + params.fade;
            if explicit > 0.0 {
                params.duration = explicit;
            } else {
                params.expansion = params.duration * 0.4;
                params.peak = params.duration * 0.2;
                params.fade = params.duration * 0.4;
            }
        }

        Self {
            name: name.to_string(),
            category,
            params,
            origin: overrides.origin.unwrap_or(Vec3::ZERO),
            target: overrides.target,
            direction: overrides.direction.map(|d| d.normalize_or_zero()),
            duration_override: None,
            hooks,
        }
    }

    /// The duration that governs progress: the persistent override when
    /// present, else the base duration.
    pub fn effective_duration(&self) -> f32 {
        self.duration_override.unwrap_or(self.params.duration)
    }
}
