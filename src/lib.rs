//! SpellFX - spell and combat visual-effects engine
//!
//! Lifecycle-managed effect instances (projectiles, bursts, areas, rays,
//! cones), a template registry, a cast orchestrator with completion
//! handles, and a combat-timeline scheduler for persistent effects.
//!
//! The services are plain constructible structs driven by an explicit
//! `tick(dt)`; [`plugin::FxPlugin`] wires them into a Bevy app and feeds
//! them frame time.

pub mod caster;
pub mod cli;
pub mod effects;
pub mod error;
pub mod headless;
pub mod log;
pub mod motion;
pub mod plugin;
pub mod registry;
pub mod timeline;

// Re-export commonly used types
pub use caster::{CastGroupHandle, CastHandle, CastOptions, CastRequest, EffectCaster};
pub use effects::config::{DurationType, EffectCategory, EffectConfig, EffectOverrides};
pub use effects::{EffectInstance, TickOutcome};
pub use error::FxError;
pub use log::{FxLog, FxLogEventType};
pub use plugin::FxPlugin;
pub use registry::{EffectRegistry, EffectTemplate};
pub use timeline::{EffectTimeline, PersistenceSpec, PersistentEffect};
