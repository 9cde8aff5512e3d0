//! Bevy integration: registers the registry, caster, and timeline as
//! resources and drives their ticks from frame time.

use bevy::prelude::*;

use crate::caster::EffectCaster;
use crate::registry::EffectRegistry;
use crate::timeline::EffectTimeline;

/// System ordering within the Update schedule: casts advance before the
/// timeline inspects their handles, so a cast that resolves this frame
/// materializes its persistent the same frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FxSystemPhase {
    Tick,
    Resolve,
}

/// Drop-in plugin. Loads the effect catalog at build time and owns the
/// per-frame tick systems.
pub struct FxPlugin {
    /// Catalog to load; `None` uses the default path
    pub catalog_path: Option<String>,
}

impl Default for FxPlugin {
    fn default() -> Self {
        Self { catalog_path: None }
    }
}

impl Plugin for FxPlugin {
    fn build(&self, app: &mut App) {
        let registry = match &self.catalog_path {
            Some(path) => EffectRegistry::load_from_file(path),
            None => EffectRegistry::load_default(),
        };
        let registry = match registry {
            Ok(registry) => registry,
            Err(e) => {
                error!("Failed to load effect catalog: {}", e);
                EffectRegistry::new()
            }
        };
        app.insert_resource(registry)
            .insert_resource(EffectCaster::new())
            .insert_resource(EffectTimeline::new())
            .configure_sets(Update, (FxSystemPhase::Tick, FxSystemPhase::Resolve).chain())
            .add_systems(Update, tick_caster.in_set(FxSystemPhase::Tick))
            .add_systems(Update, tick_timeline.in_set(FxSystemPhase::Resolve));
    }
}

fn tick_caster(
    time: Res<Time>,
    mut caster: ResMut<EffectCaster>,
    registry: Res<EffectRegistry>,
) {
    caster.tick(time.delta_secs(), &registry);
}

fn tick_timeline(
    time: Res<Time>,
    mut timeline: ResMut<EffectTimeline>,
    registry: Res<EffectRegistry>,
) {
    timeline.tick(time.delta_secs(), &registry);
}
