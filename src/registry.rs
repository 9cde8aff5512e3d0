//! Data-driven effect template catalog.
//!
//! Effect defaults are defined in `assets/config/effects.ron` rather than
//! hardcoded, so visual tuning never requires recompilation. The registry
//! is a constructible service — sessions and tests build their own instead
//! of sharing process-wide state.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::effects::config::{EffectCategory, EffectConfig, EffectHooks, EffectOverrides, EffectParams};
use crate::effects::EffectInstance;
use crate::error::FxError;

/// Default catalog location, relative to the working directory.
pub const DEFAULT_CATALOG_PATH: &str = "assets/config/effects.ron";

/// One catalog entry: category, searchable description, and parameter
/// defaults the caller's overrides are merged onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectTemplate {
    pub category: EffectCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub defaults: EffectParams,
}

/// Root structure of the effects.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct EffectCatalog {
    pub effects: HashMap<String, EffectTemplate>,
}

/// The effect template registry.
#[derive(Resource, Default)]
pub struct EffectRegistry {
    templates: HashMap<String, EffectTemplate>,
}

impl EffectRegistry {
    /// Empty registry; tests populate it with `register`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the default catalog from `assets/config/effects.ron`.
    pub fn load_default() -> Result<Self, FxError> {
        Self::load_from_file(DEFAULT_CATALOG_PATH)
    }

    /// Load a catalog file.
    pub fn load_from_file(path: &str) -> Result<Self, FxError> {
        let contents = std::fs::read_to_string(path).map_err(|e| FxError::Catalog {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let catalog: EffectCatalog = ron::from_str(&contents).map_err(|e| FxError::Catalog {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let registry = Self {
            templates: catalog.effects,
        };
        if let Err(bad) = registry.validate() {
            return Err(FxError::Catalog {
                path: path.to_string(),
                message: format!("templates with unusable defaults: {}", bad.join(", ")),
            });
        }
        info!(
            "Loaded {} effect templates from {}",
            registry.templates.len(),
            path
        );
        Ok(registry)
    }

    /// Check every template's defaults for values its category cannot
    /// animate (zero-length beams, bursts with no timeline). Returns the
    /// offending names.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut bad: Vec<String> = self
            .templates
            .iter()
            .filter(|(_, t)| {
                let d = &t.defaults;
                let ok = match t.category {
                    EffectCategory::Projectile => d.duration > 0.0,
                    EffectCategory::Burst => d.duration > 0.0 || d.expansion + d.peak + d.fade > 0.0,
                    EffectCategory::Area => d.radius > 0.0,
                    EffectCategory::Ray | EffectCategory::Cone => {
                        d.length > 0.0 && d.duration > 0.0
                    }
                };
                !ok
            })
            .map(|(name, _)| name.clone())
            .collect();
        if bad.is_empty() {
            Ok(())
        } else {
            bad.sort_unstable();
            Err(bad)
        }
    }

    /// Register a template. Re-registering an existing name overwrites it
    /// with a warning rather than erroring, favoring live-reload over
    /// strict collision detection.
    pub fn register(&mut self, name: &str, template: EffectTemplate) {
        if self.templates.contains_key(name) {
            warn!("Effect template '{}' re-registered; overwriting", name);
        }
        self.templates.insert(name.to_string(), template);
    }

    /// Remove a template. Returns the removed entry, if any.
    pub fn unregister(&mut self, name: &str) -> Option<EffectTemplate> {
        self.templates.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&EffectTemplate> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Build an effect instance by merging `overrides` onto the named
    /// template's defaults. Unknown names and missing geometry fail fast.
    pub fn create(&self, name: &str, overrides: &EffectOverrides) -> Result<EffectInstance, FxError> {
        self.create_with_hooks(name, overrides, EffectHooks::default())
    }

    /// Like [`create`](Self::create), with instance-owned lifecycle hooks.
    pub fn create_with_hooks(
        &self,
        name: &str,
        overrides: &EffectOverrides,
        hooks: EffectHooks,
    ) -> Result<EffectInstance, FxError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| FxError::UnknownEffect(name.to_string()))?;
        let config = EffectConfig::merge(name, template.category, &template.defaults, overrides, hooks);
        EffectInstance::from_config(config)
    }

    /// All registered template names, sorted for stable display.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn all_templates(&self) -> impl Iterator<Item = (&String, &EffectTemplate)> {
        self.templates.iter()
    }

    pub fn templates_by_category(&self, category: EffectCategory) -> Vec<(&str, &EffectTemplate)> {
        let mut matches: Vec<(&str, &EffectTemplate)> = self
            .templates
            .iter()
            .filter(|(_, t)| t.category == category)
            .map(|(n, t)| (n.as_str(), t))
            .collect();
        matches.sort_unstable_by_key(|(n, _)| *n);
        matches
    }

    /// Case-insensitive substring search over names and descriptions.
    pub fn search(&self, query: &str) -> Vec<(&str, &EffectTemplate)> {
        let needle = query.to_lowercase();
        let mut matches: Vec<(&str, &EffectTemplate)> = self
            .templates
            .iter()
            .filter(|(name, t)| {
                name.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .map(|(n, t)| (n.as_str(), t))
            .collect();
        matches.sort_unstable_by_key(|(n, _)| *n);
        matches
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
