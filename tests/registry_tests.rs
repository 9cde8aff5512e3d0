//! Integration tests for the effect template registry and catalog
//!
//! These tests load the shipped catalog from assets/config/effects.ron
//! and verify template lookup, override merging, and search.

use bevy::prelude::Vec3;
use spellfx::effects::config::{EffectCategory, EffectParams};
use spellfx::registry::{EffectRegistry, EffectTemplate};
use spellfx::{EffectOverrides, FxError};

#[test]
fn test_default_catalog_loads() {
    let registry = EffectRegistry::load_default().expect("catalog should parse");
    assert!(!registry.is_empty());
    for name in [
        "Fireball",
        "MagicMissile",
        "HealingBurst",
        "Darkness",
        "RayOfFrost",
        "ScorchingRay",
        "BurningHands",
        "ConeOfCold",
    ] {
        assert!(registry.contains(name), "catalog is missing {}", name);
    }
}

#[test]
fn test_catalog_categories_are_assigned() {
    let registry = EffectRegistry::load_default().unwrap();
    assert_eq!(
        registry.get("Fireball").unwrap().category,
        EffectCategory::Projectile
    );
    assert_eq!(
        registry.get("Darkness").unwrap().category,
        EffectCategory::Area
    );
    assert_eq!(
        registry.get("ConeOfCold").unwrap().category,
        EffectCategory::Cone
    );
    assert_eq!(registry.get("ScorchingRay").unwrap().defaults.ray_count, 3);
}

#[test]
fn test_validate_flags_unusable_defaults() {
    let registry = EffectRegistry::load_default().unwrap();
    assert!(registry.validate().is_ok());

    let mut registry = EffectRegistry::new();
    registry.register(
        "BrokenBeam",
        EffectTemplate {
            category: EffectCategory::Ray,
            description: String::new(),
            defaults: EffectParams {
                length: 0.0,
                ..Default::default()
            },
        },
    );
    let bad = registry.validate().unwrap_err();
    assert_eq!(bad, vec!["BrokenBeam".to_string()]);
}

#[test]
fn test_missing_catalog_file_is_an_error() {
    let result = EffectRegistry::load_from_file("assets/config/no_such_catalog.ron");
    assert!(matches!(result, Err(FxError::Catalog { .. })));
}

#[test]
fn test_unknown_template_is_an_error() {
    let registry = EffectRegistry::load_default().unwrap();
    let result = registry.create("NoSuchSpell", &EffectOverrides::at(Vec3::ZERO));
    assert!(matches!(result, Err(FxError::UnknownEffect(name)) if name == "NoSuchSpell"));
}

#[test]
fn test_overrides_merge_onto_template_defaults() {
    let registry = EffectRegistry::load_default().unwrap();
    let overrides = EffectOverrides {
        duration: Some(3.0),
        radius: Some(9.0),
        ..EffectOverrides::at(Vec3::ZERO)
    };
    let instance = registry.create("Darkness", &overrides).unwrap();
    assert_eq!(instance.config().params.duration, 3.0);
    assert_eq!(instance.config().params.radius, 9.0);
    // Untouched fields keep the template values
    assert!(instance.config().params.pulse);
}

#[test]
fn test_burst_duration_comes_from_sub_durations() {
    let registry = EffectRegistry::load_default().unwrap();
    let instance = registry
        .create("HealingBurst", &EffectOverrides::at(Vec3::ZERO))
        .unwrap();
    // 0.35 expansion + 0.15 peak + 0.5 fade
    assert!((instance.config().params.duration - 1.0).abs() < 1e-6);
}

#[test]
fn test_register_and_unregister() {
    let mut registry = EffectRegistry::new();
    assert!(registry.is_empty());
    registry.register(
        "Spark",
        EffectTemplate {
            category: EffectCategory::Burst,
            description: "tiny flash".to_string(),
            defaults: EffectParams::default(),
        },
    );
    assert_eq!(registry.len(), 1);
    assert!(registry.contains("Spark"));

    // Re-registering replaces the template
    registry.register(
        "Spark",
        EffectTemplate {
            category: EffectCategory::Burst,
            description: "tiny flash".to_string(),
            defaults: EffectParams {
                radius: 7.0,
                ..Default::default()
            },
        },
    );
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("Spark").unwrap().defaults.radius, 7.0);

    assert!(registry.unregister("Spark").is_some());
    assert!(registry.unregister("Spark").is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_template_names_are_sorted() {
    let registry = EffectRegistry::load_default().unwrap();
    let names = registry.template_names();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn test_templates_by_category() {
    let registry = EffectRegistry::load_default().unwrap();
    let rays = registry.templates_by_category(EffectCategory::Ray);
    assert_eq!(rays.len(), 2);
    assert!(rays.iter().all(|(_, t)| t.category == EffectCategory::Ray));
}

#[test]
fn test_search_matches_names_and_descriptions() {
    let registry = EffectRegistry::load_default().unwrap();
    let hits: Vec<&str> = registry.search("frost").into_iter().map(|(n, _)| n).collect();
    assert!(hits.contains(&"RayOfFrost"));

    // Case-insensitive, and descriptions count too
    let hits: Vec<&str> = registry.search("BEAM").into_iter().map(|(n, _)| n).collect();
    assert!(hits.contains(&"RayOfFrost"));
    assert!(hits.contains(&"ScorchingRay"));

    assert!(registry.search("zzzz").is_empty());
}
