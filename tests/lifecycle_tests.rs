//! Integration tests for effect instance lifecycle
//!
//! These tests verify that:
//! - Instances move idle → playing → complete under tick
//! - Progress is monotonic and clamped to [0, 1]
//! - Completion callbacks fire exactly once
//! - Stop is idempotent and never fires completion callbacks

use bevy::prelude::Vec3;
use spellfx::effects::config::{EffectCategory, EffectHooks, EffectParams};
use spellfx::effects::{BurstPhase, TickOutcome};
use spellfx::motion::MotionKind;
use spellfx::registry::{EffectRegistry, EffectTemplate};
use spellfx::{EffectOverrides, FxError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const DT: f32 = 1.0 / 60.0;

fn template(category: EffectCategory, duration: f32) -> EffectTemplate {
    EffectTemplate {
        category,
        description: String::new(),
        defaults: EffectParams {
            duration,
            ..Default::default()
        },
    }
}

/// Registry with one template per category
fn test_registry() -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    registry.register("Bolt", template(EffectCategory::Projectile, 1.0));
    registry.register("Nova", template(EffectCategory::Burst, 1.0));
    registry.register("Zone", template(EffectCategory::Area, 2.0));
    registry.register("Beam", template(EffectCategory::Ray, 1.0));
    registry.register("Fan", template(EffectCategory::Cone, 1.0));
    registry
}

fn from_to() -> EffectOverrides {
    EffectOverrides::from_to(Vec3::new(-5.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 0.0))
}

fn aimed() -> EffectOverrides {
    EffectOverrides {
        direction: Some(Vec3::Z),
        ..EffectOverrides::at(Vec3::ZERO)
    }
}

#[test]
fn test_projectile_requires_target() {
    let registry = test_registry();
    let result = registry.create("Bolt", &EffectOverrides::at(Vec3::ZERO));
    assert!(matches!(result, Err(FxError::MissingGeometry { .. })));
}

#[test]
fn test_cone_requires_direction() {
    let registry = test_registry();
    let result = registry.create("Fan", &EffectOverrides::at(Vec3::ZERO));
    assert!(matches!(result, Err(FxError::MissingGeometry { .. })));
}

#[test]
fn test_progress_is_monotonic_and_clamped() {
    let registry = test_registry();
    for (name, overrides) in [
        ("Bolt", from_to()),
        ("Nova", EffectOverrides::at(Vec3::ZERO)),
        ("Zone", EffectOverrides::at(Vec3::ZERO)),
        ("Beam", from_to()),
        ("Fan", aimed()),
    ] {
        let mut instance = registry.create(name, &overrides).unwrap();
        instance.play();
        let mut last = instance.progress();
        assert!((0.0..=1.0).contains(&last));
        for _ in 0..180 {
            instance.tick(DT);
            let p = instance.progress();
            assert!(p >= last, "{} progress went backwards", name);
            assert!((0.0..=1.0).contains(&p), "{} progress out of range", name);
            last = p;
        }
        assert_eq!(last, 1.0, "{} never completed", name);
        assert!(!instance.is_animating());
    }
}

#[test]
fn test_on_complete_fires_exactly_once() {
    let registry = test_registry();
    let completions = Arc::new(AtomicUsize::new(0));
    let c = completions.clone();
    let hooks = EffectHooks::default().with_on_complete(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    let mut instance = registry.create_with_hooks("Bolt", &from_to(), hooks).unwrap();
    instance.play();
    for _ in 0..120 {
        instance.tick(DT);
    }
    // Ticking past completion stays idle and never re-fires
    assert_eq!(instance.tick(DT), TickOutcome::Idle);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn test_on_update_reports_final_progress() {
    let registry = test_registry();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let hooks = EffectHooks::default().with_on_update(move |p| {
        s.lock().unwrap().push(p);
    });
    let mut instance = registry.create_with_hooks("Nova", &EffectOverrides::at(Vec3::ZERO), hooks).unwrap();
    instance.play();
    for _ in 0..120 {
        instance.tick(DT);
    }
    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert_eq!(*seen.last().unwrap(), 1.0);
}

#[test]
fn test_stop_skips_completion_and_is_idempotent() {
    let registry = test_registry();
    let completions = Arc::new(AtomicUsize::new(0));
    let c = completions.clone();
    let hooks = EffectHooks::default().with_on_complete(move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    let mut instance = registry.create_with_hooks("Bolt", &from_to(), hooks).unwrap();
    instance.play();
    instance.tick(DT);
    instance.stop();
    instance.stop();
    assert!(!instance.is_animating());
    assert_eq!(instance.tick(DT), TickOutcome::Idle);
    assert_eq!(completions.load(Ordering::SeqCst), 0);
}

#[test]
fn test_play_while_playing_is_a_no_op() {
    let registry = test_registry();
    let mut instance = registry.create("Bolt", &from_to()).unwrap();
    instance.play();
    for _ in 0..30 {
        instance.tick(DT);
    }
    let progress = instance.progress();
    assert!(progress > 0.0);
    instance.play();
    assert_eq!(instance.progress(), progress);
}

#[test]
fn test_zero_duration_completes_on_play() {
    let registry = test_registry();
    let overrides = EffectOverrides {
        duration: Some(0.0),
        ..from_to()
    };
    let mut instance = registry.create("Bolt", &overrides).unwrap();
    instance.play();
    assert!(!instance.is_animating());
    assert_eq!(instance.progress(), 1.0);
}

#[test]
fn test_idle_instance_holds_resting_state() {
    let registry = test_registry();
    let instance = registry.create("Bolt", &from_to()).unwrap();
    assert!(!instance.is_animating());
    assert_eq!(instance.progress(), 0.0);
    assert_eq!(instance.elapsed(), 0.0);
    assert_eq!(instance.position(), Vec3::new(-5.0, 1.0, 0.0));
}

#[test]
fn test_linear_projectile_passes_midpoint() {
    let registry = test_registry();
    let mut instance = registry.create("Bolt", &from_to()).unwrap();
    instance.play();
    for _ in 0..30 {
        instance.tick(DT);
    }
    // 0.5s into a 1.0s flight: halfway along the straight line
    let position = instance.position();
    assert!(position.x.abs() < 0.5, "midpoint x was {}", position.x);
    assert!((position.y - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_curved_projectile_still_lands_on_target() {
    let registry = test_registry();
    let overrides = EffectOverrides {
        motion: Some(MotionKind::Curved {
            amplitude: 2.0,
            direction: 1.0,
        }),
        ..from_to()
    };
    let mut instance = registry.create("Bolt", &overrides).unwrap();
    instance.play();
    for _ in 0..120 {
        instance.tick(DT);
    }
    assert!(instance.position().distance(Vec3::new(5.0, 1.0, 0.0)) < 1e-3);
}

#[test]
fn test_burst_walks_through_phases() {
    let registry = test_registry();
    let mut instance = registry.create("Nova", &EffectOverrides::at(Vec3::ZERO)).unwrap();
    instance.play();
    // Default split: 0.4s expansion, 0.2s peak, 0.4s fade
    assert_eq!(instance.burst_phase(), Some(BurstPhase::Expansion));
    for _ in 0..30 {
        instance.tick(DT);
    }
    assert_eq!(instance.burst_phase(), Some(BurstPhase::Peak));
    for _ in 0..18 {
        instance.tick(DT);
    }
    assert_eq!(instance.burst_phase(), Some(BurstPhase::Fade));
}

#[test]
fn test_impact_hook_fires_once_at_the_target() {
    use spellfx::effects::config::{ImpactSpec, SubEffects};

    let mut registry = test_registry();
    registry.register(
        "Comet",
        EffectTemplate {
            category: EffectCategory::Projectile,
            description: String::new(),
            defaults: EffectParams {
                duration: 0.5,
                sub_effects: SubEffects {
                    impact: Some(ImpactSpec {
                        radius: 1.0,
                        duration: 0.2,
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
        },
    );

    let impacts = Arc::new(Mutex::new(Vec::new()));
    let i = impacts.clone();
    let hooks = EffectHooks::default().with_on_impact(move |pos| {
        i.lock().unwrap().push(pos);
    });
    let mut instance = registry.create_with_hooks("Comet", &from_to(), hooks).unwrap();
    instance.play();
    for _ in 0..60 {
        instance.tick(DT);
    }
    let impacts = impacts.lock().unwrap();
    assert_eq!(impacts.len(), 1);
    assert!(impacts[0].distance(Vec3::new(5.0, 1.0, 0.0)) < 1e-3);
}

#[test]
fn test_projectile_without_impact_spec_never_fires_impact() {
    let registry = test_registry();
    let fired = Arc::new(AtomicUsize::new(0));
    let f = fired.clone();
    let hooks = EffectHooks::default().with_on_impact(move |_| {
        f.fetch_add(1, Ordering::SeqCst);
    });
    let mut instance = registry.create_with_hooks("Bolt", &from_to(), hooks).unwrap();
    instance.play();
    for _ in 0..120 {
        instance.tick(DT);
    }
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn test_retarget_moves_the_destination() {
    let registry = test_registry();
    let mut instance = registry.create("Bolt", &from_to()).unwrap();
    instance.play();
    instance.retarget(Vec3::new(0.0, 1.0, 10.0));
    for _ in 0..120 {
        instance.tick(DT);
    }
    assert!(instance.position().distance(Vec3::new(0.0, 1.0, 10.0)) < 1e-3);
}
