//! Ray variant: instant beam(s) from origin along a direction, with
//! flicker, width taper, and multi-ray fan-out.

use bevy::prelude::*;
use smallvec::SmallVec;

use super::area::CounterExpiry;
use super::config::EffectConfig;
use crate::error::FxError;

/// Derived state for a beam effect.
#[derive(Debug)]
pub struct RayState {
    direction: Vec3,
    pub expiry: Option<CounterExpiry>,
}

impl RayState {
    /// Requires an explicit direction, or a target to derive one from.
    pub fn new(config: &EffectConfig) -> Result<Self, FxError> {
        let direction = config
            .direction
            .or_else(|| {
                config
                    .target
                    .map(|t| (t - config.origin).normalize_or_zero())
            })
            .filter(|d| d.length_squared() > 1e-6);

        match direction {
            Some(direction) => Ok(Self {
                direction,
                expiry: None,
            }),
            None => Err(FxError::MissingGeometry {
                name: config.name.clone(),
                what: "direction or target",
            }),
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn redirect(&mut self, direction: Vec3) {
        if direction.length_squared() > 1e-6 {
            self.direction = direction.normalize();
        }
    }

    /// Beam opacity: a noisy sine flicker around full brightness.
    pub fn opacity(&self, config: &EffectConfig, elapsed: f32) -> f32 {
        let flicker = config.params.flicker;
        if flicker <= 0.0 {
            return 1.0;
        }
        let wave = (elapsed * 37.0).sin();
        let noise = rand::random::<f32>() - 0.5;
        (1.0 - flicker * 0.5 + (wave * 0.5 + noise * 0.5) * flicker).clamp(0.0, 1.0)
    }

    /// Beam width tapers by progress toward `taper` fraction of the base.
    pub fn width(&self, config: &EffectConfig, progress: f32) -> f32 {
        let p = &config.params;
        p.width * (1.0 - p.taper * progress.clamp(0.0, 1.0))
    }

    /// Unit directions for each ray, fanned evenly across the spread angle
    /// in the ground plane. A single ray points straight along `direction`.
    pub fn ray_directions(&self, config: &EffectConfig) -> SmallVec<[Vec3; 4]> {
        let count = config.params.ray_count.max(1);
        let mut dirs = SmallVec::new();
        if count == 1 {
            dirs.push(self.direction);
            return dirs;
        }

        let spread = config.params.spread_degrees.to_radians();
        let step = spread / (count - 1) as f32;
        let start = -spread / 2.0;
        for i in 0..count {
            let angle = start + step * i as f32;
            dirs.push(Quat::from_rotation_y(angle) * self.direction);
        }
        dirs
    }

    pub fn is_expired(&self, current_round: u32, current_event: u32) -> bool {
        self.expiry
            .map(|e| e.is_expired(current_round, current_event))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::config::{EffectCategory, EffectHooks, EffectOverrides, EffectParams};

    fn ray_config(ray_count: u32, spread: f32) -> EffectConfig {
        let defaults = EffectParams {
            ray_count,
            spread_degrees: spread,
            width: 0.4,
            taper: 0.5,
            ..Default::default()
        };
        let overrides = EffectOverrides {
            origin: Some(Vec3::ZERO),
            direction: Some(Vec3::Z),
            ..Default::default()
        };
        EffectConfig::merge(
            "TestRay",
            EffectCategory::Ray,
            &defaults,
            &overrides,
            EffectHooks::default(),
        )
    }

    #[test]
    fn test_single_ray_points_along_direction() {
        let config = ray_config(1, 30.0);
        let state = RayState::new(&config).unwrap();
        let dirs = state.ray_directions(&config);
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].distance(Vec3::Z) < 1e-5);
    }

    #[test]
    fn test_fan_spans_spread() {
        let config = ray_config(3, 60.0);
        let state = RayState::new(&config).unwrap();
        let dirs = state.ray_directions(&config);
        assert_eq!(dirs.len(), 3);
        // Middle ray stays on axis; outer rays sit at ±30 degrees
        assert!(dirs[1].distance(Vec3::Z) < 1e-5);
        let outer_angle = dirs[0].angle_between(Vec3::Z).to_degrees();
        assert!((outer_angle - 30.0).abs() < 0.1);
    }

    #[test]
    fn test_width_tapers_with_progress() {
        let config = ray_config(1, 0.0);
        let state = RayState::new(&config).unwrap();
        assert!((state.width(&config, 0.0) - 0.4).abs() < 1e-6);
        assert!((state.width(&config, 1.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_direction_derived_from_target() {
        let overrides = EffectOverrides {
            origin: Some(Vec3::ZERO),
            target: Some(Vec3::new(10.0, 0.0, 0.0)),
            ..Default::default()
        };
        let config = EffectConfig::merge(
            "TestRay",
            EffectCategory::Ray,
            &EffectParams::default(),
            &overrides,
            EffectHooks::default(),
        );
        let state = RayState::new(&config).unwrap();
        assert!(state.direction().distance(Vec3::X) < 1e-5);
    }

    #[test]
    fn test_missing_direction_fails_fast() {
        let config = EffectConfig::merge(
            "TestRay",
            EffectCategory::Ray,
            &EffectParams::default(),
            &EffectOverrides::at(Vec3::ZERO),
            EffectHooks::default(),
        );
        assert!(RayState::new(&config).is_err());
    }

    #[test]
    fn test_opacity_stays_in_range() {
        let config = ray_config(1, 0.0);
        let state = RayState::new(&config).unwrap();
        for i in 0..100 {
            let o = state.opacity(&config, i as f32 * 0.016);
            assert!((0.0..=1.0).contains(&o), "opacity out of range: {o}");
        }
    }
}
