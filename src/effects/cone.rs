//! Cone variant: triangular footprint from origin along a direction, with
//! a point-containment test for targeting overlays.

use bevy::prelude::*;

use super::config::EffectConfig;
use crate::error::FxError;

/// Derived state for a cone effect. Geometry is frozen at construction;
/// only redirecting changes it.
#[derive(Debug)]
pub struct ConeState {
    direction: Vec3,
}

impl ConeState {
    pub fn new(config: &EffectConfig) -> Result<Self, FxError> {
        match config.direction.filter(|d| d.length_squared() > 1e-6) {
            Some(direction) => Ok(Self { direction }),
            None => Err(FxError::MissingGeometry {
                name: config.name.clone(),
                what: "direction",
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

    /// Triangular footprint: origin plus the two far corners of the fan.
    pub fn vertices(&self, config: &EffectConfig) -> [Vec3; 3] {
        let p = &config.params;
        let half = p.spread_degrees.to_radians() / 2.0;
        let left = Quat::from_rotation_y(half) * self.direction;
        let right = Quat::from_rotation_y(-half) * self.direction;
        [
            config.origin,
            config.origin + left * p.length,
            config.origin + right * p.length,
        ]
    }

    /// A point is inside the cone when it is within `length` of the origin
    /// AND its angular deviation from the axis is within half the spread.
    pub fn contains(&self, config: &EffectConfig, point: Vec3) -> bool {
        let p = &config.params;
        let offset = point - config.origin;
        let distance = offset.length();
        if distance > p.length {
            return false;
        }
        if distance < 1e-6 {
            // The apex itself always counts
            return true;
        }
        let deviation = offset.normalize().angle_between(self.direction);
        deviation <= p.spread_degrees.to_radians() / 2.0
    }
}
