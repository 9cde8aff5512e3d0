//! Motion generators for travelling effects.
//!
//! Pure functions mapping `progress in [0, 1]` to a world position. They
//! depend only on progress, never on wall-clock time, so they are
//! frame-rate independent, restartable, and trivially unit-testable.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// How a travelling effect moves between its origin and target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionKind {
    /// Straight-line interpolation from origin to target.
    Linear,
    /// Linear travel with a perpendicular arc offset.
    ///
    /// `direction` is a sign (+1.0 arcs left of travel, -1.0 right);
    /// the offset follows a sine half-wave, zero at both endpoints.
    Curved { amplitude: f32, direction: f32 },
    /// "Seeking" motion: periodic lateral offset with `waves` full periods
    /// over the flight, damped to zero at arrival so the effect always
    /// lands exactly on target.
    SineHoming { amplitude: f32, waves: f32 },
}

impl Default for MotionKind {
    fn default() -> Self {
        MotionKind::Linear
    }
}

impl MotionKind {
    /// Position along the path at `progress` (clamped to [0, 1]).
    pub fn position_at(&self, progress: f32, start: Vec3, end: Vec3) -> Vec3 {
        let t = progress.clamp(0.0, 1.0);
        let base = start.lerp(end, t);

        match *self {
            MotionKind::Linear => base,
            MotionKind::Curved {
                amplitude,
                direction,
            } => {
                // Half sine wave: zero offset at launch and impact
                let offset = (t * std::f32::consts::PI).sin() * amplitude * direction.signum();
                base + lateral_axis(start, end) * offset
            }
            MotionKind::SineHoming { amplitude, waves } => {
                // Damping factor shrinks the weave to nothing at arrival
                let damping = 1.0 - t;
                let offset = (t * waves * std::f32::consts::TAU).sin() * amplitude * damping;
                base + lateral_axis(start, end) * offset
            }
        }
    }
}

/// Unit vector perpendicular to the travel direction, in the ground plane
/// where possible. Vertical shots fall back to the world X axis so the
/// offset is still well-defined.
fn lateral_axis(start: Vec3, end: Vec3) -> Vec3 {
    let travel = (end - start).normalize_or_zero();
    let lateral = travel.cross(Vec3::Y);
    if lateral.length_squared() > 1e-6 {
        lateral.normalize()
    } else {
        Vec3::X
    }
}

/// Ease-out cubic: fast start, smooth settle. Used by Burst expansion.
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Vec3 = Vec3::ZERO;
    const END: Vec3 = Vec3::new(10.0, 0.0, 0.0);

    #[test]
    fn test_linear_endpoints() {
        let m = MotionKind::Linear;
        assert_eq!(m.position_at(0.0, START, END), START);
        assert_eq!(m.position_at(1.0, START, END), END);
        assert_eq!(m.position_at(0.5, START, END), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_curved_returns_to_target() {
        let m = MotionKind::Curved {
            amplitude: 2.0,
            direction: 1.0,
        };
        assert!(m.position_at(0.0, START, END).distance(START) < 1e-4);
        assert!(m.position_at(1.0, START, END).distance(END) < 1e-4);
        // Midpoint has the full lateral offset
        let mid = m.position_at(0.5, START, END);
        assert!((mid.distance(Vec3::new(5.0, 0.0, 0.0)) - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_curved_direction_flips_side() {
        let left = MotionKind::Curved {
            amplitude: 1.5,
            direction: 1.0,
        };
        let right = MotionKind::Curved {
            amplitude: 1.5,
            direction: -1.0,
        };
        let l = left.position_at(0.5, START, END);
        let r = right.position_at(0.5, START, END);
        assert!((l.z + r.z).abs() < 1e-4, "offsets should mirror: {l} vs {r}");
        assert!(l.z != r.z);
    }

    #[test]
    fn test_sine_homing_lands_on_target() {
        let m = MotionKind::SineHoming {
            amplitude: 3.0,
            waves: 2.5,
        };
        assert!(m.position_at(1.0, START, END).distance(END) < 1e-3);
    }

    #[test]
    fn test_sine_homing_weaves_off_axis() {
        let m = MotionKind::SineHoming {
            amplitude: 3.0,
            waves: 2.0,
        };
        // At a quarter period the lateral offset is nonzero
        let p = m.position_at(0.125, START, END);
        assert!(p.z.abs() > 0.1, "expected lateral weave, got {p}");
    }

    #[test]
    fn test_vertical_shot_has_stable_lateral_axis() {
        let up = Vec3::new(0.0, 10.0, 0.0);
        let m = MotionKind::Curved {
            amplitude: 1.0,
            direction: 1.0,
        };
        let p = m.position_at(0.5, START, up);
        assert!(p.is_finite());
    }

    #[test]
    fn test_progress_is_clamped() {
        let m = MotionKind::Linear;
        assert_eq!(m.position_at(-0.5, START, END), START);
        assert_eq!(m.position_at(1.5, START, END), END);
    }

    #[test]
    fn test_ease_out_cubic_shape() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert!((ease_out_cubic(1.0) - 1.0).abs() < 1e-6);
        // Ease-out: first half covers more than half the distance
        assert!(ease_out_cubic(0.5) > 0.5);
    }
}
