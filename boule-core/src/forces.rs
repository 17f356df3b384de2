//! External forces applied at the start of every frame.
//!
//! Forces enter the simulation as impulses: over a frame of length `dt` a
//! force `F` changes momentum by `I = F * dt`, so gravity on a body of mass
//! `m` is the impulse `m * g * dt`.
//!
//! - **Uniform**: a constant acceleration vector, the pétanque ground case.
//! - **Radial**: pulled toward the center of mass of an anchor body, for
//!   small-planet scenes where "down" depends on where you stand.
//!
//! Damping is applied after gravity and blends velocities toward rest by a
//! fixed fraction per frame to stand in for rolling and air resistance.

use serde::{Deserialize, Serialize};

use crate::body::{Body, BodyHandle};
use crate::types::{constants, Vec3};

/// Something that pushes bodies around between collisions.
pub trait ForceModel {
    /// Impulse to apply to `body` for a frame of `dt` seconds.
    ///
    /// `bodies` is the whole live scene, for models that depend on other
    /// bodies. Immovable bodies are skipped by the caller.
    fn impulse(&self, body: &Body, bodies: &[Body], dt: f64) -> Vec3;
}

/// Gravity configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GravityModel {
    None,
    Uniform {
        acceleration: Vec3,
    },
    Radial {
        anchor: BodyHandle,
        strength: f64,
    },
}

impl Default for GravityModel {
    fn default() -> Self {
        GravityModel::Uniform {
            acceleration: Vec3::new(0.0, 0.0, -constants::GRAVITY),
        }
    }
}

impl ForceModel for GravityModel {
    fn impulse(&self, body: &Body, bodies: &[Body], dt: f64) -> Vec3 {
        if body.has_infinite_mass() {
            return Vec3::zeros();
        }
        let mass = body.mass();

        match self {
            GravityModel::None => Vec3::zeros(),
            GravityModel::Uniform { acceleration } => acceleration * (mass * dt),
            GravityModel::Radial { anchor, strength } => {
                let Some(anchor_body) = bodies.get(anchor.index()) else {
                    return Vec3::zeros();
                };
                let to_anchor = anchor_body.center_of_mass_world() - body.center_of_mass_world();
                match to_anchor.try_normalize(constants::EPSILON) {
                    Some(direction) => direction * (strength * mass * dt),
                    None => Vec3::zeros(),
                }
            }
        }
    }
}

/// Per-frame velocity damping factors in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Damping {
    pub linear: f64,
    pub angular: f64,
}

impl Damping {
    /// Blend the body's velocities toward zero.
    pub fn apply(&self, body: &mut Body) {
        if body.has_infinite_mass() {
            return;
        }
        body.linear_velocity = body.linear_velocity.lerp(&Vec3::zeros(), self.linear);
        body.angular_velocity = body.angular_velocity.lerp(&Vec3::zeros(), self.angular);
    }
}

/// Apply `model` and then `damping` to every movable body.
pub fn apply_external<F: ForceModel>(model: &F, damping: &Damping, bodies: &mut [Body], dt: f64) {
    for i in 0..bodies.len() {
        if bodies[i].has_infinite_mass() {
            continue;
        }
        let impulse = model.impulse(&bodies[i], bodies, dt);
        let body = &mut bodies[i];
        body.apply_impulse_linear(&impulse);
        damping.apply(body);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyDesc;

    fn ball_at(position: Vec3, inverse_mass: f64) -> Body {
        BodyDesc::sphere(1.0)
            .with_position(position)
            .with_inverse_mass(inverse_mass)
            .build()
            .unwrap()
    }

    #[test]
    fn test_uniform_gravity_impulse() {
        let gravity = GravityModel::default();
        let ball = ball_at(Vec3::new(0.0, 0.0, 10.0), 0.5);

        let impulse = gravity.impulse(&ball, &[], 0.1);

        // m = 2, g = 10, dt = 0.1
        assert!(impulse.x.abs() < constants::EPSILON);
        assert!(impulse.y.abs() < constants::EPSILON);
        assert!((impulse.z + 2.0).abs() < constants::EPSILON);
    }

    #[test]
    fn test_gravity_changes_velocity_independent_of_mass() {
        let gravity = GravityModel::default();
        let mut bodies = vec![ball_at(Vec3::zeros(), 1.0), ball_at(Vec3::x() * 5.0, 0.1)];

        apply_external(&gravity, &Damping::default(), &mut bodies, 0.5);

        assert!((bodies[0].linear_velocity.z + 5.0).abs() < 1e-12);
        assert!((bodies[1].linear_velocity.z + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_radial_gravity_points_at_anchor() {
        let gravity = GravityModel::Radial {
            anchor: BodyHandle(0),
            strength: 9.0,
        };
        let planet = BodyDesc::sphere(100.0).fixed().build().unwrap();
        let ball = ball_at(Vec3::new(0.0, 200.0, 0.0), 1.0);
        let bodies = vec![planet, ball.clone()];

        let impulse = gravity.impulse(&ball, &bodies, 1.0);

        assert!(impulse.x.abs() < 1e-12);
        assert!((impulse.y + 9.0).abs() < 1e-12, "got {:?}", impulse);
        assert!(impulse.z.abs() < 1e-12);
    }

    #[test]
    fn test_radial_gravity_missing_anchor_is_zero() {
        let gravity = GravityModel::Radial {
            anchor: BodyHandle(7),
            strength: 9.0,
        };
        let ball = ball_at(Vec3::zeros(), 1.0);
        assert_eq!(gravity.impulse(&ball, &[], 1.0), Vec3::zeros());
    }

    #[test]
    fn test_immovable_bodies_are_skipped() {
        let gravity = GravityModel::default();
        let mut bodies = vec![BodyDesc::sphere(1.0).fixed().build().unwrap()];

        apply_external(&gravity, &Damping { linear: 0.5, angular: 0.5 }, &mut bodies, 1.0);

        assert_eq!(bodies[0].linear_velocity, Vec3::zeros());
    }

    #[test]
    fn test_damping_blends_toward_rest() {
        let damping = Damping {
            linear: 0.1,
            angular: 0.5,
        };
        let mut ball = BodyDesc::sphere(1.0)
            .with_linear_velocity(Vec3::new(10.0, 0.0, 0.0))
            .with_angular_velocity(Vec3::new(0.0, 4.0, 0.0))
            .build()
            .unwrap();

        damping.apply(&mut ball);

        assert!((ball.linear_velocity.x - 9.0).abs() < 1e-12);
        assert!((ball.angular_velocity.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_gravity_yaml_forms() {
        let uniform: GravityModel =
            serde_yaml::from_str("kind: uniform\nacceleration: [0.0, 0.0, -9.81]\n").unwrap();
        assert_eq!(
            uniform,
            GravityModel::Uniform {
                acceleration: Vec3::new(0.0, 0.0, -9.81)
            }
        );

        let radial: GravityModel =
            serde_yaml::from_str("kind: radial\nanchor: 1\nstrength: 4.0\n").unwrap();
        assert_eq!(
            radial,
            GravityModel::Radial {
                anchor: BodyHandle(1),
                strength: 4.0
            }
        );
    }
}
