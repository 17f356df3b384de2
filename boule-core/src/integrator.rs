//! Time integration of body poses.
//!
//! Velocities change only through impulses (gravity included), so advancing a
//! body is a pure pose update. This is the position half of semi-implicit
//! Euler: velocities are updated first by the scene, then positions use the
//! new velocities.
//!
//! ## Algorithm
//!
//! ```text
//! 1. x      += v * dt
//! 2. ω      -= I⁻¹ (ω × I ω) * dt          // torque-free precession
//! 3. dq      = exp(ω * dt)                  // scaled-axis rotation
//! 4. q       = normalize(dq * q)
//! 5. x       = com + dq * (x - com)         // rotate about center of mass
//! ```
//!
//! For spheres steps 2 and 5 vanish, but they keep the update correct for
//! shapes whose center of mass is off the body origin.

use crate::body::Body;
use crate::types::Quat;

/// Semi-implicit Euler pose integrator.
pub struct SemiImplicitEuler;

impl SemiImplicitEuler {
    /// Advance one body by `dt` seconds.
    pub fn advance(body: &mut Body, dt: f64) {
        body.position += body.linear_velocity * dt;

        let rotation = *body.orientation.to_rotation_matrix().matrix();
        let inertia = rotation * body.shape.inertia_tensor() * rotation.transpose();
        if let Some(inverse) = inertia.try_inverse() {
            let precession = inverse * body.angular_velocity.cross(&(inertia * body.angular_velocity));
            body.angular_velocity -= precession * dt;
        }

        let delta = Quat::from_scaled_axis(body.angular_velocity * dt);
        let center = body.center_of_mass_world();
        let offset = body.position - center;

        body.orientation = Quat::new_normalize((delta * body.orientation).into_inner());
        body.position = center + delta * offset;
    }

    /// Advance every body by the same `dt` and return the time advanced.
    ///
    /// Moving the whole scene together keeps all bodies on one clock, which
    /// the time-of-impact ordering in the scene relies on.
    pub fn advance_all(bodies: &mut [Body], dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }
        for body in bodies.iter_mut() {
            Self::advance(body, dt);
        }
        dt
    }
}

impl Body {
    /// Integrate this body's pose forward by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        SemiImplicitEuler::advance(self, dt);
    }
}

// =============================================================================
// Tests
// =============================================================================
