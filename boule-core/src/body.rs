//! Rigid bodies and their construction.
//!
//! A [`Body`] carries the full physical state of one sphere: pose, linear and
//! angular velocity, inverse mass, and the two contact coefficients.
//! Integration lives in [`crate::integrator`]; this module holds the
//! impulse, inertia and space-transform operations.
//!
//! Bodies with `inverse_mass == 0` are immovable. Impulses never change their
//! velocities, and the narrowphase never pairs two of them.

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::error::BodyError;
use crate::shape::Shape;
use crate::types::{constants, Mat3, Quat, Vec3};

/// Stable index of a body inside a [`crate::scene::Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A simulated rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec3,
    pub orientation: Quat,
    pub linear_velocity: Vec3,
    /// World-space angular velocity in radians per second.
    pub angular_velocity: Vec3,
    /// Zero means infinite mass.
    pub inverse_mass: f64,
    /// Coefficient of restitution (elasticity).
    pub restitution: f64,
    /// Coulomb friction coefficient.
    pub friction: f64,
    pub shape: Shape,
}

impl Body {
    pub fn has_infinite_mass(&self) -> bool {
        self.inverse_mass == 0.0
    }

    /// Mass in the body's units, or infinity for immovable bodies.
    pub fn mass(&self) -> f64 {
        if self.has_infinite_mass() {
            f64::INFINITY
        } else {
            1.0 / self.inverse_mass
        }
    }

    pub fn speed(&self) -> f64 {
        self.linear_velocity.norm()
    }

    /// Translational plus rotational kinetic energy; zero for immovable bodies.
    pub fn kinetic_energy(&self) -> f64 {
        if self.has_infinite_mass() {
            return 0.0;
        }
        let mass = self.mass();
        let inertia = self.world_rotation() * self.shape.inertia_tensor() * mass
            * self.world_rotation().transpose();
        let translational = 0.5 * mass * self.linear_velocity.norm_squared();
        let rotational = 0.5 * self.angular_velocity.dot(&(inertia * self.angular_velocity));
        translational + rotational
    }

    // -------------------------------------------------------------------------
    // Space transforms
    // -------------------------------------------------------------------------

    pub fn center_of_mass_world(&self) -> Vec3 {
        self.position + self.orientation * self.shape.center_of_mass()
    }

    /// Express a world-space point relative to the body's center of mass, in
    /// body axes.
    pub fn world_to_body(&self, world_point: &Vec3) -> Vec3 {
        self.orientation.inverse() * (world_point - self.center_of_mass_world())
    }

    /// Inverse of [`Body::world_to_body`].
    pub fn body_to_world(&self, body_point: &Vec3) -> Vec3 {
        self.center_of_mass_world() + self.orientation * body_point
    }

    fn world_rotation(&self) -> Mat3 {
        *self.orientation.to_rotation_matrix().matrix()
    }

    // -------------------------------------------------------------------------
    // Inertia
    // -------------------------------------------------------------------------

    /// Body-space inverse inertia tensor; the zero matrix for immovable bodies.
    pub fn inverse_inertia_body(&self) -> Mat3 {
        if self.has_infinite_mass() {
            return Mat3::zeros();
        }
        match self.shape.inertia_tensor().try_inverse() {
            Some(inverse) => inverse * self.inverse_mass,
            None => Mat3::zeros(),
        }
    }

    /// World-space inverse inertia tensor: `R * I⁻¹_body * Rᵀ`.
    pub fn inverse_inertia_world(&self) -> Mat3 {
        let r = self.world_rotation();
        r * self.inverse_inertia_body() * r.transpose()
    }

    // -------------------------------------------------------------------------
    // Impulses
    // -------------------------------------------------------------------------

    /// Change linear velocity by `impulse / mass`.
    pub fn apply_impulse_linear(&mut self, impulse: &Vec3) {
        if self.has_infinite_mass() {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
    }

    /// Change angular velocity by `I⁻¹_world * impulse`.
    pub fn apply_impulse_angular(&mut self, impulse: &Vec3) {
        if self.has_infinite_mass() {
            return;
        }
        self.angular_velocity += self.inverse_inertia_world() * impulse;
    }

    /// Apply `impulse` at the world-space `point`, splitting it into linear and
    /// angular parts around the center of mass.
    pub fn apply_impulse(&mut self, point: &Vec3, impulse: &Vec3) {
        if self.has_infinite_mass() {
            return;
        }
        self.apply_impulse_linear(impulse);

        let lever = point - self.center_of_mass_world();
        let angular = lever.cross(impulse);
        self.apply_impulse_angular(&angular);
    }

    /// World velocity of the material point at `point`.
    pub fn velocity_at(&self, point: &Vec3) -> Vec3 {
        let lever = point - self.center_of_mass_world();
        self.linear_velocity + self.angular_velocity.cross(&lever)
    }

    // -------------------------------------------------------------------------
    // Bounds
    // -------------------------------------------------------------------------

    pub fn bounds(&self) -> Bounds {
        self.shape.bounds(&self.position, &self.orientation)
    }

    /// Bounds covering the body's straight-line motion over `dt`, padded by
    /// `margin` on every face.
    pub fn swept_bounds(&self, dt: f64, margin: f64) -> Bounds {
        self.bounds()
            .swept(self.linear_velocity * dt)
            .padded(margin)
    }
}

// =============================================================================
// Construction
// =============================================================================

fn identity_quat() -> Quat {
    Quat::identity()
}

fn default_restitution() -> f64 {
    0.5
}

fn default_friction() -> f64 {
    0.5
}

fn default_inverse_mass() -> f64 {
    1.0
}

/// Validated description of a body, usable from YAML presets or as a builder.
///
/// ```
/// use boule_core::body::BodyDesc;
/// use boule_core::types::Vec3;
///
/// let ball = BodyDesc::sphere(1.0)
///     .with_position(Vec3::new(0.0, 0.0, 10.0))
///     .with_restitution(0.8)
///     .build()
///     .unwrap();
/// assert_eq!(ball.inverse_mass, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub shape: Shape,
    #[serde(default = "Vec3::zeros")]
    pub position: Vec3,
    #[serde(default = "identity_quat")]
    pub orientation: Quat,
    #[serde(default = "Vec3::zeros")]
    pub linear_velocity: Vec3,
    #[serde(default = "Vec3::zeros")]
    pub angular_velocity: Vec3,
    #[serde(default = "default_inverse_mass")]
    pub inverse_mass: f64,
    #[serde(default = "default_restitution")]
    pub restitution: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
}

impl BodyDesc {
    /// A movable unit-mass body with the given shape at the origin.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            inverse_mass: default_inverse_mass(),
            restitution: default_restitution(),
            friction: default_friction(),
        }
    }

    /// Shortcut for a sphere; the radius is checked in [`BodyDesc::build`].
    pub fn sphere(radius: f64) -> Self {
        Self::new(Shape::Sphere(crate::shape::Sphere { radius }))
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }

    pub fn with_inverse_mass(mut self, inverse_mass: f64) -> Self {
        self.inverse_mass = inverse_mass;
        self
    }

    /// Make the body immovable.
    pub fn fixed(self) -> Self {
        self.with_inverse_mass(0.0)
    }

    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    /// Validate every field and produce the body.
    pub fn build(self) -> Result<Body, BodyError> {
        self.shape.validate()?;
        check_finite("position", &self.position)?;
        check_finite("linear_velocity", &self.linear_velocity)?;
        check_finite("angular_velocity", &self.angular_velocity)?;
        if !self.orientation.coords.iter().all(|c| c.is_finite()) {
            return Err(BodyError::NonFinite {
                field: "orientation",
            });
        }
        if self.orientation.coords.norm() < constants::EPSILON {
            return Err(BodyError::DegenerateOrientation);
        }
        if !self.inverse_mass.is_finite() || self.inverse_mass < 0.0 {
            return Err(BodyError::InvalidInverseMass(self.inverse_mass));
        }
        check_coefficient("restitution", self.restitution)?;
        check_coefficient("friction", self.friction)?;

        Ok(Body {
            position: self.position,
            orientation: Quat::new_normalize(self.orientation.into_inner()),
            linear_velocity: self.linear_velocity,
            angular_velocity: self.angular_velocity,
            inverse_mass: self.inverse_mass,
            restitution: self.restitution,
            friction: self.friction,
            shape: self.shape,
        })
    }
}

fn check_finite(field: &'static str, v: &Vec3) -> Result<(), BodyError> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(BodyError::NonFinite { field })
    }
}

fn check_coefficient(name: &'static str, value: f64) -> Result<(), BodyError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BodyError::InvalidCoefficient { name, value })
    }
}

// =============================================================================
// Tests
// =============================================================================
