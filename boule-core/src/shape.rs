//! Collision shapes.
//!
//! Shapes live in body space: the body's position and orientation place them
//! in the world. Only spheres exist today; a new shape is a new [`Shape`]
//! variant plus a narrowphase routine for each pair it can meet.

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::error::BodyError;
use crate::types::{Mat3, Quat, Vec3};

/// A solid sphere centered on the body origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub radius: f64,
}

impl Sphere {
    /// Inertia tensor per unit mass: `(2/5) * r² * I`.
    pub fn inertia_tensor(&self) -> Mat3 {
        Mat3::identity() * (0.4 * self.radius * self.radius)
    }
}

/// The shape kinds a body can carry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Sphere(Sphere),
}

impl Shape {
    /// Create a sphere, rejecting non-positive or non-finite radii.
    pub fn sphere(radius: f64) -> Result<Self, BodyError> {
        let shape = Shape::Sphere(Sphere { radius });
        shape.validate()?;
        Ok(shape)
    }

    /// Check the invariants a deserialized shape may not have been held to.
    pub fn validate(&self) -> Result<(), BodyError> {
        match self {
            Shape::Sphere(sphere) => {
                if sphere.radius.is_finite() && sphere.radius > 0.0 {
                    Ok(())
                } else {
                    Err(BodyError::InvalidRadius(sphere.radius))
                }
            }
        }
    }

    /// Center of mass in body space.
    pub fn center_of_mass(&self) -> Vec3 {
        match self {
            Shape::Sphere(_) => Vec3::zeros(),
        }
    }

    /// Body-space inertia tensor per unit mass; scale by the mass to get the
    /// body's tensor.
    pub fn inertia_tensor(&self) -> Mat3 {
        match self {
            Shape::Sphere(sphere) => sphere.inertia_tensor(),
        }
    }

    /// World-space bounds for the shape placed at `position` / `orientation`.
    pub fn bounds(&self, position: &Vec3, _orientation: &Quat) -> Bounds {
        match self {
            Shape::Sphere(sphere) => {
                let r = Vec3::repeat(sphere.radius);
                Bounds::from_corners(position - r, position + r)
            }
        }
    }

    pub fn as_sphere(&self) -> Option<&Sphere> {
        match self {
            Shape::Sphere(sphere) => Some(sphere),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
