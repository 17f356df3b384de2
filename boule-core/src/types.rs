//! Core math types and constants for the physics simulation.
//!
//! Geometry comes from `nalgebra`; this module only fixes the scalar type and
//! gives the handful of types short names used across the crate.
//!
//! Units are whatever the host game uses consistently. The shipped presets
//! use meters, seconds and kilograms with +Z pointing up.

use nalgebra::{Matrix3, UnitQuaternion, Vector3};

// =============================================================================
// Aliases
// =============================================================================

/// Scalar type for every physical quantity.
pub type Real = f64;

/// A 3D vector used for positions, velocities, impulses and angular rates.
pub type Vec3 = Vector3<Real>;

/// Unit quaternion used for body orientation.
pub type Quat = UnitQuaternion<Real>;

/// 3x3 matrix used for inertia tensors and rotations.
pub type Mat3 = Matrix3<Real>;

/// Normalize `v`, or return `fallback` when `v` is too short to normalize.
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize(constants::EPSILON).unwrap_or(fallback)
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Constants shared by the collision pipeline.
pub mod constants {
    /// Small value for floating-point comparisons.
    pub const EPSILON: f64 = 1e-10;

    /// Padding added to every face of a swept bounding box in the broadphase.
    pub const BROADPHASE_MARGIN: f64 = 0.01;

    /// Standard gravity used by the default presets (m/s², along -Z).
    pub const GRAVITY: f64 = 10.0;

    /// Closing speed below which a contact is resolved without bounce.
    ///
    /// Several frames of default gravity at 60 Hz stay under it, so a body
    /// resting on another stops instead of hopping.
    pub const RESTING_SPEED: f64 = 0.5;
}

// =============================================================================
// Tests
// =============================================================================
