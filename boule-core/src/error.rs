//! Error types for body construction and preset loading.

use thiserror::Error;

/// Rejected body or shape construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BodyError {
    /// Sphere radius must be positive and finite.
    #[error("invalid sphere radius: {0}")]
    InvalidRadius(f64),

    /// A vector or quaternion field contained NaN or infinity.
    #[error("non-finite value in {field}")]
    NonFinite { field: &'static str },

    /// Orientation quaternion is too short to normalize.
    #[error("orientation quaternion has zero length")]
    DegenerateOrientation,

    /// Inverse mass must be finite and non-negative.
    #[error("invalid inverse mass: {0}")]
    InvalidInverseMass(f64),

    /// Restitution and friction must be finite and non-negative.
    #[error("invalid {name} coefficient: {value}")]
    InvalidCoefficient { name: &'static str, value: f64 },

    /// Launch origin and aim point coincide, so there is no direction.
    #[error("spawn aim point coincides with origin")]
    DegenerateAim,
}

/// Errors from reading or validating a scene preset.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("scene preset not found: {0}")]
    NotFound(String),

    /// The preset parsed but its values are unusable.
    #[error("invalid scene preset: {0}")]
    Invalid(String),

    /// One of the preset bodies failed validation.
    #[error("invalid body in preset: {0}")]
    Body(#[from] BodyError),
}
