//! Scene presets.
//!
//! A preset fixes everything a scene needs at start-up: gravity, damping,
//! how contact coefficients are combined, the spawn template for launched
//! balls, and the initial bodies. Presets are plain YAML so they can be
//! tweaked without recompiling.
//!
//! ## Directory Structure
//!
//! ```text
//! presets/
//! └── scenes/
//!     ├── petanque.yaml
//!     └── orbit.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::body::BodyDesc;
use crate::collision::resolution::{CombineRule, ContactResolver};
use crate::error::{BodyError, ConfigError};
use crate::forces::{Damping, GravityModel};
use crate::shape::Shape;
use crate::types::{constants, Vec3};

/// Template for balls launched with [`crate::scene::Scene::spawn_ball`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub radius: f64,
    pub inverse_mass: f64,
    pub restitution: f64,
    pub friction: f64,
    /// Launch speed at strength 1.0.
    pub launch_speed: f64,
    pub min_strength: f64,
    pub max_strength: f64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            inverse_mass: 1.0,
            restitution: 0.5,
            friction: 0.5,
            launch_speed: 10.0,
            min_strength: 0.5,
            max_strength: 2.0,
        }
    }
}

impl SpawnConfig {
    /// Clamp a requested strength into the configured range.
    pub fn clamp_strength(&self, strength: f64) -> f64 {
        if strength.is_nan() {
            return self.min_strength;
        }
        strength.clamp(self.min_strength, self.max_strength)
    }

    /// Body description for a ball launched from `origin` toward `aim`.
    pub fn ball(&self, origin: Vec3, aim: Vec3, strength: f64) -> Result<BodyDesc, BodyError> {
        let direction = (aim - origin)
            .try_normalize(constants::EPSILON)
            .ok_or(BodyError::DegenerateAim)?;
        let speed = self.launch_speed * self.clamp_strength(strength);

        Ok(BodyDesc::new(Shape::sphere(self.radius)?)
            .with_position(origin)
            .with_linear_velocity(direction * speed)
            .with_inverse_mass(self.inverse_mass)
            .with_restitution(self.restitution)
            .with_friction(self.friction))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.radius,
            self.inverse_mass,
            self.launch_speed,
            self.min_strength,
            self.max_strength,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(ConfigError::Invalid("spawn values must be finite".to_string()));
        }
        if self.min_strength > self.max_strength {
            return Err(ConfigError::Invalid(format!(
                "spawn strength range is empty: [{}, {}]",
                self.min_strength, self.max_strength
            )));
        }
        if self.inverse_mass <= 0.0 {
            return Err(ConfigError::Invalid(
                "spawned balls must be movable".to_string(),
            ));
        }
        // Radius and coefficients go through body validation
        self.ball(Vec3::zeros(), Vec3::x(), 1.0)?.build()?;
        Ok(())
    }
}

/// Everything needed to build a [`crate::scene::Scene`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,
    pub gravity: GravityModel,
    /// Fraction of linear velocity removed each frame, in `[0, 1]`.
    pub linear_damping: f64,
    /// Fraction of angular velocity removed each frame, in `[0, 1]`.
    pub angular_damping: f64,
    pub restitution_rule: CombineRule,
    pub friction_rule: CombineRule,
    pub broadphase_margin: f64,
    pub skip_separating: bool,
    pub correct_overlap: bool,
    /// Closing speed below which contacts do not bounce.
    pub resting_speed: f64,
    pub spawn: SpawnConfig,
    pub bodies: Vec<BodyDesc>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let resolver = ContactResolver::default();
        Self {
            name: "empty".to_string(),
            gravity: GravityModel::default(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            restitution_rule: resolver.restitution_rule,
            friction_rule: resolver.friction_rule,
            broadphase_margin: constants::BROADPHASE_MARGIN,
            skip_separating: resolver.skip_separating,
            correct_overlap: resolver.correct_overlap,
            resting_speed: resolver.resting_speed,
            spawn: SpawnConfig::default(),
            bodies: Vec::new(),
        }
    }
}

impl SceneConfig {
    /// A unit ball dropped from ten units above a huge fixed earth.
    pub fn petanque() -> Self {
        Self {
            name: "petanque".to_string(),
            bodies: vec![
                BodyDesc::sphere(1.0).with_position(Vec3::new(0.0, 0.0, 10.0)),
                BodyDesc::sphere(1000.0)
                    .with_position(Vec3::new(0.0, 0.0, -1000.0))
                    .fixed(),
            ],
            ..Self::default()
        }
    }

    /// Parse and validate a preset.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every value a scene relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("linear_damping", self.linear_damping),
            ("angular_damping", self.angular_damping),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("broadphase_margin", self.broadphase_margin),
            ("resting_speed", self.resting_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        match &self.gravity {
            GravityModel::None => {}
            GravityModel::Uniform { acceleration } => {
                if !acceleration.iter().all(|c| c.is_finite()) {
                    return Err(ConfigError::Invalid(
                        "gravity acceleration must be finite".to_string(),
                    ));
                }
            }
            GravityModel::Radial { anchor, strength } => {
                if anchor.index() >= self.bodies.len() {
                    return Err(ConfigError::Invalid(format!(
                        "gravity anchor {} is not one of the {} preset bodies",
                        anchor.0,
                        self.bodies.len()
                    )));
                }
                if !strength.is_finite() {
                    return Err(ConfigError::Invalid(
                        "gravity strength must be finite".to_string(),
                    ));
                }
            }
        }
        self.spawn.validate()?;
        for desc in &self.bodies {
            desc.clone().build()?;
        }
        Ok(())
    }

    pub fn damping(&self) -> Damping {
        Damping {
            linear: self.linear_damping,
            angular: self.angular_damping,
        }
    }

    pub fn resolver(&self) -> ContactResolver {
        ContactResolver {
            restitution_rule: self.restitution_rule,
            friction_rule: self.friction_rule,
            skip_separating: self.skip_separating,
            correct_overlap: self.correct_overlap,
            resting_speed: self.resting_speed,
        }
    }
}

/// Preset loader with configurable base directory.
pub struct PresetLoader {
    base_path: PathBuf,
}

impl PresetLoader {
    /// The base path should contain a `scenes/` subdirectory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a scene by name (without .yaml extension).
    ///
    /// # Example
    /// ```ignore
    /// let loader = PresetLoader::new("presets");
    /// let scene = loader.load_scene("petanque")?;
    /// ```
    pub fn load_scene(&self, name: &str) -> Result<SceneConfig, ConfigError> {
        let path = self.base_path.join("scenes").join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(ConfigError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        let config = SceneConfig::from_yaml_str(&contents)?;
        info!("loaded scene preset '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// List all available scenes.
    pub fn list_scenes(&self) -> Result<Vec<String>, ConfigError> {
        let path = self.base_path.join("scenes");
        if !path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&path)? {
            let file_name = entry?.file_name();
            let name = file_name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".yaml") {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================
