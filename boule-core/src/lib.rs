//! # Boule Core
//!
//! Continuous-collision rigid-body physics for games played with balls.
//!
//! ## Architecture
//!
//! - `types`: nalgebra aliases (`Vec3`, `Quat`, `Mat3`) and constants
//! - `shape` / `bounds`: sphere geometry, inertia and bounding boxes
//! - `body`: rigid bodies, handles and the `BodyDesc` builder
//! - `integrator`: semi-implicit pose integration
//! - `forces`: gravity models and damping
//! - `collision`: sweep and prune, time of impact, impulse resolution
//! - `events`: per-step report for the game-rules layer
//! - `scene`: the body arena and frame pipeline
//! - `config`: YAML scene presets
//!
//! ## Example
//!
//! ```
//! use boule_core::scene::Scene;
//!
//! let mut scene = Scene::petanque().unwrap();
//! for _ in 0..60 {
//!     scene.step(1.0 / 60.0);
//!     scene.commit_pending_spawns();
//! }
//! assert!(scene.bodies()[0].position.z < 10.0);
//! ```

pub mod body;
pub mod bounds;
pub mod collision;
pub mod config;
pub mod error;
pub mod events;
pub mod forces;
pub mod integrator;
pub mod scene;
pub mod shape;
pub mod types;

pub use body::{Body, BodyDesc, BodyHandle};
pub use config::{PresetLoader, SceneConfig, SpawnConfig};
pub use error::{BodyError, ConfigError};
pub use events::{ContactEvent, StepReport};
pub use scene::Scene;
pub use types::{Quat, Real, Vec3};
