//! Python bindings for the boule-core physics engine.
//!
//! Provides a simple Python API:
//!
//! ```python
//! from boule_physics import Simulation
//!
//! sim = Simulation()                      # built-in petanque scene
//! sim.spawn_ball((0.0, -20.0, 3.0), (0.0, 0.0, 0.0), 1.2)
//!
//! for _ in range(600):
//!     sim.step(1.0 / 60.0)
//!     sim.commit_pending_spawns()
//!     for (a, b, toi, impulse) in sim.last_contacts():
//!         print(f"{a} hit {b} at t={toi:.4f}")
//!     if sim.is_settled(0.05):
//!         break
//! ```

use log::debug;
use pyo3::exceptions::{PyIndexError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use boule_core::config::PresetLoader;
use boule_core::{Body, BodyHandle, Scene, SceneConfig, Vec3 as CoreVec3};

/// 3D vector for positions, velocities, etc.
#[pyclass]
#[derive(Clone, Copy)]
pub struct Vec3 {
    #[pyo3(get, set)]
    pub x: f64,
    #[pyo3(get, set)]
    pub y: f64,
    #[pyo3(get, set)]
    pub z: f64,
}

#[pymethods]
impl Vec3 {
    #[new]
    fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn __repr__(&self) -> String {
        format!("Vec3({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }

    fn magnitude(&self) -> f64 {
        CoreVec3::from(*self).norm()
    }

    fn to_tuple(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }
}

impl From<CoreVec3> for Vec3 {
    fn from(v: CoreVec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Vec3> for CoreVec3 {
    fn from(v: Vec3) -> Self {
        CoreVec3::new(v.x, v.y, v.z)
    }
}

fn vector((x, y, z): (f64, f64, f64)) -> CoreVec3 {
    CoreVec3::new(x, y, z)
}

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Main simulation class.
///
/// Owns one scene and exposes the step / commit / spawn cycle a game loop
/// drives once per frame.
#[pyclass]
pub struct Simulation {
    scene: Scene,
}

impl Simulation {
    fn body(&self, index: u32) -> PyResult<&Body> {
        self.scene
            .body(BodyHandle(index))
            .ok_or_else(|| PyIndexError::new_err(format!("no live body {}", index)))
    }
}

#[pymethods]
impl Simulation {
    /// Create a simulation from a preset name, or the built-in petanque
    /// scene when no name is given.
    #[new]
    #[pyo3(signature = (preset=None, presets_dir="presets"))]
    fn new(preset: Option<&str>, presets_dir: &str) -> PyResult<Self> {
        let config = match preset {
            Some(name) => PresetLoader::new(presets_dir)
                .load_scene(name)
                .map_err(value_error)?,
            None => SceneConfig::petanque(),
        };
        debug!("python simulation using scene '{}'", config.name);
        let scene = Scene::new(config).map_err(value_error)?;
        Ok(Self { scene })
    }

    /// Number of completed steps since creation or the last reset.
    #[getter]
    fn frame(&self) -> u64 {
        self.scene.frame()
    }

    /// Advance simulation by dt seconds.
    fn step(&mut self, dt: f64) -> PyResult<()> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(PyValueError::new_err(format!("invalid dt: {}", dt)));
        }
        self.scene.step(dt);
        Ok(())
    }

    /// Run multiple steps at once, committing spawns after each.
    fn step_n(&mut self, dt: f64, steps: usize) -> PyResult<()> {
        for _ in 0..steps {
            self.step(dt)?;
            self.scene.commit_pending_spawns();
        }
        Ok(())
    }

    /// Merge balls queued by `spawn_ball` into the live set.
    fn commit_pending_spawns(&mut self) -> usize {
        self.scene.commit_pending_spawns()
    }

    /// Queue a ball launched from `origin` toward `aim`.
    ///
    /// Returns the body index the ball will have once committed.
    fn spawn_ball(
        &mut self,
        origin: (f64, f64, f64),
        aim: (f64, f64, f64),
        strength: f64,
    ) -> PyResult<u32> {
        self.scene
            .spawn_ball(vector(origin), vector(aim), strength)
            .map(|handle| handle.0)
            .map_err(value_error)
    }

    fn body_count(&self) -> usize {
        self.scene.body_count()
    }

    fn body_position(&self, index: u32) -> PyResult<Vec3> {
        Ok(self.body(index)?.position.into())
    }

    /// Orientation quaternion as (x, y, z, w).
    fn body_orientation(&self, index: u32) -> PyResult<(f64, f64, f64, f64)> {
        let q = self.body(index)?.orientation;
        Ok((q.i, q.j, q.k, q.w))
    }

    fn body_velocity(&self, index: u32) -> PyResult<Vec3> {
        Ok(self.body(index)?.linear_velocity.into())
    }

    /// Positions of every live body as tuples, for bulk rendering.
    fn positions(&self) -> Vec<(f64, f64, f64)> {
        self.scene
            .bodies()
            .iter()
            .map(|body| (body.position.x, body.position.y, body.position.z))
            .collect()
    }

    /// Contacts resolved in the last step as (a, b, time_of_impact, impulse).
    fn last_contacts(&self) -> Vec<(u32, u32, f64, f64)> {
        self.scene
            .last_report()
            .contacts
            .iter()
            .map(|event| {
                (
                    event.body_a.0,
                    event.body_b.0,
                    event.time_of_impact,
                    event.normal_impulse,
                )
            })
            .collect()
    }

    /// True when no movable body was faster than `threshold` after the last step.
    fn is_settled(&self, threshold: f64) -> bool {
        self.scene.last_report().is_settled(threshold)
    }

    /// Nearest body under a ray, as (index, ray parameter), or None.
    fn pick(&self, start: (f64, f64, f64), direction: (f64, f64, f64)) -> Option<(u32, f64)> {
        self.scene
            .ray_cast(&vector(start), &vector(direction))
            .map(|(handle, t)| (handle.0, t))
    }

    /// Reset the scene to its preset bodies.
    fn reset(&mut self) {
        self.scene.reset();
    }

    /// Get the last step's summary as a dict for easy inspection.
    fn report_dict(&self, py: Python<'_>) -> PyResult<PyObject> {
        let report = self.scene.last_report();
        let dict = PyDict::new(py);
        dict.set_item("frame", report.frame)?;
        dict.set_item("dt", report.dt)?;
        dict.set_item("integrated_time", report.integrated_time)?;
        dict.set_item("contacts", report.contacts.len())?;
        dict.set_item("max_speed", report.max_speed)?;
        dict.set_item("pending", self.scene.pending_count())?;
        Ok(dict.into_any().unbind())
    }
}

/// Python module definition.
#[pymodule]
fn boule_physics(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Vec3>()?;
    m.add_class::<Simulation>()?;
    Ok(())
}
