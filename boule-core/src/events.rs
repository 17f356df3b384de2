//! Per-frame report handed to whatever runs the game rules.
//!
//! The physics core knows nothing about turns or scoring. After each step it
//! records which pairs were struck and how hard, and how fast things are still
//! moving, and the rules layer reads that.

use serde::{Deserialize, Serialize};

use crate::body::BodyHandle;

/// A contact the resolver acted on during a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub time_of_impact: f64,
    /// Signed normal impulse applied to A along the contact normal.
    pub normal_impulse: f64,
}

impl ContactEvent {
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.body_a == handle || self.body_b == handle
    }
}

/// Summary of one [`crate::scene::Scene::step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub frame: u64,
    pub dt: f64,
    /// Sum of every slice the bodies were advanced by; equals `dt` for a
    /// valid step.
    pub integrated_time: f64,
    pub contacts: Vec<ContactEvent>,
    /// Fastest linear speed among movable bodies at the end of the step.
    pub max_speed: f64,
    /// Total kinetic energy of the movable bodies at the end of the step.
    pub kinetic_energy: f64,
}

impl StepReport {
    /// True when no movable body is faster than `threshold`.
    pub fn is_settled(&self, threshold: f64) -> bool {
        self.max_speed <= threshold
    }

    pub fn contacts_with(&self, handle: BodyHandle) -> impl Iterator<Item = &ContactEvent> {
        self.contacts.iter().filter(move |event| event.involves(handle))
    }
}

// =============================================================================
// Tests
// =============================================================================
