//! Sequential impulse contact resolution.
//!
//! Each contact is resolved on its own with one instantaneous impulse along
//! the normal plus one friction impulse in the contact plane. The scene
//! feeds contacts in time-of-impact order, so later contacts see velocities
//! already changed by earlier ones.
//!
//! ## Normal impulse
//!
//! ```text
//! v_ab = (v_a + ω_a × r_a) - (v_b + ω_b × r_b)        closing speed = v_ab · n
//!
//!            -(1 + e) (v_ab · n)
//! j = ────────────────────────────────────────────────────────────
//!      1/m_a + 1/m_b + ((I_a⁻¹ (r_a × n)) × r_a + (I_b⁻¹ (r_b × n)) × r_b) · n
//! ```
//!
//! `+j n` goes to A and `-j n` to B. With `n` pointing from A to B, an
//! approaching pair has positive closing speed and a negative `j`.
//!
//! Below `resting_speed` the restitution `e` is taken as zero. Gravity adds a
//! small closing speed to a resting body every frame, and bouncing that back
//! would keep the body hopping forever.
//!
//! ## Friction
//!
//! The tangential part of `v_ab` is opposed by an impulse large enough to
//! stop the sliding, capped by Coulomb's law at `μ |j|`.

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::body::{Body, BodyHandle};
use crate::collision::contact::Contact;
use crate::types::constants;

/// How two bodies' coefficients are merged into one for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineRule {
    Min,
    Max,
    Average,
    GeometricMean,
    Product,
}

impl CombineRule {
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            CombineRule::Min => a.min(b),
            CombineRule::Max => a.max(b),
            CombineRule::Average => 0.5 * (a + b),
            CombineRule::GeometricMean => (a * b).sqrt(),
            CombineRule::Product => a * b,
        }
    }
}

/// What the resolver did with a contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Impulses were applied.
    Applied {
        /// Signed normal impulse `j`; negative when pushing A away from B.
        normal_impulse: f64,
        /// Magnitude of the friction impulse.
        friction_impulse: f64,
    },
    /// The bodies were already moving apart.
    Separating,
    /// Nothing could be applied: both immovable or a degenerate denominator.
    Skipped,
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied { .. })
    }
}

/// Resolves one contact at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactResolver {
    pub restitution_rule: CombineRule,
    pub friction_rule: CombineRule,
    /// Leave contacts whose bodies are already separating untouched.
    pub skip_separating: bool,
    /// Push bodies that start a frame interpenetrating back to touching.
    pub correct_overlap: bool,
    /// Contacts closing slower than this get no restitution.
    pub resting_speed: f64,
}

impl Default for ContactResolver {
    fn default() -> Self {
        Self {
            restitution_rule: CombineRule::Min,
            friction_rule: CombineRule::GeometricMean,
            skip_separating: true,
            correct_overlap: true,
            resting_speed: constants::RESTING_SPEED,
        }
    }
}

impl ContactResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `contact` between the bodies it names inside `bodies`.
    pub fn resolve_in(&self, bodies: &mut [Body], contact: &Contact) -> Resolution {
        match pair_mut(bodies, contact.body_a, contact.body_b) {
            Some((a, b)) => self.resolve(a, b, contact),
            None => {
                warn!(
                    "contact names invalid body pair ({:?}, {:?})",
                    contact.body_a, contact.body_b
                );
                Resolution::Skipped
            }
        }
    }

    /// Resolve `contact` between `a` and `b`.
    ///
    /// Contact points are re-derived from the contact's body-space points, so
    /// they follow the bodies to wherever the scene has moved them.
    pub fn resolve(&self, a: &mut Body, b: &mut Body, contact: &Contact) -> Resolution {
        if a.has_infinite_mass() && b.has_infinite_mass() {
            return Resolution::Skipped;
        }

        let normal = contact.normal;
        if self.correct_overlap && contact.time_of_impact == 0.0 {
            separate(a, b, contact);
        }

        let point_a = a.body_to_world(&contact.local_point_a);
        let point_b = b.body_to_world(&contact.local_point_b);
        let ra = point_a - a.center_of_mass_world();
        let rb = point_b - b.center_of_mass_world();
        let inv_inertia_a = a.inverse_inertia_world();
        let inv_inertia_b = b.inverse_inertia_world();
        let inv_mass_sum = a.inverse_mass + b.inverse_mass;

        let closing = (a.velocity_at(&point_a) - b.velocity_at(&point_b)).dot(&normal);
        if self.skip_separating && closing <= 0.0 {
            return Resolution::Separating;
        }

        let angular = (inv_inertia_a * ra.cross(&normal)).cross(&ra)
            + (inv_inertia_b * rb.cross(&normal)).cross(&rb);
        let denominator = inv_mass_sum + angular.dot(&normal);
        if denominator < constants::EPSILON {
            warn!("degenerate contact denominator {}", denominator);
            return Resolution::Skipped;
        }

        let restitution = if closing < self.resting_speed {
            0.0
        } else {
            self.restitution_rule.combine(a.restitution, b.restitution)
        };
        let normal_impulse = -(1.0 + restitution) * closing / denominator;
        let impulse = normal * normal_impulse;
        a.apply_impulse(&point_a, &impulse);
        b.apply_impulse(&point_b, &-impulse);

        // Friction, from the velocities left after the normal impulse
        let relative = a.velocity_at(&point_a) - b.velocity_at(&point_b);
        let tangential = relative - normal * relative.dot(&normal);
        let mut friction_impulse = 0.0;

        if let Some(tangent) = tangential.try_normalize(constants::EPSILON) {
            let angular_t = (inv_inertia_a * ra.cross(&tangent)).cross(&ra)
                + (inv_inertia_b * rb.cross(&tangent)).cross(&rb);
            let denominator_t = inv_mass_sum + angular_t.dot(&tangent);

            if denominator_t > constants::EPSILON {
                let friction = self.friction_rule.combine(a.friction, b.friction);
                let to_stop = tangential.norm() / denominator_t;
                friction_impulse = to_stop.min(friction * normal_impulse.abs());

                let impulse_t = tangent * friction_impulse;
                a.apply_impulse(&point_a, &-impulse_t);
                b.apply_impulse(&point_b, &impulse_t);
            }
        }

        trace!(
            "resolved {:?}/{:?} at t={:.5}: j={:.5} jt={:.5}",
            contact.body_a,
            contact.body_b,
            contact.time_of_impact,
            normal_impulse,
            friction_impulse
        );

        Resolution::Applied {
            normal_impulse,
            friction_impulse,
        }
    }
}

/// Move two interpenetrating bodies apart along the contact normal, sharing the
/// correction by inverse mass.
fn separate(a: &mut Body, b: &mut Body, contact: &Contact) {
    let normal = contact.normal;
    let point_a = a.body_to_world(&contact.local_point_a);
    let point_b = b.body_to_world(&contact.local_point_b);
    let depth = (point_b - point_a).dot(&normal);
    if depth >= 0.0 {
        return;
    }
    let inv_mass_sum = a.inverse_mass + b.inverse_mass;
    if inv_mass_sum < constants::EPSILON {
        return;
    }
    let correction = normal * depth;
    a.position += correction * (a.inverse_mass / inv_mass_sum);
    b.position -= correction * (b.inverse_mass / inv_mass_sum);
}

/// Borrow two distinct bodies mutably at once.
pub fn pair_mut(
    bodies: &mut [Body],
    a: BodyHandle,
    b: BodyHandle,
) -> Option<(&mut Body, &mut Body)> {
    let (i, j) = (a.index(), b.index());
    if i == j || i >= bodies.len() || j >= bodies.len() {
        return None;
    }
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        Some((&mut head[i], &mut tail[0]))
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        Some((&mut tail[0], &mut head[j]))
    }
}

// =============================================================================
// Tests
// =============================================================================
