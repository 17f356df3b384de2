//! Continuous sphere-sphere intersection.
//!
//! Both spheres are assumed to move in straight lines at their current
//! velocities for the whole frame. The separation between centers is then a
//! linear function of time, and the instant the surfaces touch is a root of
//! a quadratic:
//!
//! ```text
//! |p + v t| = R      p = pos_b - pos_a,  v = vel_b - vel_a,  R = r_a + r_b
//!
//! (v·v) t² + 2 (p·v) t + (p·p - R²) = 0
//! ```
//!
//! The smaller root is the first touch. A negative smaller root with a
//! non-positive constant term means the spheres already overlap, which is
//! reported as an impact at `t = 0`.

use crate::body::{Body, BodyHandle};
use crate::collision::contact::{Contact, Intersection};
use crate::shape::{Shape, Sphere};
use crate::types::{constants, normalize_or, Vec3};

/// Where and when two swept spheres first touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereHit {
    pub time_of_impact: f64,
    /// Surface point on A at the time of impact.
    pub point_on_a: Vec3,
    /// Surface point on B at the time of impact.
    pub point_on_b: Vec3,
    /// Unit normal from A's center toward B's center at the time of impact.
    pub normal: Vec3,
    /// Surface distance at the time of impact; negative when overlapping.
    pub separation: f64,
}

/// Parametric hits of a ray against a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Entry parameter, negative when the ray starts inside the sphere.
    pub near: f64,
    pub far: f64,
}

/// Predict the contact between two bodies within the next `dt` seconds.
///
/// Dispatches on the shape pair. The returned contact describes the bodies
/// advanced to the time of impact along their current motion.
pub fn intersect(
    handle_a: BodyHandle,
    a: &Body,
    handle_b: BodyHandle,
    b: &Body,
    dt: f64,
) -> Intersection {
    let hit = match (&a.shape, &b.shape) {
        (Shape::Sphere(sphere_a), Shape::Sphere(sphere_b)) => sphere_sphere_dynamic(
            sphere_a,
            sphere_b,
            &a.position,
            &b.position,
            &a.linear_velocity,
            &b.linear_velocity,
            dt,
        ),
    };

    let Some(hit) = hit else {
        return Intersection::NoContact;
    };

    // Local points are taken in the poses the bodies will have at impact, so
    // they map back to the right world points once the scene gets there.
    let mut a_at_hit = a.clone();
    let mut b_at_hit = b.clone();
    a_at_hit.update(hit.time_of_impact);
    b_at_hit.update(hit.time_of_impact);

    Intersection::Contact(Contact {
        body_a: handle_a,
        body_b: handle_b,
        point_on_a: hit.point_on_a,
        point_on_b: hit.point_on_b,
        local_point_a: a_at_hit.world_to_body(&hit.point_on_a),
        local_point_b: b_at_hit.world_to_body(&hit.point_on_b),
        normal: hit.normal,
        separation: hit.separation,
        time_of_impact: hit.time_of_impact,
    })
}

/// Solve for the first time in `[0, dt]` at which two moving spheres touch.
///
/// Returns `None` when they never come within `r_a + r_b` of each other in
/// the frame.
pub fn sphere_sphere_dynamic(
    sphere_a: &Sphere,
    sphere_b: &Sphere,
    pos_a: &Vec3,
    pos_b: &Vec3,
    vel_a: &Vec3,
    vel_b: &Vec3,
    dt: f64,
) -> Option<SphereHit> {
    let rel_pos = pos_b - pos_a;
    let rel_vel = vel_b - vel_a;
    let combined_radius = sphere_a.radius + sphere_b.radius;

    let a = rel_vel.dot(&rel_vel);
    let b = 2.0 * rel_pos.dot(&rel_vel);
    let c = rel_pos.dot(&rel_pos) - combined_radius * combined_radius;

    let time_of_impact = if a < constants::EPSILON {
        // No relative motion: only a static overlap counts
        if c > 0.0 {
            return None;
        }
        0.0
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let t0 = (-b - root) / (2.0 * a);
        let t1 = (-b + root) / (2.0 * a);

        if t1 < 0.0 {
            // Closest approach is already behind us
            return None;
        }
        if t0 > dt {
            return None;
        }
        // t0 < 0 <= t1 only happens when the spheres start overlapped
        t0.max(0.0)
    };

    if !(0.0..=dt).contains(&time_of_impact) {
        return None;
    }

    let center_a = pos_a + vel_a * time_of_impact;
    let center_b = pos_b + vel_b * time_of_impact;
    let between = center_b - center_a;
    let normal = normalize_or(between, Vec3::z());

    Some(SphereHit {
        time_of_impact,
        point_on_a: center_a + normal * sphere_a.radius,
        point_on_b: center_b - normal * sphere_b.radius,
        normal,
        separation: between.norm() - combined_radius,
    })
}

/// Intersect a ray with a static sphere.
///
/// `ray_dir` need not be normalized; the parameters are in multiples of it.
/// Returns `None` when the line misses the sphere entirely.
pub fn ray_sphere(ray_start: &Vec3, ray_dir: &Vec3, center: &Vec3, radius: f64) -> Option<RayHit> {
    let m = center - ray_start;
    let a = ray_dir.dot(ray_dir);
    if a < constants::EPSILON {
        return None;
    }
    let b = m.dot(ray_dir);
    let c = m.dot(&m) - radius * radius;

    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    Some(RayHit {
        near: (b - root) / a,
        far: (b + root) / a,
    })
}

// =============================================================================
// Tests
// =============================================================================
