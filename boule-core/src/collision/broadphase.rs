//! One-axis sweep and prune.
//!
//! Every body's swept bounds are projected onto a single diagonal axis and
//! the resulting intervals are sorted. Two bodies become a candidate pair
//! when their intervals overlap on that axis.
//!
//! This is a deliberately loose filter. Any pair whose true 3D bounds overlap
//! also overlaps on the axis, so nothing is missed, but pairs that are far
//! apart on the other two axes get through as well. The narrowphase decides.
//!
//! ```text
//!  axis ──────────────────────────────────────────▶
//!        [A──────────]
//!              [B─────────]         [D───]
//!                   [C──]
//!  pairs: (A,B) (A,C) (B,C)
//! ```

use std::cmp::Ordering;

use crate::body::{Body, BodyHandle};
use crate::types::{constants, Vec3};

/// Candidate pair, stored with the lower handle first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    pub a: BodyHandle,
    pub b: BodyHandle,
}

impl CollisionPair {
    pub fn new(x: BodyHandle, y: BodyHandle) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }
}

/// One end of a body's projected interval.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    body: BodyHandle,
    value: f64,
    is_min: bool,
}

fn compare_endpoints(a: &Endpoint, b: &Endpoint) -> Ordering {
    a.value
        .total_cmp(&b.value)
        // Opening an interval before closing another at the same value keeps
        // touching intervals paired.
        .then_with(|| b.is_min.cmp(&a.is_min))
        .then_with(|| a.body.cmp(&b.body))
}

/// Sweep-and-prune broadphase with a reusable endpoint buffer.
#[derive(Debug, Clone)]
pub struct SweepAndPrune {
    axis: Vec3,
    margin: f64,
    endpoints: Vec<Endpoint>,
}

impl Default for SweepAndPrune {
    fn default() -> Self {
        Self::new(constants::BROADPHASE_MARGIN)
    }
}

impl SweepAndPrune {
    /// Sweep along the normalized (1, 1, 1) diagonal, padding every swept box
    /// by `margin`.
    pub fn new(margin: f64) -> Self {
        Self {
            axis: Vec3::repeat(1.0).normalize(),
            margin,
            endpoints: Vec::new(),
        }
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Replace the contents of `pairs` with every candidate pair for a frame
    /// of `dt` seconds. Handles are positions in `bodies`.
    pub fn find_pairs(&mut self, bodies: &[Body], dt: f64, pairs: &mut Vec<CollisionPair>) {
        pairs.clear();
        self.sort_endpoints(bodies, dt);
        self.build_pairs(pairs);
    }

    fn sort_endpoints(&mut self, bodies: &[Body], dt: f64) {
        self.endpoints.clear();
        self.endpoints.reserve(bodies.len() * 2);

        for (index, body) in bodies.iter().enumerate() {
            let handle = BodyHandle(index as u32);
            let bounds = body.swept_bounds(dt, self.margin);
            self.endpoints.push(Endpoint {
                body: handle,
                value: self.axis.dot(&bounds.mins),
                is_min: true,
            });
            self.endpoints.push(Endpoint {
                body: handle,
                value: self.axis.dot(&bounds.maxs),
                is_min: false,
            });
        }

        self.endpoints.sort_by(compare_endpoints);
    }

    fn build_pairs(&self, pairs: &mut Vec<CollisionPair>) {
        for (i, a) in self.endpoints.iter().enumerate() {
            if !a.is_min {
                continue;
            }
            for b in &self.endpoints[i + 1..] {
                // Reaching A's own max closes its window
                if b.body == a.body {
                    break;
                }
                if b.is_min {
                    pairs.push(CollisionPair::new(a.body, b.body));
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
