//! Axis-aligned bounding boxes.

use crate::types::Vec3;

/// An axis-aligned box with `mins <= maxs` on every axis.
///
/// There is no empty state: a box always contains at least one point, so
/// every constructor and every expansion keeps the invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub mins: Vec3,
    pub maxs: Vec3,
}

impl Bounds {
    /// A degenerate box around a single point.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            mins: point,
            maxs: point,
        }
    }

    /// The smallest box containing both corners, in any order.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            mins: a.inf(&b),
            maxs: a.sup(&b),
        }
    }

    /// Grow the box to include `point`.
    pub fn expand_point(&mut self, point: Vec3) {
        self.mins = self.mins.inf(&point);
        self.maxs = self.maxs.sup(&point);
    }

    /// Grow the box to include `other`.
    pub fn expand_bounds(&mut self, other: &Bounds) {
        self.expand_point(other.mins);
        self.expand_point(other.maxs);
    }

    /// Copy of this box grown by `margin` on all six faces.
    pub fn padded(&self, margin: f64) -> Self {
        let pad = Vec3::repeat(margin.max(0.0));
        Self {
            mins: self.mins - pad,
            maxs: self.maxs + pad,
        }
    }

    /// Copy of this box grown to cover a translation of `delta` in both
    /// directions.
    ///
    /// Sweeping both ways keeps the result a superset of the one-sided sweep
    /// whatever sign the motion has relative to the sort axis.
    pub fn swept(&self, delta: Vec3) -> Self {
        let mut out = *self;
        out.expand_point(self.mins + delta);
        out.expand_point(self.maxs + delta);
        out.expand_point(self.mins - delta);
        out.expand_point(self.maxs - delta);
        out
    }

    /// True when the two boxes overlap or touch on all three axes.
    pub fn intersects(&self, other: &Bounds) -> bool {
        if self.maxs.x < other.mins.x || self.maxs.y < other.mins.y || self.maxs.z < other.mins.z {
            return false;
        }
        if other.maxs.x < self.mins.x || other.maxs.y < self.mins.y || other.maxs.z < self.mins.z {
            return false;
        }
        true
    }

    pub fn contains(&self, point: &Vec3) -> bool {
        (0..3).all(|i| point[i] >= self.mins[i] && point[i] <= self.maxs[i])
    }

    pub fn center(&self) -> Vec3 {
        (self.mins + self.maxs) * 0.5
    }

    /// Full edge lengths along each axis.
    pub fn extents(&self) -> Vec3 {
        self.maxs - self.mins
    }
}

// =============================================================================
// Tests
// =============================================================================
