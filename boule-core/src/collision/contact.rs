//! Contact records produced by the narrowphase.

use std::cmp::Ordering;

use crate::body::BodyHandle;
use crate::types::Vec3;

/// One predicted touch between two bodies within the current frame.
///
/// Points and normal describe the bodies at the moment of impact, not at the
/// start of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// World-space point on A's surface at the time of impact.
    pub point_on_a: Vec3,
    /// World-space point on B's surface at the time of impact.
    pub point_on_b: Vec3,
    /// `point_on_a` in A's body space at the time of impact.
    pub local_point_a: Vec3,
    /// `point_on_b` in B's body space at the time of impact.
    pub local_point_b: Vec3,
    /// Unit normal pointing from A toward B.
    pub normal: Vec3,
    /// Signed surface distance at the time of impact; negative when the
    /// bodies were already overlapping at the start of the frame.
    pub separation: f64,
    /// Seconds from the start of the frame, in `[0, dt]`.
    pub time_of_impact: f64,
}

/// Narrowphase outcome for one candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    NoContact,
    Contact(Contact),
}

impl Intersection {
    pub fn is_contact(&self) -> bool {
        matches!(self, Intersection::Contact(_))
    }

    pub fn into_contact(self) -> Option<Contact> {
        match self {
            Intersection::Contact(contact) => Some(contact),
            Intersection::NoContact => None,
        }
    }
}

/// Order contacts by ascending time of impact.
///
/// Use with a stable sort so contacts with equal times keep their
/// narrowphase order.
pub fn compare_contacts(a: &Contact, b: &Contact) -> Ordering {
    a.time_of_impact.total_cmp(&b.time_of_impact)
}

// =============================================================================
// Tests
// =============================================================================
