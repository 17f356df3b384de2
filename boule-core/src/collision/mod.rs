//! Continuous collision detection and response between spheres.
//!
//! A frame goes through three stages:
//!
//! - **Broadphase**: project every body's swept bounds onto one axis and
//!   keep the pairs whose intervals overlap.
//! - **Narrowphase**: solve for the earliest time in the frame at which each
//!   candidate pair touches, producing a [`Contact`].
//! - **Resolution**: apply impulses to the contacts in time-of-impact order.
//!
//! ## Why swept tests
//!
//! Checking for overlap only at the end of a frame lets fast balls pass
//! straight through each other. Solving for the time of impact along the
//! frame's motion catches the touch wherever it happens:
//!
//! ```text
//! t=0                          t=dt
//!  ●─────────────▶   ◀─────────●
//!                 ●●
//!          first touch at t=toi
//! ```

pub mod broadphase;
pub mod contact;
pub mod narrowphase;
pub mod resolution;

pub use broadphase::{CollisionPair, SweepAndPrune};
pub use contact::{compare_contacts, Contact, Intersection};
pub use narrowphase::{intersect, ray_sphere, sphere_sphere_dynamic, RayHit, SphereHit};
pub use resolution::{pair_mut, CombineRule, ContactResolver, Resolution};
