//! The scene: every body plus the per-frame pipeline that moves them.
//!
//! ## Frame Pipeline
//!
//! ```text
//! step(dt)
//!   │
//!   ├─ gravity + damping        (impulses on movable bodies)
//!   ├─ broadphase               (sweep and prune → candidate pairs)
//!   ├─ narrowphase              (time of impact → contacts)
//!   ├─ sort contacts by TOI
//!   ├─ for each contact:
//!   │     advance all bodies to its TOI, then resolve it
//!   └─ advance all bodies through the rest of the frame
//! ```
//!
//! Every slice advances the whole scene, so the slices of one frame always
//! add up to `dt`.
//!
//! Balls launched during play wait in a pending queue and only join the live
//! set when the driver calls [`Scene::commit_pending_spawns`] after a step.

use log::{debug, info, trace, warn};

use crate::body::{Body, BodyDesc, BodyHandle};
use crate::collision::broadphase::{CollisionPair, SweepAndPrune};
use crate::collision::contact::{compare_contacts, Contact, Intersection};
use crate::collision::narrowphase::{intersect, ray_sphere};
use crate::collision::resolution::{ContactResolver, Resolution};
use crate::config::SceneConfig;
use crate::error::{BodyError, ConfigError};
use crate::events::{ContactEvent, StepReport};
use crate::forces::{apply_external, Damping};
use crate::integrator::SemiImplicitEuler;
use crate::types::Vec3;

/// A live simulation.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    initial: Vec<Body>,
    bodies: Vec<Body>,
    pending: Vec<Body>,
    broadphase: SweepAndPrune,
    resolver: ContactResolver,
    damping: Damping,
    pairs: Vec<CollisionPair>,
    contacts: Vec<Contact>,
    frame: u64,
    report: StepReport,
}

impl Scene {
    /// Validate `config` and build its bodies.
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let initial = config
            .bodies
            .iter()
            .map(|desc| desc.clone().build())
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "scene '{}' initialized with {} bodies",
            config.name,
            initial.len()
        );

        Ok(Self {
            broadphase: SweepAndPrune::new(config.broadphase_margin),
            resolver: config.resolver(),
            damping: config.damping(),
            bodies: initial.clone(),
            initial,
            pending: Vec::new(),
            pairs: Vec::new(),
            contacts: Vec::new(),
            frame: 0,
            report: StepReport::default(),
            config,
        })
    }

    /// The built-in pétanque scene.
    pub fn petanque() -> Result<Self, ConfigError> {
        Self::new(SceneConfig::petanque())
    }

    /// Drop every body and pending spawn and rebuild the preset bodies.
    pub fn reset(&mut self) {
        self.bodies.clone_from(&self.initial);
        self.pending.clear();
        self.pairs.clear();
        self.contacts.clear();
        self.frame = 0;
        self.report = StepReport::default();
        info!("scene '{}' reset", self.config.name);
    }

    // -------------------------------------------------------------------------
    // Stepping
    // -------------------------------------------------------------------------

    /// Advance the scene by `dt` seconds.
    ///
    /// A negative or non-finite `dt` is ignored with a warning.
    pub fn step(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            warn!("ignoring step with invalid dt {}", dt);
            return;
        }
        self.frame += 1;

        apply_external(&self.config.gravity, &self.damping, &mut self.bodies, dt);

        self.broadphase.find_pairs(&self.bodies, dt, &mut self.pairs);

        self.contacts.clear();
        for pair in &self.pairs {
            let a = &self.bodies[pair.a.index()];
            let b = &self.bodies[pair.b.index()];
            if a.has_infinite_mass() && b.has_infinite_mass() {
                continue;
            }
            if let Intersection::Contact(contact) = intersect(pair.a, a, pair.b, b, dt) {
                self.contacts.push(contact);
            }
        }

        // Stable: equal times keep narrowphase order
        self.contacts.sort_by(compare_contacts);

        let mut events = Vec::with_capacity(self.contacts.len());
        let mut accumulated = 0.0;
        let mut integrated = 0.0;
        for contact in &self.contacts {
            integrated +=
                SemiImplicitEuler::advance_all(&mut self.bodies, contact.time_of_impact - accumulated);

            if let Resolution::Applied { normal_impulse, .. } =
                self.resolver.resolve_in(&mut self.bodies, contact)
            {
                events.push(ContactEvent {
                    body_a: contact.body_a,
                    body_b: contact.body_b,
                    time_of_impact: contact.time_of_impact,
                    normal_impulse,
                });
            }
            accumulated = contact.time_of_impact;
        }

        let remainder = dt - accumulated;
        if remainder > 0.0 {
            integrated += SemiImplicitEuler::advance_all(&mut self.bodies, remainder);
        }

        let movable = || self.bodies.iter().filter(|body| !body.has_infinite_mass());
        let max_speed = movable().map(Body::speed).fold(0.0, f64::max);
        let kinetic_energy: f64 = movable().map(Body::kinetic_energy).sum();

        debug!(
            "frame {}: {} pairs, {} contacts, {} resolved, integrated {:.6}s",
            self.frame,
            self.pairs.len(),
            self.contacts.len(),
            events.len(),
            integrated
        );

        self.report = StepReport {
            frame: self.frame,
            dt,
            integrated_time: integrated,
            contacts: events,
            max_speed,
            kinetic_energy,
        };
    }

    /// Summary of the most recent valid step.
    pub fn last_report(&self) -> &StepReport {
        &self.report
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    /// Queue a ball launched from `origin` toward `aim`.
    ///
    /// The ball is not live until [`Scene::commit_pending_spawns`]; the
    /// returned handle is the one it will have then.
    pub fn spawn_ball(
        &mut self,
        origin: Vec3,
        aim: Vec3,
        strength: f64,
    ) -> Result<BodyHandle, BodyError> {
        let body = self.config.spawn.ball(origin, aim, strength)?.build()?;
        let handle = self.next_handle();
        trace!("queued ball {:?} at {:?}", handle, origin);
        self.pending.push(body);
        Ok(handle)
    }

    /// Move queued spawns into the live set and return how many joined.
    pub fn commit_pending_spawns(&mut self) -> usize {
        let count = self.pending.len();
        if count > 0 {
            self.bodies.append(&mut self.pending);
            debug!("committed {} spawned bodies", count);
        }
        count
    }

    /// Insert a body into the live set between frames.
    ///
    /// Pending spawns are committed first so their promised handles hold.
    pub fn add_body(&mut self, desc: BodyDesc) -> Result<BodyHandle, BodyError> {
        let body = desc.build()?;
        self.commit_pending_spawns();
        let handle = self.next_handle();
        self.bodies.push(body);
        Ok(handle)
    }

    fn next_handle(&self) -> BodyHandle {
        BodyHandle((self.bodies.len() + self.pending.len()) as u32)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.index())
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> {
        (0..self.bodies.len() as u32).map(BodyHandle)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Nearest live body hit by the ray, with the ray parameter of the hit.
    ///
    /// A ray starting inside a body hits it at parameter 0.
    pub fn ray_cast(&self, start: &Vec3, dir: &Vec3) -> Option<(BodyHandle, f64)> {
        let mut best: Option<(BodyHandle, f64)> = None;
        for (index, body) in self.bodies.iter().enumerate() {
            let Some(sphere) = body.shape.as_sphere() else {
                continue;
            };
            let Some(hit) = ray_sphere(start, dir, &body.center_of_mass_world(), sphere.radius)
            else {
                continue;
            };
            let t = if hit.near >= 0.0 {
                hit.near
            } else if hit.far >= 0.0 {
                0.0
            } else {
                continue;
            };
            if best.map_or(true, |(_, best_t)| t < best_t) {
                best = Some((BodyHandle(index as u32), t));
            }
        }
        best
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::GravityModel;

    fn weightless(bodies: Vec<BodyDesc>) -> Scene {
        Scene::new(SceneConfig {
            gravity: GravityModel::None,
            bodies,
            ..SceneConfig::default()
        })
        .unwrap()
    }

    fn earth() -> BodyDesc {
        BodyDesc::sphere(1000.0)
            .with_position(Vec3::new(0.0, 0.0, -1000.0))
            .fixed()
    }

    #[test]
    fn test_petanque_initial_state() {
        let scene = Scene::petanque().unwrap();
        assert_eq!(scene.body_count(), 2);
        assert_eq!(scene.frame(), 0);
        assert_eq!(scene.body(BodyHandle(0)).unwrap().position.z, 10.0);
        assert!(scene.body(BodyHandle(1)).unwrap().has_infinite_mass());
        assert!(scene.body(BodyHandle(2)).is_none());
        assert_eq!(scene.handles().collect::<Vec<_>>(), vec![BodyHandle(0), BodyHandle(1)]);
    }

    #[test]
    fn test_free_fall_step() {
        let mut scene = Scene::petanque().unwrap();
        scene.step(0.1);

        let ball = scene.body(BodyHandle(0)).unwrap();
        assert!((ball.linear_velocity.z + 1.0).abs() < 1e-12);
        // Velocity updated before position
        assert!((ball.position.z - 9.9).abs() < 1e-12);
        assert_eq!(scene.body(BodyHandle(1)).unwrap().position.z, -1000.0);

        let report = scene.last_report();
        assert_eq!(report.frame, 1);
        assert!(report.contacts.is_empty());
        assert!((report.integrated_time - 0.1).abs() < 1e-15);
        assert!((report.max_speed - 1.0).abs() < 1e-12);
        // Unit mass at unit speed; the fixed earth does not count
        assert!((report.kinetic_energy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut scene = Scene::petanque().unwrap();
        let before = scene.bodies().to_vec();

        scene.step(f64::NAN);
        scene.step(-0.1);
        scene.step(f64::INFINITY);

        assert_eq!(scene.bodies(), &before[..]);
        assert_eq!(scene.frame(), 0);
    }

    #[test]
    fn test_zero_dt_only_separates_overlap() {
        let mut scene = Scene::new(SceneConfig {
            bodies: vec![
                BodyDesc::sphere(1.0).with_position(Vec3::new(0.0, 0.0, 0.8)),
                earth(),
            ],
            ..SceneConfig::default()
        })
        .unwrap();

        scene.step(0.0);

        let report = scene.last_report();
        assert_eq!(report.frame, 1);
        assert_eq!(report.integrated_time, 0.0);
        assert!(report.contacts.is_empty(), "at rest, nothing to bounce");
        let ball = scene.body(BodyHandle(0)).unwrap();
        assert!((ball.position.z - 1.0).abs() < 1e-9, "z = {}", ball.position.z);
        assert_eq!(ball.linear_velocity, Vec3::zeros());

        // Touching now, so a second empty frame changes nothing
        let before = scene.bodies().to_vec();
        scene.step(0.0);
        assert_eq!(scene.frame(), 2);
        assert!((scene.bodies()[0].position - before[0].position).norm() < 1e-12);
        assert_eq!(scene.bodies()[0].linear_velocity, Vec3::zeros());
    }

    #[test]
    fn test_contact_within_frame_bounces() {
        let mut scene = weightless(vec![
            BodyDesc::sphere(1.0)
                .with_position(Vec3::new(0.0, 0.0, 1.05))
                .with_linear_velocity(Vec3::new(0.0, 0.0, -3.0)),
            earth(),
        ]);

        scene.step(0.1);

        let report = scene.last_report();
        assert_eq!(report.contacts.len(), 1);
        let event = report.contacts[0];
        assert_eq!((event.body_a, event.body_b), (BodyHandle(0), BodyHandle(1)));
        assert!((event.time_of_impact - 0.05 / 3.0).abs() < 1e-9);
        assert!((report.integrated_time - 0.1).abs() < 1e-12);

        let ball = scene.body(BodyHandle(0)).unwrap();
        // Restitution 0.5 with the default min rule
        assert!((ball.linear_velocity.z - 1.5).abs() < 1e-9);
        let expected_z = 1.0 + 1.5 * (0.1 - 0.05 / 3.0);
        assert!((ball.position.z - expected_z).abs() < 1e-9, "z = {}", ball.position.z);
    }

    #[test]
    fn test_contacts_resolved_in_time_order() {
        let mut scene = weightless(vec![
            BodyDesc::sphere(1.0)
                .with_position(Vec3::new(5.0, 0.0, 1.6))
                .with_linear_velocity(Vec3::new(0.0, 0.0, -2.0)),
            BodyDesc::sphere(1.0)
                .with_position(Vec3::new(0.0, 0.0, 1.2))
                .with_linear_velocity(Vec3::new(0.0, 0.0, -2.0)),
            earth(),
        ]);

        scene.step(0.5);

        let times: Vec<f64> = scene
            .last_report()
            .contacts
            .iter()
            .map(|event| event.time_of_impact)
            .collect();
        assert_eq!(times.len(), 2);
        assert!(times[0] < times[1]);
        assert!((times[0] - 0.1).abs() < 1e-6, "{:?}", times);
        assert_eq!(scene.last_report().contacts[0].body_a, BodyHandle(1));
        assert!((scene.last_report().integrated_time - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_immovable_pairs_are_ignored() {
        let mut scene = weightless(vec![
            BodyDesc::sphere(1.0).fixed(),
            BodyDesc::sphere(1.0)
                .with_position(Vec3::new(1.0, 0.0, 0.0))
                .fixed(),
        ]);
        scene.step(0.1);
        assert!(scene.last_report().contacts.is_empty());
        assert_eq!(scene.body(BodyHandle(1)).unwrap().position.x, 1.0);
    }

    #[test]
    fn test_spawn_waits_for_commit() {
        let mut scene = Scene::petanque().unwrap();

        let first = scene
            .spawn_ball(Vec3::new(0.0, -20.0, 5.0), Vec3::new(0.0, 0.0, 1.0), 1.0)
            .unwrap();
        let second = scene
            .spawn_ball(Vec3::new(5.0, -20.0, 5.0), Vec3::new(5.0, 0.0, 1.0), 3.0)
            .unwrap();
        assert_eq!(first, BodyHandle(2));
        assert_eq!(second, BodyHandle(3));
        assert_eq!(scene.pending_count(), 2);

        scene.step(1.0 / 60.0);
        assert!(scene.body(first).is_none(), "spawn went live mid-frame");

        assert_eq!(scene.commit_pending_spawns(), 2);
        assert_eq!(scene.pending_count(), 0);
        assert_eq!(scene.commit_pending_spawns(), 0);

        let ball = scene.body(first).unwrap();
        assert_eq!(ball.position, Vec3::new(0.0, -20.0, 5.0));
        let launched = scene.body(second).unwrap();
        // Strength 3.0 clamps to 2.0
        assert!((launched.speed() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_spawn_rejects_degenerate_aim() {
        let mut scene = Scene::petanque().unwrap();
        let origin = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(
            scene.spawn_ball(origin, origin, 1.0),
            Err(BodyError::DegenerateAim)
        );
        assert_eq!(scene.pending_count(), 0);
    }

    #[test]
    fn test_add_body_keeps_pending_handles() {
        let mut scene = Scene::petanque().unwrap();
        let spawned = scene
            .spawn_ball(Vec3::new(0.0, 0.0, 50.0), Vec3::new(1.0, 0.0, 50.0), 1.0)
            .unwrap();
        let added = scene
            .add_body(BodyDesc::sphere(0.5).with_position(Vec3::new(0.0, 9.0, 3.0)))
            .unwrap();

        assert_eq!(spawned, BodyHandle(2));
        assert_eq!(added, BodyHandle(3));
        assert_eq!(scene.body(spawned).unwrap().position.z, 50.0);
        assert_eq!(scene.body(added).unwrap().position.y, 9.0);

        assert!(scene.add_body(BodyDesc::sphere(0.0)).is_err());
        assert_eq!(scene.body_count(), 4);
    }

    #[test]
    fn test_reset_restores_preset() {
        let mut scene = Scene::petanque().unwrap();
        scene
            .spawn_ball(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 5.0), 1.0)
            .unwrap();
        scene.commit_pending_spawns();
        scene
            .spawn_ball(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 5.0), 1.0)
            .unwrap();
        for _ in 0..10 {
            scene.step(1.0 / 60.0);
        }

        scene.reset();

        assert_eq!(scene.body_count(), 2);
        assert_eq!(scene.pending_count(), 0);
        assert_eq!(scene.frame(), 0);
        assert_eq!(scene.body(BodyHandle(0)).unwrap().position.z, 10.0);
        assert_eq!(scene.last_report(), &StepReport::default());
    }

    #[test]
    fn test_ray_cast_picks_nearest() {
        let scene = Scene::petanque().unwrap();
        let down = Vec3::new(0.0, 0.0, -1.0);

        let (handle, t) = scene.ray_cast(&Vec3::new(0.0, 0.0, 20.0), &down).unwrap();
        assert_eq!(handle, BodyHandle(0));
        assert!((t - 9.0).abs() < 1e-9);

        let (handle, _) = scene.ray_cast(&Vec3::new(5.0, 0.0, 20.0), &down).unwrap();
        assert_eq!(handle, BodyHandle(1));

        assert!(scene.ray_cast(&Vec3::new(0.0, 0.0, 20.0), &Vec3::z()).is_none());

        let (handle, t) = scene.ray_cast(&Vec3::new(0.0, 0.0, 10.0), &Vec3::x()).unwrap();
        assert_eq!((handle, t), (BodyHandle(0), 0.0));
    }
}
