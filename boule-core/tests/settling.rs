//! End-to-end runs of the frame pipeline.

use boule_core::config::SceneConfig;
use boule_core::forces::GravityModel;
use boule_core::{BodyDesc, BodyHandle, Scene, Vec3};

const DT: f64 = 1.0 / 60.0;

fn center_distance(scene: &Scene, a: BodyHandle, b: BodyHandle) -> f64 {
    let a = scene.body(a).unwrap();
    let b = scene.body(b).unwrap();
    (a.position - b.position).norm()
}

#[test]
fn test_ball_settles_on_earth_without_tunneling() {
    let mut scene = Scene::petanque().unwrap();
    let ball = BodyHandle(0);
    let earth = BodyHandle(1);
    let mut bounced = false;

    for _ in 0..600 {
        scene.step(DT);
        scene.commit_pending_spawns();

        let distance = center_distance(&scene, ball, earth);
        assert!(distance >= 1001.0 - 1e-6, "ball sank into earth: {}", distance);
        bounced |= !scene.last_report().contacts.is_empty();
    }

    assert!(bounced, "ball never touched the earth");
    let distance = center_distance(&scene, ball, earth);
    assert!((distance - 1001.0).abs() < 1e-6, "distance {}", distance);
    let speed = scene.body(ball).unwrap().speed();
    assert!(speed < 1e-3, "ball still moving at {}", speed);
    assert!(scene.last_report().is_settled(1e-3));
    assert!(scene.last_report().kinetic_energy < 1e-6);
    assert_eq!(scene.body(earth).unwrap().position, Vec3::new(0.0, 0.0, -1000.0));
}

#[test]
fn test_slices_sum_to_frame_time() {
    // Weightless row of balls falling onto one fixed sphere
    let mut bodies = Vec::new();
    for i in 0..5 {
        bodies.push(
            BodyDesc::sphere(0.5)
                .with_position(Vec3::new(i as f64 * 1.5, 0.0, 0.0))
                .with_linear_velocity(Vec3::new(0.0, 0.0, -8.0 - i as f64)),
        );
    }
    bodies.push(
        BodyDesc::sphere(100.0)
            .with_position(Vec3::new(3.0, 0.0, -101.0))
            .fixed(),
    );
    let mut scene = Scene::new(SceneConfig {
        gravity: GravityModel::None,
        bodies,
        ..SceneConfig::default()
    })
    .unwrap();

    let mut contacts_seen = 0;
    for _ in 0..30 {
        scene.step(DT);
        let report = scene.last_report();
        contacts_seen += report.contacts.len();
        assert!(
            (report.integrated_time - DT).abs() < 1e-12,
            "integrated {} of {}",
            report.integrated_time,
            DT
        );
        let times: Vec<f64> = report.contacts.iter().map(|c| c.time_of_impact).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]), "unsorted: {:?}", times);
        assert!(times.iter().all(|t| (0.0..=DT).contains(t)));
    }
    assert!(contacts_seen >= 5, "expected every ball to hit the wall");
}

#[test]
fn test_constant_velocity_without_contacts() {
    let velocity = Vec3::new(1.0, -2.0, 0.5);
    let mut scene = Scene::new(SceneConfig {
        gravity: GravityModel::None,
        bodies: vec![BodyDesc::sphere(1.0).with_linear_velocity(velocity)],
        ..SceneConfig::default()
    })
    .unwrap();

    for _ in 0..120 {
        scene.step(DT);
    }

    let expected = velocity * (120.0 * DT);
    let position = scene.body(BodyHandle(0)).unwrap().position;
    assert!((position - expected).norm() < 1e-9, "at {:?}", position);
}

#[test]
fn test_head_on_balls_never_pass_through() {
    let mut scene = Scene::new(SceneConfig {
        gravity: GravityModel::None,
        bodies: vec![
            BodyDesc::sphere(0.2)
                .with_position(Vec3::new(-5.0, 0.0, 0.0))
                .with_linear_velocity(Vec3::new(400.0, 0.0, 0.0))
                .with_restitution(1.0),
            BodyDesc::sphere(0.2)
                .with_position(Vec3::new(5.0, 0.0, 0.0))
                .with_linear_velocity(Vec3::new(-400.0, 0.0, 0.0))
                .with_restitution(1.0),
        ],
        ..SceneConfig::default()
    })
    .unwrap();

    // One frame covers 800 units of relative travel
    scene.step(1.0);

    let a = scene.body(BodyHandle(0)).unwrap();
    let b = scene.body(BodyHandle(1)).unwrap();
    assert_eq!(scene.last_report().contacts.len(), 1);
    assert!(a.position.x < b.position.x, "a={} b={}", a.position.x, b.position.x);
    assert!(a.linear_velocity.x < 0.0 && b.linear_velocity.x > 0.0);
}

#[test]
fn test_spawned_ball_lands_without_sinking() {
    let mut scene = Scene::petanque().unwrap();
    let thrown = scene
        .spawn_ball(Vec3::new(0.0, -15.0, 3.0), Vec3::new(0.0, -30.0, 1.0), 1.0)
        .unwrap();
    scene.commit_pending_spawns();

    let mut landed = false;
    for _ in 0..1200 {
        scene.step(DT);
        scene.commit_pending_spawns();
        let earth_distance = center_distance(&scene, thrown, BodyHandle(1));
        assert!(earth_distance >= 1001.0 - 1e-6, "thrown ball sank: {}", earth_distance);
        landed |= scene.last_report().contacts.iter().any(|c| c.involves(thrown));
    }

    assert!(landed, "thrown ball never landed");
    assert_eq!(scene.body_count(), 3);
}

#[test]
fn test_preset_scene_runs() {
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../presets");
    let config = boule_core::PresetLoader::new(path).load_scene("orbit").unwrap();
    let mut scene = Scene::new(config).unwrap();
    let before = center_distance(&scene, BodyHandle(1), BodyHandle(0));

    for _ in 0..60 {
        scene.step(DT);
    }

    // Radial gravity pulls the moon inward
    let after = center_distance(&scene, BodyHandle(1), BodyHandle(0));
    assert!(after < before, "before {} after {}", before, after);
    assert!(after >= 21.0 - 1e-6);
}
