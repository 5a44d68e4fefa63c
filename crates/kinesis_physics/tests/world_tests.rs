//! Integration tests for kinesis_physics

use approx::assert_relative_eq;
use glam::Vec3;
use kinesis_physics::prelude::*;

const H: f32 = 1.0 / 60.0;

fn world_with(config: PhysicsConfig) -> PhysicsWorld {
    PhysicsWorld::new(config).expect("valid config")
}

fn sphere_at(world: &mut PhysicsWorld, mass: f32, y: f32) -> BodyHandle {
    world
        .create_body(BodyDesc::dynamic(mass, Shape::sphere(0.5).unwrap()).with_position(0.0, y, 0.0))
        .expect("valid body")
}

/// Drop a sphere on the ground and return (impact speed, rebound speed)
fn drop_and_measure(contact: ContactMaterial) -> (f32, f32) {
    let mut world = world_with(PhysicsConfig::default());
    let concrete = world.define_material("concrete");
    let plastic = world.define_material("plastic");
    world.define_contact(concrete, plastic, contact).unwrap();

    world
        .create_body(BodyDesc::fixed(Shape::plane()).with_material(concrete))
        .unwrap();
    let ball = world
        .create_body(
            BodyDesc::dynamic(1.0, Shape::sphere(0.5).unwrap())
                .with_material(plastic)
                .with_position(0.0, 3.0, 0.0),
        )
        .unwrap();

    let mut previous = 0.0_f32;
    for _ in 0..240 {
        world.step();
        let vy = world.linear_velocity(ball).unwrap().y;
        if previous < -1.0 && vy > previous + 1.0 {
            return (-previous, vy.max(0.0));
        }
        previous = vy;
    }
    panic!("sphere never reached the ground");
}

#[test]
fn test_static_bodies_never_move() {
    let mut world = world_with(PhysicsConfig::default());
    let ground = world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
    let pedestal = world
        .create_body(BodyDesc::fixed(Shape::cuboid(1.0, 0.5, 1.0).unwrap()).with_position(0.0, 0.5, 0.0))
        .unwrap();
    let ball = sphere_at(&mut world, 2.0, 4.0);

    let ground_before = world.pose(ground).unwrap();
    let pedestal_before = world.pose(pedestal).unwrap();

    world.apply_impulse(pedestal, Vec3::new(50.0, 0.0, 0.0), Vec3::ZERO).unwrap();
    for _ in 0..180 {
        world.step();
    }

    assert_eq!(world.pose(ground).unwrap(), ground_before);
    assert_eq!(world.pose(pedestal).unwrap(), pedestal_before);
    assert_eq!(world.body_state(pedestal), BodyState::Awake);
    // The ball landed on the pedestal rather than falling through it.
    assert!(world.position(ball).unwrap().y > 1.0);
}

#[test]
fn test_free_fall_velocity() {
    let mut world = world_with(PhysicsConfig::default().with_timestep(H));
    let ball = sphere_at(&mut world, 1.0, 100.0);

    let steps = 30;
    world.step_n(steps);

    let expected = steps as f32 * H * -9.82;
    let v = world.linear_velocity(ball).unwrap();
    assert_relative_eq!(v.y, expected, max_relative = 1e-3);
    assert_relative_eq!(v.x, 0.0);
    assert_relative_eq!(v.z, 0.0);
}

#[test]
fn test_split_frame_delta_gives_identical_state() {
    let run = |deltas: &[f64]| {
        let mut world = world_with(PhysicsConfig::default());
        let mut clock = SimClock::from_config(world.config());
        world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
        let ball = sphere_at(&mut world, 1.0, 2.0);
        for delta in deltas {
            let steps = clock.advance(*delta);
            world.step_n(steps);
        }
        (world.stats().steps_taken, world.pose(ball).unwrap())
    };

    let h = f64::from(H);
    let whole = run(&[2.0 * h; 20]);
    let split = run(&[h; 40]);

    assert_eq!(whole.0, 40);
    assert_eq!(whole, split);
}

#[test]
fn test_split_f64_frame_times_give_identical_state() {
    let run = |deltas: &[f64]| {
        let mut world = world_with(PhysicsConfig::default());
        let mut clock = SimClock::from_config(world.config());
        world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
        let ball = sphere_at(&mut world, 1.0, 2.0);
        for delta in deltas {
            world.step_n(clock.advance(*delta));
        }
        (world.stats().steps_taken, world.pose(ball).unwrap())
    };

    // What a host measuring time in f64 actually reports.
    let h = 1.0_f64 / 60.0;
    let whole = run(&[2.0 * h; 20]);
    let split = run(&[h; 40]);

    assert_eq!(whole.0, 40);
    assert_eq!(whole, split);
}

#[test]
fn test_long_frame_is_capped() {
    let mut world = world_with(PhysicsConfig::default().with_max_substeps(3));
    let mut clock = SimClock::from_config(world.config());
    sphere_at(&mut world, 1.0, 10.0);

    let steps = clock.advance(1.0);
    world.step_n(steps);

    assert_eq!(steps, 3);
    assert_eq!(world.stats().steps_taken, 3);
    assert!(clock.accumulated() < f64::from(H));
}

#[test]
fn test_sleep_then_wake_on_impulse() {
    let config = PhysicsConfig::default()
        .with_gravity(0.0, 0.0, 0.0)
        .with_sleep_thresholds(0.1, 0.1, 0.1);
    let mut world = world_with(config);
    let ball = sphere_at(&mut world, 2.0, 0.0);

    for _ in 0..120 {
        world.step();
    }
    assert_eq!(world.body_state(ball), BodyState::Asleep);
    assert_eq!(world.awake_body_count(), 0);

    world.apply_impulse(ball, Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO).unwrap();

    assert_eq!(world.body_state(ball), BodyState::Awake);
    let v = world.linear_velocity(ball).unwrap();
    assert_relative_eq!(v.x, 2.0, epsilon = 1e-5);
}

#[test]
fn test_sleeping_body_wakes_on_contact() {
    let mut world = world_with(PhysicsConfig::default());
    world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
    let resting = sphere_at(&mut world, 1.0, 0.5);

    world.step_n(150);
    assert_eq!(world.body_state(resting), BodyState::Asleep);

    // Falls 1m before it reaches the resting sphere.
    let falling = sphere_at(&mut world, 1.0, 2.5);
    world.step_n(10);
    assert_eq!(world.body_state(resting), BodyState::Asleep);
    assert_eq!(world.body_state(falling), BodyState::Awake);

    let mut woke = false;
    for _ in 0..60 {
        world.step();
        if world.body_state(resting) == BodyState::Awake {
            woke = true;
            break;
        }
    }
    assert!(woke, "resting sphere slept through the impact");
}

#[test]
fn test_sleeping_disabled_keeps_bodies_awake() {
    let config = PhysicsConfig::default()
        .with_gravity(0.0, 0.0, 0.0)
        .with_sleeping(false);
    let mut world = world_with(config);
    let ball = sphere_at(&mut world, 1.0, 0.0);

    for _ in 0..300 {
        world.step();
    }
    assert_eq!(world.body_state(ball), BodyState::Awake);
}

#[test]
fn test_bounce_follows_restitution() {
    let (impact, rebound) = drop_and_measure(ContactMaterial::new(0.1, 0.7));
    let ratio = rebound / impact;
    assert!(impact > 5.0, "impact speed {}", impact);
    assert!(
        (0.55..=0.85).contains(&ratio),
        "rebound ratio {} (impact {}, rebound {})",
        ratio,
        impact,
        rebound
    );
}

#[test]
fn test_drop_descends_until_first_contact() {
    let mut world = world_with(PhysicsConfig::default());
    let ground = world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
    let ball = sphere_at(&mut world, 1.0, 3.0);

    let mut previous = world.position(ball).unwrap().y;
    for step in 0..120 {
        world.step();
        let events = world.drain_collision_events();
        if !events.is_empty() {
            assert!(events.iter().all(|e| e.other(ball) == Some(ground)));
            assert!(step > 0);
            return;
        }
        let y = world.position(ball).unwrap().y;
        assert!(y < previous, "step {}: y went from {} to {}", step, previous, y);
        previous = y;
    }
    panic!("sphere never reached the ground");
}

#[test]
fn test_material_pairing_changes_outcome() {
    let (impact, rebound) = drop_and_measure(ContactMaterial::new(0.1, 0.0));
    assert!(rebound / impact < 0.2, "dead contact rebounded {} of {}", rebound, impact);
}

#[test]
fn test_collision_event_reports_impact_speed() {
    let mut world = world_with(PhysicsConfig::default());
    let ground = world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
    let ball = sphere_at(&mut world, 1.0, 3.0);

    let mut events = Vec::new();
    for _ in 0..120 {
        world.step();
        events.extend(world.drain_collision_events());
        if !events.is_empty() {
            break;
        }
    }

    let event = events.first().expect("no collision event");
    assert_eq!(event.other(ball), Some(ground));
    // Fell 2.5m: roughly sqrt(2 * 9.82 * 2.5) = 7 m/s.
    assert!(event.impact_speed > 5.0 && event.impact_speed < 9.0, "{}", event.impact_speed);
}

#[test]
fn test_flat_landing_reports_every_contact_point() {
    let mut world = world_with(PhysicsConfig::default());
    let ground = world.create_body(BodyDesc::fixed(Shape::plane())).unwrap();
    let crate_box = world
        .create_body(
            BodyDesc::dynamic(1.0, Shape::cuboid(0.5, 0.5, 0.5).unwrap()).with_position(0.0, 2.0, 0.0),
        )
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..120 {
        world.step();
        events.extend(world.drain_collision_events());
        if !events.is_empty() {
            break;
        }
    }

    // One event per corner of the bottom face, all at the same speed.
    assert_eq!(events.len(), 4, "{:?}", events);
    let first = events[0].impact_speed;
    // Fell 1.5m: roughly sqrt(2 * 9.82 * 1.5) = 5.4 m/s.
    assert!(first > 4.0 && first < 7.0, "{}", first);
    for event in &events {
        assert_eq!(event.other(crate_box), Some(ground));
        assert_relative_eq!(event.impact_speed, first, epsilon = 1e-3);
    }
}

#[test]
fn test_removal_invalidates_handle() {
    let mut world = world_with(PhysicsConfig::default());
    let a = sphere_at(&mut world, 1.0, 0.0);
    let b = sphere_at(&mut world, 1.0, 5.0);

    world.remove_body(a).unwrap();

    assert_eq!(world.linear_velocity(a), Err(PhysicsError::InvalidHandle(a)));
    assert_eq!(world.set_linear_velocity(a, Vec3::X), Err(PhysicsError::InvalidHandle(a)));
    assert_eq!(world.body_count(), 1);
    assert!(world.contains(b));

    // A body created after the removal never aliases the old handle.
    let c = sphere_at(&mut world, 1.0, 2.0);
    assert_ne!(a, c);
    assert!(!world.contains(a));
}
