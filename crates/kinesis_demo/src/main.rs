//! Kinesis headless demo
//!
//! Drops a bouncy sphere and a stack of boxes onto a ground plane, drives the
//! simulation with jittery frame times the way a browser's animation loop
//! would, turns hard impacts into "sounds" in the log, and fires one scripted
//! click at the sphere.
//!
//! Run with: cargo run -p kinesis_demo
//!       or: cargo run --bin kinesis-demo -- path/to/kinesis.toml

mod config;

use config::DemoConfig;
use glam::Vec3;
use kinesis_scene::prelude::*;

/// Everything the demo spawned
struct DemoScene {
    ground: BodyHandle,
    sphere: BodyHandle,
    boxes: Vec<BodyHandle>,
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    println!();
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║                 KINESIS PHYSICS DEMO v0.1.0               ║");
    println!("║                                                           ║");
    println!("║  Fixed steps, synced proxies, click to push.              ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    if let Err(err) = run() {
        log::error!("Demo failed: {}", err);
        std::process::exit(1);
    }
}

fn run() -> kinesis_scene::Result<()> {
    let config = DemoConfig::load()?;
    config.print_summary();

    let mut sim = SimContext::new(config.sim.clone())?;
    sim.set_camera(
        PerspectiveCamera::new(60.0, 16.0 / 9.0)
            .with_position(Vec3::new(0.0, 4.0, 12.0))
            .look_at(Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
    );

    let mut host = ProxyScene::new();
    let demo = build_scene(&mut sim, &mut host, &config)?;
    log::info!(
        "Scene ready: {} bodies, {} proxies",
        sim.world().body_count(),
        host.len()
    );

    let script = &config.script;
    let mut sounds = 0usize;
    for frame in 0..script.frames {
        if frame == script.click_frame {
            aim_at(&mut sim, demo.sphere)?;
        }

        let report = sim.advance(frame_delta(frame, script.frame_time, script.jitter), &mut host);

        if let Some(pick) = &report.pick {
            log::info!(
                "Frame {}: clicked body {:?} at {:.2} m, impulse {:?}",
                frame,
                pick.body,
                pick.hit.distance,
                pick.impulse
            );
        }
        if let Some(err) = &report.pick_error {
            log::warn!("Frame {}: click failed: {}", frame, err);
        }
        for event in loudest_per_pair(&report.events) {
            if event.impact_speed >= script.impact_threshold {
                sounds += 1;
                log::info!(
                    "Frame {}: ♪ impact {:?} / {:?} at {:.2} m/s (volume {:.2})",
                    frame,
                    event.body_a,
                    event.body_b,
                    event.impact_speed,
                    (event.impact_speed / 10.0).min(1.0)
                );
            }
        }
        if !report.sync.is_clean() {
            log::warn!("Frame {}: {} stale bindings", frame, report.sync.stale.len());
        }
    }

    print_final_state(&sim, &host, &demo, sounds);
    sim.teardown();
    Ok(())
}

/// Ground plane, a bouncy sphere, and a box stack off to the side
fn build_scene(
    sim: &mut SimContext,
    host: &mut ProxyScene,
    config: &DemoConfig,
) -> kinesis_scene::Result<DemoScene> {
    let world = sim.world_mut();
    let ground_material = world.define_material("ground");
    let rubber = world.define_material("rubber");
    let wood = world.define_material("wood");
    world.define_contact(
        ground_material,
        rubber,
        ContactMaterial::new(0.4, config.script.sphere_restitution),
    )?;
    world.define_contact(ground_material, wood, ContactMaterial::wood())?;
    world.define_contact(wood, wood, ContactMaterial::wood())?;
    world.define_contact(rubber, wood, ContactMaterial::new(0.5, 0.4))?;

    // The ground's proxy is a thin slab for display only.
    let ground_proxy = host.insert(
        VisualProxy::cuboid(Vec3::new(20.0, 0.01, 20.0))
            .with_position(Vec3::new(0.0, -0.01, 0.0))
            .with_pickable(false),
    );
    let ground = sim.world_mut().create_body(
        BodyDesc::fixed(Shape::plane()).with_material(ground_material),
    )?;

    let sphere_proxy = host.insert(VisualProxy::sphere(0.5));
    let sphere = sim.spawn(
        BodyDesc::dynamic(1.0, Shape::sphere(0.5)?)
            .with_material(rubber)
            .with_position(0.0, 4.0, 0.0),
        sphere_proxy,
    )?;

    let half = Vec3::splat(0.4);
    let mut boxes = Vec::with_capacity(config.script.box_count as usize);
    for level in 0..config.script.box_count {
        let proxy = host.insert(VisualProxy::cuboid(half));
        let y = half.y + level as f32 * (2.0 * half.y + 0.02);
        let body = sim.spawn(
            BodyDesc::dynamic(0.5, Shape::from_size(half * 2.0)?)
                .with_material(wood)
                .with_position(3.0, y, 0.0),
            proxy,
        )?;
        boxes.push(body);
    }

    log::debug!("Ground proxy {:?} left unbound", ground_proxy);
    Ok(DemoScene {
        ground,
        sphere,
        boxes,
    })
}

/// Deterministic frame time wobble in `[1 - jitter, 1 + jitter] * frame_time`
fn frame_delta(frame: u32, frame_time: f64, jitter: f64) -> f64 {
    let wobble = (frame as f64 * 1.37).sin() * (frame as f64 * 0.23).cos();
    (frame_time * (1.0 + jitter * wobble)).max(0.0)
}

/// A box landing flat touches at four points at once; play it as one sound
fn loudest_per_pair(events: &[CollisionEvent]) -> Vec<CollisionEvent> {
    let mut loudest: Vec<CollisionEvent> = Vec::new();
    for event in events {
        match loudest
            .iter_mut()
            .find(|e| e.body_a == event.body_a && e.body_b == event.body_b)
        {
            Some(existing) if existing.impact_speed < event.impact_speed => *existing = *event,
            Some(_) => {}
            None => loudest.push(*event),
        }
    }
    loudest
}

/// Move the pointer over a body's current position and queue a click
fn aim_at(sim: &mut SimContext, body: BodyHandle) -> kinesis_scene::Result<()> {
    let position = sim.world().position(body)?;
    match sim.camera().project(position) {
        Some(ndc) => {
            sim.pointer_moved_ndc(ndc);
            sim.click();
            log::info!("Clicking at NDC ({:.3}, {:.3})", ndc.x, ndc.y);
        }
        None => log::warn!("Body {:?} is behind the camera, skipping click", body),
    }
    Ok(())
}

fn print_final_state(sim: &SimContext, host: &ProxyScene, demo: &DemoScene, sounds: usize) {
    let world = sim.world();
    let stats = world.stats();

    println!();
    println!("Simulated {:.3}s in {} steps over {} frames", sim.clock().simulated_time(), stats.steps_taken, sim.frame());
    println!("Dropped {:.3}s of wall time, {} impact sounds", sim.clock().dropped_time(), sounds);
    println!("Discarded contacts: {}, restored bodies: {}", stats.discarded_contacts, stats.restored_bodies);
    println!();

    let named = std::iter::once(("ground", demo.ground))
        .chain(std::iter::once(("sphere", demo.sphere)))
        .chain(demo.boxes.iter().map(|b| ("box", *b)));
    for (name, body) in named {
        let Ok(pose) = world.pose(body) else {
            println!("{:<8} {:?} removed", name, body);
            continue;
        };
        let velocity = world.linear_velocity(body).unwrap_or(Vec3::ZERO);
        let proxy = sim
            .bindings()
            .proxy_for(body)
            .and_then(|p| host.get(p).ok())
            .map(|p| p.transform.position);
        println!(
            "{:<8} pos ({:>7.3}, {:>7.3}, {:>7.3})  vel {:>6.3} m/s  {:?}  proxy {}",
            name,
            pose.position.x,
            pose.position.y,
            pose.position.z,
            velocity.length(),
            world.body_state(body),
            match proxy {
                Some(p) if p == pose.position => "in sync".to_string(),
                Some(p) => format!("at {:?}", p),
                None => "unbound".to_string(),
            }
        );
    }
}
