//! Headless world simulation: walks an observer across the terrain, digs,
//! builds, and reports what the generation worker published.
//!
//! Usage: cargo run --release --bin simulate_world -- [OPTIONS]
//!
//! Options:
//!   --seed <SEED>       Master seed in [0, 1) (default: random)
//!   --seconds <S>       Simulated time (default: 20)
//!   --distance <N>      View distance in chunks (default: 3)
//!   --config <PATH>     WorldConfig JSON file
//!   --load <PATH>       Resume from a save file (.json or .lz4)
//!   --save <PATH>       Write a save file when done

use std::path::PathBuf;
use std::time::{Duration, Instant};

use voxterra::core::{Result, Vec3, VoxelCoord, WorldConfig};
use voxterra::physics::{Mode, MovementInput};
use voxterra::terrain::VoxelType;
use voxterra::world::World;

const TICK: f32 = 1.0 / 60.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => WorldConfig::load(&PathBuf::from(path))?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = parse_f64_arg(&args, "--seed") {
        config.seed = Some(seed);
    }
    if let Some(distance) = parse_i32_arg(&args, "--distance") {
        config.view_distance = distance;
    }
    let seconds = parse_f32_arg(&args, "--seconds").unwrap_or(20.0);

    let mut world = World::new(config)?;
    if let Some(path) = parse_str_arg(&args, "--load") {
        world.load(&PathBuf::from(path))?;
    }

    println!("=== voxterra world simulation ===");
    println!("Seed:     {}", world.seed());
    println!("Window:   {} columns wide", world.config().window_width());
    println!("Duration: {}s", seconds);
    println!();

    let start = Instant::now();
    if !world.wait_for_generation(Duration::from_secs(30)) {
        log::warn!("Initial window not ready after 30s");
    }
    print_window(&world);

    let forward = MovementInput { forward: true, ..Default::default() };
    let ticks = (seconds / TICK) as usize;
    let mut broken = 0;
    let mut placed = 0;

    for tick in 0..ticks {
        world.tick(&forward, TICK)?;

        // Hop every two seconds to clear small steps
        if tick % 120 == 0 && world.observer().flags().down {
            world.observer_mut().press_jump();
        }

        // Dig the block underfoot, then build a pillar beside the path
        if tick % 300 == 150 && world.break_target(Vec3::NEG_Y).is_some() {
            broken += 1;
        }
        if tick % 300 == 200 {
            let selected = (tick / 300) % 7;
            world.hotbar_mut().select(selected);
            let pos = world.observer().position();
            let base = VoxelCoord::new(pos.x.round() as i32, pos.y.round() as i32 - 1, pos.z.round() as i32 + 2);
            if world.place_voxel(base, world.hotbar().selected_type()) {
                placed += 1;
            }
        }

        for event in world.drain_events() {
            log::debug!("Edit event: {:?} ({})", event, event.voxel_type());
        }
    }

    world.observer_mut().toggle_flight();
    if world.observer().mode() == Mode::Flying {
        world.observer_mut().press_jump();
        for _ in 0..60 {
            world.tick(&MovementInput::default(), TICK)?;
        }
        world.observer_mut().release_jump();
    }

    world.wait_for_generation(Duration::from_secs(30));
    let pos = world.observer().position();
    println!();
    println!("Observer: ({:.2}, {:.2}, {:.2}) {:?}", pos.x, pos.y, pos.z, world.observer().mode());
    println!("Edits:    {} broken, {} placed, {} log entries", broken, placed, world.overrides().len());
    print_window(&world);
    println!("Elapsed:  {:.2}s wall clock", start.elapsed().as_secs_f64());

    if let Some(path) = parse_str_arg(&args, "--save") {
        world.save(&PathBuf::from(path))?;
    }
    Ok(())
}

fn print_window(world: &World) {
    let Some(window) = world.published() else {
        println!("No window published yet");
        return;
    };
    println!(
        "Window v{} around ({}, {}): {} instances, {} indexed voxels, {} dropped",
        window.version,
        window.center.x,
        window.center.z,
        window.instance_counts().iter().sum::<usize>(),
        window.index_map.len(),
        window.dropped
    );
    for ty in VoxelType::ALL {
        let buffer = window.buffers.get(ty);
        if buffer.count() > 0 {
            println!("  {:<8} {:>7} ({} visible)", ty.name(), buffer.count(), buffer.visible_count());
        }
    }
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_f64_arg(args: &[String], flag: &str) -> Option<f64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_i32_arg(args: &[String], flag: &str) -> Option<i32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
