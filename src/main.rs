use anyhow::{Context, Result};
use glam::Vec2;
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use zombie_run::config::GameSettings;
use zombie_run::engine::assets::{AnimationCache, AssetLoader, ImageFrameSource};
use zombie_run::engine::game_loop::GameLoop;
use zombie_run::game::characters::{Damageable, HasBody, PlayerInput, Steerable};
use zombie_run::game::{GameEvent, MapData, World};

const PLAYER_CONFIG: &str = "animation_config/players_config.json";
const ZOMBIE_CONFIG: &str = "animation_config/zombies_config.json";
const PLAYER_PRESET: &str = "Man";
const ZOMBIE_PRESET: &str = "Army_zombie";

/// Length of the headless run in simulated seconds
const RUN_SECONDS: f32 = 20.0;
/// Host frame length handed to the fixed-step loop
const HOST_FRAME: Duration = Duration::from_millis(33);
const WAVE_INTERVAL: f32 = 5.0;
const WAVE_SIZE: usize = 4;

/// zombie-run [settings.json] [map.json] [assets dir]
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting zombie-run (headless)...");

    let mut args = std::env::args().skip(1);
    let settings_path = PathBuf::from(args.next().unwrap_or_else(|| "settings.json".to_string()));
    let map_path = args.next().map(PathBuf::from);
    let assets_dir = PathBuf::from(args.next().unwrap_or_else(|| "resources".to_string()));

    let settings = GameSettings::load_or_default(&settings_path)
        .with_context(|| format!("Invalid settings {}", settings_path.display()))?;

    let map = match &map_path {
        Some(path) => MapData::load(path)?,
        None => {
            info!("No map given, using the built-in arena");
            MapData::arena()
        }
    };

    let loader = AssetLoader::new(&assets_dir);
    let frames = Arc::new(ImageFrameSource::new(loader.clone()));
    let cache = Arc::new(AnimationCache::init(loader, frames)?);
    let player_preset = cache.lookup_or_load(PLAYER_CONFIG, PLAYER_PRESET);
    let zombie_preset = cache.lookup_or_load(ZOMBIE_CONFIG, ZOMBIE_PRESET);

    let mut world = World::new(settings, map, player_preset, zombie_preset, seed())?;
    world.attach_cache(Arc::clone(&cache));

    run(&mut world);

    let player = world.player();
    info!(
        "Finished: player health {:.0}/{:.0}, {} zombies, spawn stats {:?}",
        player.health(),
        player.body().max_health(),
        world.zombies().len(),
        world.spawn_stats()
    );

    drop(world);
    match Arc::try_unwrap(cache) {
        Ok(cache) => cache.teardown(),
        Err(_) => debug!("Animation cache still shared, dropping"),
    }

    info!("Shutting down...");
    Ok(())
}

/// Simulate a player circling the arena while waves of zombies arrive
fn run(world: &mut World) {
    let mut game_loop = GameLoop::new();
    let dt = game_loop.fixed_timestep();
    let center = world.map().bounds().center();
    let mut next_wave = 0.0;

    while game_loop.elapsed_secs() < RUN_SECONDS {
        let steps = game_loop.advance(HOST_FRAME);

        for _ in 0..steps {
            if world.clock() >= next_wave {
                world.spawn_wave(WAVE_SIZE);
                next_wave += WAVE_INTERVAL;
            }

            let player = world.player().position();
            let nearest = world
                .zombies()
                .iter()
                .map(|zombie| zombie.position())
                .min_by(|a, b| a.distance(player).total_cmp(&b.distance(player)));

            // Orbit the centre, aim at the closest zombie
            let radial = player - center;
            let direction = Vec2::new(-radial.y, radial.x).normalize_or_zero();
            world.set_player_input(PlayerInput {
                direction,
                aim: nearest,
                attack: nearest.map_or(false, |z| z.distance(player) < 120.0),
            });

            world.tick(dt);
        }

        for event in world.events().drain() {
            log_event(&event);
        }

        if world.player().is_dead() {
            info!("Player died at t={:.1}s", world.clock());
            break;
        }
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::AttackLanded {
            attacker,
            damage,
            remaining_health,
            ..
        } => info!(
            "Zombie {} hit the player for {} ({} left)",
            attacker, damage, remaining_health
        ),
        GameEvent::SpawnSelected {
            requested,
            positions,
            from_spawn_points,
        } => info!(
            "Spawn batch: {}/{} placed (spawn points: {})",
            positions.len(),
            requested,
            from_spawn_points
        ),
        other => debug!("{:?}", other),
    }
}

/// Seed from the clock so every run plays differently
fn seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
