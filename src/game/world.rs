// The simulated world: player, zombies, spawns and navigation for one map
//
// Per tick: install finished asset loads, apply player input, run every
// zombie's controller, then let each character integrate, update its state
// and advance its animation.

use super::characters::{
    CharacterStats, Damageable, Decision, Player, PlayerInput, Steerable, Zombie,
};
use super::events::{EntityId, EventQueue, GameEvent};
use super::map::MapData;
use super::spawning::{SpawnManager, SpawnStats};
use crate::config::GameSettings;
use crate::engine::assets::{AnimationCache, PresetHandle};
use crate::engine::navigation::{NavError, WalkabilityGrid};
use crate::engine::physics::ObstacleMap;
use glam::Vec2;
use std::sync::Arc;

pub struct World {
    settings: GameSettings,
    map: MapData,
    obstacles: ObstacleMap,
    grid: WalkabilityGrid,
    player: Player,
    zombies: Vec<Zombie>,
    zombie_preset: PresetHandle,
    spawner: SpawnManager,
    events: EventQueue,
    input: PlayerInput,
    rng: fastrand::Rng,
    cache: Option<Arc<AnimationCache>>,
    clock: f32,
    next_id: EntityId,
}

impl World {
    /// Build the world for `map`
    ///
    /// Fails only when the walkability grid cannot be built; nothing may
    /// tick without one.
    pub fn new(
        settings: GameSettings,
        map: MapData,
        player_preset: PresetHandle,
        zombie_preset: PresetHandle,
        seed: u64,
    ) -> Result<Self, NavError> {
        let obstacles = map.obstacle_map();
        let grid = build_grid(&settings, &map, &obstacles)?;

        let events = EventQueue::new();
        let player = Player::new(
            settings.player,
            player_preset,
            &settings,
            map.player_start(),
            events.clone(),
        );

        let mut spawner = SpawnManager::new(&settings, map.bounds(), seed);
        spawner.setup_for_map(&map, &obstacles);

        log::info!(
            "World ready: {}x{} map, grid {}x{}",
            map.width,
            map.height,
            grid.cols(),
            grid.rows()
        );

        Ok(Self {
            settings,
            map,
            obstacles,
            grid,
            player,
            zombies: Vec::new(),
            zombie_preset,
            spawner,
            events,
            input: PlayerInput::default(),
            // Offset so AI randomness does not mirror spawn randomness
            rng: fastrand::Rng::with_seed(seed.wrapping_add(1)),
            cache: None,
            clock: 0.0,
            next_id: Player::ID + 1,
        })
    }

    /// Poll this cache for finished loads at the start of every tick
    pub fn attach_cache(&mut self, cache: Arc<AnimationCache>) {
        self.cache = Some(cache);
    }

    /// Switch to another map; enemies are dropped and the player respawns
    pub fn load_map(&mut self, map: MapData) -> Result<(), NavError> {
        let obstacles = map.obstacle_map();
        self.grid = build_grid(&self.settings, &map, &obstacles)?;
        self.spawner.setup_for_map(&map, &obstacles);
        self.obstacles = obstacles;
        self.map = map;
        self.reset();
        Ok(())
    }

    /// Remove every zombie and put the player back at the start
    pub fn reset(&mut self) {
        self.zombies.clear();
        self.player.respawn(self.map.player_start());
        self.input = PlayerInput::default();
        self.spawner.setup_for_map(&self.map, &self.obstacles);
        self.events.clear();
        self.clock = 0.0;
        log::info!("World reset");
    }

    pub fn set_player_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    /// Advance the whole world by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if let Some(cache) = &self.cache {
            let installed = cache.poll();
            if installed > 0 {
                log::debug!("Installed {} animation configs", installed);
            }
        }

        self.clock += dt;
        self.player.control(&self.input, dt);

        let player_position = self.player.position();
        for zombie in &mut self.zombies {
            let decision = zombie.think(dt, player_position, &self.grid, &mut self.rng);

            // Damage lands once, when the attack state is entered, and only on
            // a living player
            if decision == (Decision::Attack { triggered: true }) && !self.player.is_dead() {
                let damage = zombie.damage();
                let remaining_health = self.player.take_damage(damage);
                self.events.push(GameEvent::AttackLanded {
                    attacker: zombie.id(),
                    target: Player::ID,
                    damage,
                    remaining_health,
                });
            }
        }

        self.player.finish_tick(dt);
        for zombie in &mut self.zombies {
            zombie.finish_tick(dt);
        }
    }

    /// Spawn up to `count` zombies at selected spawn points
    pub fn spawn_wave(&mut self, count: usize) -> Vec<EntityId> {
        let batch = self.spawner.select_spawns(count, self.clock);

        self.events.push(GameEvent::SpawnSelected {
            requested: count,
            positions: batch.positions.clone(),
            from_spawn_points: batch.from_spawn_points,
        });

        let ids: Vec<EntityId> = batch
            .positions
            .iter()
            .map(|&position| self.spawn_at(position))
            .collect();
        log::info!("Spawned {} of {} zombies", ids.len(), count);
        ids
    }

    /// Spawn a single zombie at `position`
    pub fn spawn_at(&mut self, position: Vec2) -> EntityId {
        self.spawn_with_stats(position, self.settings.zombie)
    }

    pub fn spawn_with_stats(&mut self, position: Vec2, stats: CharacterStats) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.zombies.push(Zombie::new(
            id,
            stats,
            self.zombie_preset.clone(),
            &self.settings,
            position,
            self.events.clone(),
        ));
        id
    }

    /// Drop dead zombies; returns how many were removed
    pub fn remove_dead(&mut self) -> usize {
        let before = self.zombies.len();
        self.zombies.retain(|zombie| !zombie.is_dead());
        before - self.zombies.len()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn zombies(&self) -> &[Zombie] {
        &self.zombies
    }

    pub fn zombie(&self, id: EntityId) -> Option<&Zombie> {
        self.zombies.iter().find(|zombie| zombie.id() == id)
    }

    pub fn zombie_mut(&mut self, id: EntityId) -> Option<&mut Zombie> {
        self.zombies.iter_mut().find(|zombie| zombie.id() == id)
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Game time in seconds since the world was built or reset
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn grid(&self) -> &WalkabilityGrid {
        &self.grid
    }

    pub fn map(&self) -> &MapData {
        &self.map
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn spawn_stats(&self) -> SpawnStats {
        self.spawner.stats()
    }
}

fn build_grid(
    settings: &GameSettings,
    map: &MapData,
    obstacles: &ObstacleMap,
) -> Result<WalkabilityGrid, NavError> {
    let agent = Vec2::new(settings.zombie.width, settings.zombie.height);
    WalkabilityGrid::build(map.bounds(), settings.grid_cell_size, agent, obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::{AnimationClip, AssetLoader, ClipSet, StubFrames, ZOMBIE_CONFIG};
    use crate::game::characters::{Animatable, EntityState, HasBody};
    use crate::game::events::DEFAULT_EVENT_CAPACITY;
    use std::io::Write;
    use std::time::{Duration, Instant};

    const DT: f32 = 1.0 / 60.0;

    fn zombie_preset() -> PresetHandle {
        PresetHandle::ready(
            "Army_zombie",
            ClipSet::new()
                .with_clip(AnimationClip::movement("Walk", 4))
                .with_clip(AnimationClip::action("Attack", 3))
                .with_clip(AnimationClip::action("Death", 5)),
        )
    }

    fn player_preset() -> PresetHandle {
        PresetHandle::ready(
            "Man",
            ClipSet::new()
                .with_clip(AnimationClip::movement("Walk_gun", 4))
                .with_clip(AnimationClip::action("Gun_Shot", 2))
                .with_clip(AnimationClip::action("Death", 3)),
        )
    }

    fn world(map: MapData) -> World {
        World::new(GameSettings::default(), map, player_preset(), zombie_preset(), 42).unwrap()
    }

    #[test]
    fn test_zombie_closes_in_and_attacks() {
        let map = MapData::new(2000.0, 2000.0).with_player_start(Vec2::new(1000.0, 0.0));
        let mut world = world(map);
        let zombie_id = world.spawn_at(Vec2::ZERO);

        let mut saw_pursuit = false;
        let mut attacked = false;
        for _ in 0..60 * 30 {
            let zombie = world.zombie(zombie_id).unwrap();
            let to_zombie = zombie.position() - world.player().position();

            // Walk towards the zombie until well inside its detection range
            let direction = if to_zombie.length() > 250.0 { to_zombie } else { Vec2::ZERO };
            world.set_player_input(PlayerInput {
                direction,
                ..Default::default()
            });
            world.tick(DT);

            let zombie = world.zombie(zombie_id).unwrap();
            let distance = zombie.position().distance(world.player().position());
            if distance <= 300.0
                && zombie.state() == EntityState::Walking
                && zombie.navigator().has_path()
            {
                saw_pursuit = true;
            }
            if zombie.state() == EntityState::Attacking {
                attacked = true;
                break;
            }
        }

        assert!(saw_pursuit, "zombie never pursued along a path");
        assert!(attacked, "zombie never reached the player");
        assert_eq!(world.player().health(), 90.0);

        // Keep the fight going; every trigger costs exactly one hit
        for _ in 0..120 {
            world.tick(DT);
        }

        let events = world.events().drain();
        let triggers = events
            .iter()
            .filter(|e| {
                matches!(e, GameEvent::StateChanged { entity, to: EntityState::Attacking, .. } if *entity == zombie_id)
            })
            .count();
        let hits = events
            .iter()
            .filter(|e| matches!(e, GameEvent::AttackLanded { .. }))
            .count();

        assert!(triggers >= 2);
        assert_eq!(hits, triggers);
        assert_eq!(world.player().health(), 100.0 - 10.0 * triggers as f32);
    }

    #[test]
    fn test_no_hits_on_a_dead_player() {
        let map = MapData::new(1000.0, 1000.0).with_player_start(Vec2::new(500.0, 500.0));
        let mut world = world(map);
        assert!(world.player_mut().die());
        world.spawn_at(Vec2::new(520.0, 500.0));

        for _ in 0..60 {
            world.tick(DT);
        }

        let events = world.events().drain();
        assert!(events.iter().any(|e| {
            matches!(e, GameEvent::StateChanged { to: EntityState::Attacking, .. })
        }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::AttackLanded { .. })));
        assert_eq!(world.player().health(), 100.0);
    }

    #[test]
    fn test_undrained_events_stay_bounded() {
        let map = MapData::new(2000.0, 2000.0).with_player_start(Vec2::new(1000.0, 1000.0));
        let mut world = world(map);
        let harmless = CharacterStats {
            damage: 0.0,
            ..CharacterStats::zombie()
        };
        for i in 0..20 {
            let angle = i as f32 * std::f32::consts::TAU / 20.0;
            let offset = Vec2::new(angle.cos(), angle.sin()) * 200.0;
            world.spawn_with_stats(Vec2::new(1000.0, 1000.0) + offset, harmless);
        }

        // A minute of pursuit and attacks with nobody reading the events
        for _ in 0..60 * 60 {
            world.tick(DT);
            assert!(world.events().len() <= DEFAULT_EVENT_CAPACITY);
        }

        assert!(!world.player().is_dead());
        assert_eq!(world.events().len(), DEFAULT_EVENT_CAPACITY);
        assert!(world.events().dropped() > 0);
    }

    #[test]
    fn test_spawn_wave_uses_spawn_points() {
        let mut world = world(MapData::arena());
        assert_eq!(world.spawn_stats().valid_points, 5);

        let ids = world.spawn_wave(5);
        assert_eq!(ids.len(), 5);
        assert_eq!(world.zombies().len(), 5);
        assert_eq!(world.spawn_stats().total_usage, 5);

        let spawned = world.events().drain().into_iter().any(|e| {
            matches!(e, GameEvent::SpawnSelected { requested: 5, from_spawn_points: true, .. })
        });
        assert!(spawned);
    }

    #[test]
    fn test_spawn_wave_without_points_is_random() {
        let mut world = world(MapData::new(800.0, 600.0));
        let ids = world.spawn_wave(3);
        assert_eq!(ids.len(), 3);
        for zombie in world.zombies() {
            assert!(world.map().bounds().contains(zombie.position()));
        }
    }

    #[test]
    fn test_reset_clears_enemies() {
        let mut world = world(MapData::arena());
        world.spawn_wave(3);
        world.player_mut().take_damage(40.0);
        world.tick(DT);

        world.reset();
        assert!(world.zombies().is_empty());
        assert_eq!(world.player().health(), 100.0);
        assert_eq!(world.player().position(), world.map().player_start());
        assert_eq!(world.clock(), 0.0);
    }

    #[test]
    fn test_remove_dead() {
        let mut world = world(MapData::arena());
        let ids = world.spawn_wave(2);
        world.zombie_mut(ids[0]).unwrap().take_damage(1000.0);
        assert_eq!(world.remove_dead(), 1);
        assert!(world.zombie(ids[0]).is_none());
    }

    #[test]
    fn test_missing_grid_is_fatal() {
        let map = MapData::new(0.0, 500.0);
        let err = World::new(GameSettings::default(), map, player_preset(), zombie_preset(), 1);
        assert!(matches!(err, Err(NavError::GridMissing(_))));

        let settings = GameSettings {
            grid_cell_size: 0.0,
            ..Default::default()
        };
        let err = World::new(settings, MapData::arena(), player_preset(), zombie_preset(), 1);
        assert!(matches!(err, Err(NavError::InvalidCellSize(_))));
    }

    #[test]
    fn test_clip_appears_after_background_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("zombies.json")).unwrap();
        file.write_all(ZOMBIE_CONFIG.as_bytes()).unwrap();

        let cache = Arc::new(
            AnimationCache::init(AssetLoader::new(dir.path()), Arc::new(StubFrames::default()))
                .unwrap(),
        );
        let preset = cache.lookup_or_load("zombies.json", "Army_zombie");

        let mut world =
            World::new(GameSettings::default(), MapData::arena(), player_preset(), preset, 9).unwrap();
        world.attach_cache(Arc::clone(&cache));
        let id = world.spawn_at(Vec2::new(300.0, 300.0));

        let deadline = Instant::now() + Duration::from_secs(5);
        while world.zombie(id).unwrap().body().animator().current_clip_name().is_none()
            && Instant::now() < deadline
        {
            world.tick(DT);
            std::thread::sleep(Duration::from_millis(1));
        }

        let zombie = world.zombie(id).unwrap();
        assert_eq!(zombie.body().animator().current_clip_name(), Some("Walk"));
        assert!(zombie.frame_data().is_some());
    }
}
