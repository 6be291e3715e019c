//! Headless demo level
//!
//! A turret at the bottom of the screen shoots at drones drifting down from
//! the top. Drones arrive in waves, one [`DroneWaveStage`] per wave. Shooting
//! a drone down scores points; a drone that escapes past the bottom edge
//! costs the player a life. A [`ConsoleHud`] follows the fight purely through
//! delegates.

use lightyears_core::actors::Projectile;
use lightyears_core::core::{Delegate, HealthChange, HealthComponent, PlayerStats};
use lightyears_core::math::{radians_to_degrees, Vec2};
use lightyears_core::render::Texture;
use lightyears_core::world::{ActorContext, GameStage, StageStatus, WaitStage, World};
use lightyears_core::{Actor, ActorId, GameResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

pub const PLAYER_TEAM: u8 = 1;
pub const ENEMY_TEAM: u8 = 2;

const TURRET_TEXTURE: &str = "turret.png";
const DRONE_TEXTURE: &str = "drone.png";
const BULLET_TEXTURE: &str = "bullet.png";

/// Points awarded per drone shot down
pub const DRONE_SCORE: u32 = 10;

/// Enemy drifting straight down until shot or out of the window
pub struct Drone {
    pub health: HealthComponent,
    /// Broadcast when the drone leaves the window alive
    pub on_escaped: Delegate<()>,
    speed: f32,
}

impl Drone {
    pub fn new(health: f32, speed: f32) -> Self {
        Self {
            health: HealthComponent::new(health, health),
            on_escaped: Delegate::new(),
            speed,
        }
    }
}

impl Actor for Drone {
    fn name(&self) -> &str {
        "drone"
    }

    fn begin_play(&mut self, ctx: &mut ActorContext<'_>) -> GameResult<()> {
        ctx.set_texture(DRONE_TEXTURE);
        ctx.set_team_id(ENEMY_TEAM);
        ctx.set_enable_physics(true);
        ctx.set_velocity(Vec2::new(0.0, self.speed));
        Ok(())
    }

    fn tick(&mut self, ctx: &mut ActorContext<'_>, _delta_time: f32) {
        if ctx.is_out_of_window_bounds() {
            debug!("Drone {:?} escaped", ctx.id());
            self.on_escaped.broadcast(&());
            ctx.destroy();
        }
    }

    fn apply_damage(&mut self, ctx: &mut ActorContext<'_>, amount: f32) {
        self.health.change_health(-amount);
        if self.health.is_empty() {
            ctx.destroy();
        }
    }
}

/// Stationary gun aiming at the nearest drone on a fixed cadence
pub struct Turret {
    fire_interval: f32,
    bullet_texture: Rc<Texture>,
}

impl Turret {
    pub fn new(fire_interval: f32, bullet_texture: Rc<Texture>) -> Self {
        Self {
            fire_interval,
            bullet_texture,
        }
    }

    fn fire(world: &mut World, turret: ActorId) {
        let Some(origin) = world.actor_location(turret) else {
            return;
        };
        let nearest = world
            .live_actors_of::<Drone>()
            .into_iter()
            .filter_map(|id| world.actor_location(id))
            .min_by(|a, b| {
                (a - origin)
                    .norm_squared()
                    .total_cmp(&(b - origin).norm_squared())
            });
        let Some(target) = nearest else {
            return;
        };

        let aim = target - origin;
        let rotation = radians_to_degrees(aim.y.atan2(aim.x));
        world.set_actor_rotation(turret, rotation);

        let muzzle = origin + aim.normalize() * 40.0;
        let shot = Projectile::new(Some(turret)).with_texture(BULLET_TEXTURE);
        world.spawn_actor_at(shot, muzzle, rotation);
    }
}

impl Actor for Turret {
    fn name(&self) -> &str {
        "turret"
    }

    fn begin_play(&mut self, ctx: &mut ActorContext<'_>) -> GameResult<()> {
        ctx.set_texture(TURRET_TEXTURE);
        ctx.set_team_id(PLAYER_TEAM);
        debug!(
            "Turret armed with '{}' every {}s",
            self.bullet_texture.path, self.fire_interval
        );

        let id = ctx.id();
        ctx.set_timer(self.fire_interval, true, move |world| Turret::fire(world, id));
        Ok(())
    }
}

/// Console heads-up display fed by actor, health and player delegates
#[derive(Debug, Default)]
pub struct ConsoleHud {
    pub score: u32,
    pub lives: u32,
    pub drones_spawned: u32,
    pub drones_killed: u32,
    pub actors_destroyed: u32,
    pub damage_dealt: f32,
    pub waves_cleared: u32,
    pub all_waves_cleared: bool,
}

impl ConsoleHud {
    pub fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    fn on_drone_damaged(&mut self, change: &HealthChange) {
        self.damage_dealt += -change.amount;
        debug!(
            "Drone hit: {}/{} health left",
            change.health, change.max_health
        );
    }

    fn on_drone_killed(&mut self) {
        self.drones_killed += 1;
        info!("Drone down ({} total)", self.drones_killed);
    }

    fn on_actor_destroyed(&mut self, _id: &ActorId) {
        self.actors_destroyed += 1;
    }

    fn on_score_changed(&mut self, score: u32) {
        self.score = score;
        debug!("Score: {}", score);
    }

    fn on_life_changed(&mut self, lives: u32) {
        self.lives = lives;
        info!("Player has {} live(s) left", lives);
    }

    /// Mirror the player's current state and follow its changes.
    pub fn watch_player(hud: &Rc<RefCell<Self>>, player: &Rc<RefCell<PlayerStats>>) {
        let mut player = player.borrow_mut();
        {
            let mut hud = hud.borrow_mut();
            hud.score = player.score();
            hud.lives = player.life_count();
        }
        player
            .on_score_change
            .bind(hud, |hud, score| hud.on_score_changed(*score));
        player
            .on_life_change
            .bind(hud, |hud, lives| hud.on_life_changed(*lives));
    }

    fn on_wave_cleared(&mut self) {
        self.waves_cleared += 1;
        info!("Wave {} cleared", self.waves_cleared);
    }

    pub fn summary(&self) -> String {
        format!(
            "score {}, {} live(s) left, {} drone(s) spawned, {} killed, {:.0} damage dealt, {} wave(s) cleared",
            self.score,
            self.lives,
            self.drones_spawned,
            self.drones_killed,
            self.damage_dealt,
            self.waves_cleared
        )
    }
}

/// Spawns a wave of drones, then waits for all of them to be gone
pub struct DroneWaveStage {
    drone_count: u32,
    spawn_interval: f32,
    drone_health: f32,
    spawned: Vec<ActorId>,
    since_spawn: f32,
    rng: StdRng,
    player: Rc<RefCell<PlayerStats>>,
    hud: Rc<RefCell<ConsoleHud>>,
    // Keeps the texture cached while the wave is running
    _drone_texture: Rc<Texture>,
}

impl DroneWaveStage {
    pub fn new(
        drone_count: u32,
        spawn_interval: f32,
        seed: u64,
        player: &Rc<RefCell<PlayerStats>>,
        hud: &Rc<RefCell<ConsoleHud>>,
        drone_texture: Rc<Texture>,
    ) -> Self {
        Self {
            drone_count,
            spawn_interval,
            drone_health: 30.0,
            spawned: Vec::new(),
            since_spawn: 0.0,
            rng: StdRng::seed_from_u64(seed),
            player: Rc::clone(player),
            hud: Rc::clone(hud),
            _drone_texture: drone_texture,
        }
    }

    fn spawn_drone(&mut self, world: &mut World) {
        let width = world.window_size().x as f32;
        let x = self.rng.gen_range(40.0..(width - 40.0).max(41.0));
        let speed = self.rng.gen_range(60.0..140.0);

        let mut drone = Drone::new(self.drone_health, speed);
        drone
            .health
            .on_health_changed
            .bind(&self.hud, |hud, change| {
                if change.amount < 0.0 {
                    hud.on_drone_damaged(change);
                }
            });
        drone
            .health
            .on_health_empty
            .bind(&self.hud, |hud, _| hud.on_drone_killed());
        drone
            .health
            .on_health_empty
            .bind(&self.player, |player, _| player.add_score(DRONE_SCORE));
        drone.on_escaped.bind(&self.player, |player, _| {
            player.lose_life();
        });

        let id = world.spawn_actor_at(drone, Vec2::new(x, -20.0), 90.0);
        if let Some(on_destroyed) = world.on_actor_destroyed(id) {
            on_destroyed.bind(&self.hud, |hud, id| hud.on_actor_destroyed(id));
        }
        self.hud.borrow_mut().drones_spawned += 1;
        self.spawned.push(id);
    }
}

impl GameStage for DroneWaveStage {
    fn name(&self) -> &str {
        "drone wave"
    }

    fn start_stage(&mut self, world: &mut World) {
        self.spawned.clear();
        self.since_spawn = 0.0;
        self.spawn_drone(world);
    }

    fn tick_stage(&mut self, world: &mut World, delta_time: f32) -> StageStatus {
        if (self.spawned.len() as u32) < self.drone_count {
            self.since_spawn += delta_time;
            if self.since_spawn >= self.spawn_interval {
                self.since_spawn -= self.spawn_interval;
                self.spawn_drone(world);
            }
            return StageStatus::Running;
        }

        if self.spawned.iter().any(|&id| world.is_actor_alive(id)) {
            StageStatus::Running
        } else {
            StageStatus::Finished
        }
    }

    fn stage_finished(&mut self, _world: &mut World) {
        self.hud.borrow_mut().on_wave_cleared();
    }
}

/// Populate `world` with the demo level, scoring into `player`.
pub fn setup(
    world: &mut World,
    seed: u64,
    player: &Rc<RefCell<PlayerStats>>,
    hud: &Rc<RefCell<ConsoleHud>>,
) -> GameResult<()> {
    ConsoleHud::watch_player(hud, player);

    let assets = world.assets_mut();
    assets.insert_texture(TURRET_TEXTURE, 64, 64);
    let drone_texture = assets.insert_texture(DRONE_TEXTURE, 48, 48);
    let bullet_texture = assets.insert_texture(BULLET_TEXTURE, 16, 6);

    let size = world.window_size();
    let turret_location = Vec2::new(size.x as f32 / 2.0, size.y as f32 - 80.0);
    world.spawn_actor_at(Turret::new(0.3, bullet_texture), turret_location, -90.0);

    world.add_stage(WaitStage::new(1.0));
    world.add_stage(DroneWaveStage::new(
        6,
        0.8,
        seed,
        player,
        hud,
        Rc::clone(&drone_texture),
    ));
    world.add_stage(WaitStage::new(0.5));
    world.add_stage(DroneWaveStage::new(
        10,
        0.5,
        seed.wrapping_add(1),
        player,
        hud,
        drone_texture,
    ));

    world
        .on_all_stages_finished
        .bind(hud, |hud, _| hud.all_waves_cleared = true);

    info!("Demo level ready (seed {})", seed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_drone_dies_after_enough_damage() {
        let mut world = World::default();
        world.assets_mut().insert_texture(DRONE_TEXTURE, 48, 48);
        let hud = ConsoleHud::new();

        let mut drone = Drone::new(20.0, 0.0);
        drone
            .health
            .on_health_empty
            .bind(&hud, |hud, _| hud.on_drone_killed());
        let id = world.spawn_actor_at(drone, Vec2::new(300.0, 300.0), 90.0);
        world.tick_internal(1.0 / 60.0);

        world.apply_damage(id, 10.0);
        assert!(world.is_actor_alive(id));
        world.apply_damage(id, 10.0);
        assert!(!world.is_actor_alive(id));
        assert_eq!(hud.borrow().drones_killed, 1);
    }

    #[test]
    fn test_turret_fires_at_drones() {
        let mut world = World::default();
        let hud = ConsoleHud::new();
        let player = Rc::new(RefCell::new(PlayerStats::default()));
        setup(&mut world, 7, &player, &hud).unwrap();

        // Wait stage, then the first drone and a few shots
        for _ in 0..90 {
            world.tick_internal(1.0 / 60.0);
            world.step_physics(1.0 / 60.0);
        }

        assert!(hud.borrow().drones_spawned >= 1);
        assert!(!world.live_actors_of::<Projectile>().is_empty());
    }

    fn wave_world(player: &Rc<RefCell<PlayerStats>>, hud: &Rc<RefCell<ConsoleHud>>) -> World {
        let mut world = World::default();
        let texture = world.assets_mut().insert_texture(DRONE_TEXTURE, 48, 48);
        ConsoleHud::watch_player(hud, player);
        world.add_stage(DroneWaveStage::new(1, 1.0, 5, player, hud, texture));
        world.tick_internal(1.0 / 60.0);
        world
    }

    #[test]
    fn test_shot_down_drone_scores_points() {
        let player = Rc::new(RefCell::new(PlayerStats::default()));
        let hud = ConsoleHud::new();
        let mut world = wave_world(&player, &hud);
        world.tick_internal(1.0 / 60.0);

        let drones = world.live_actors_of::<Drone>();
        assert_eq!(drones.len(), 1);
        world.apply_damage(drones[0], 100.0);

        assert_eq!(player.borrow().score(), DRONE_SCORE);
        assert_eq!(hud.borrow().score, DRONE_SCORE);
        assert_eq!(hud.borrow().lives, 3);
        assert!(hud.borrow().summary().starts_with("score 10, 3 live(s) left"));
    }

    #[test]
    fn test_escaped_drone_costs_a_life() {
        let player = Rc::new(RefCell::new(PlayerStats::default()));
        let hud = ConsoleHud::new();
        let mut world = wave_world(&player, &hud);
        world.tick_internal(1.0 / 60.0);

        let drone = world.live_actors_of::<Drone>()[0];
        world.set_actor_location(drone, Vec2::new(300.0, 5000.0));
        world.tick_internal(1.0 / 60.0);

        assert!(!world.is_actor_alive(drone));
        assert_eq!(player.borrow().life_count(), 2);
        assert_eq!(hud.borrow().lives, 2);
        assert_eq!(hud.borrow().score, 0);
    }

    #[test]
    fn test_hud_counts_damage_from_health_events() {
        let hud = ConsoleHud::new();
        let mut health = HealthComponent::new(30.0, 30.0);
        health.on_health_changed.bind(&hud, |hud, change| {
            if change.amount < 0.0 {
                hud.on_drone_damaged(change);
            }
        });

        health.change_health(-10.0);
        health.change_health(5.0);
        assert_relative_eq!(hud.borrow().damage_dealt, 10.0);
    }
}
