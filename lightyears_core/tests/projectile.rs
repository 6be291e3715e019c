//! Stock projectile behavior inside a running application

use lightyears_core::actors::Projectile;
use lightyears_core::{
    Actor, ActorContext, Application, EngineConfig, GameResult, HeadlessWindow, Vec2,
};

/// Target that counts the damage it receives
#[derive(Default)]
struct Dummy {
    damage_taken: f32,
}

impl Actor for Dummy {
    fn begin_play(&mut self, ctx: &mut ActorContext<'_>) -> GameResult<()> {
        ctx.set_enable_physics(true);
        Ok(())
    }

    fn apply_damage(&mut self, _ctx: &mut ActorContext<'_>, amount: f32) {
        self.damage_taken += amount;
    }
}

fn app() -> Application<HeadlessWindow> {
    let config = EngineConfig::default();
    let window = HeadlessWindow::new(config.window.width, config.window.height, None);
    Application::new(window, &config)
}

#[test]
fn test_projectile_leaving_window_is_removed_at_cleanup() {
    let mut app = app();
    let width = app.config().window.width as f32;
    let dt = app.target_delta_time();

    // At the right edge, heading right
    let shot = app
        .world_mut()
        .spawn_actor_at(Projectile::new(None), Vec2::new(width, 400.0), 0.0);

    app.advance(dt);
    assert!(app.world().is_actor_out_of_window_bounds(shot));
    assert!(!app.world().is_actor_alive(shot));
    assert_eq!(app.world().live_actor_count(), 0);

    let interval = app.config().clean_cycle_interval;
    let steps = (interval / dt).ceil() as usize + 1;
    for _ in 0..steps {
        app.advance(dt);
    }
    assert_eq!(app.world().actor_state(shot), None);
    assert_eq!(app.world().physics().body_count(), 0);
}

#[test]
fn test_projectile_damages_hostile_and_disappears() {
    let mut app = app();
    let dt = app.target_delta_time();
    let world = app.world_mut();
    world.assets_mut().insert_texture("dummy.png", 40, 40);
    world.assets_mut().insert_texture("bullet.png", 4, 8);

    let target = world.spawn_actor_at(Dummy::default(), Vec2::new(300.0, 300.0), 0.0);
    world.set_actor_texture(target, "dummy.png");
    world.set_actor_team(target, 2);

    let turret = world.spawn_actor_at(Dummy::default(), Vec2::new(300.0, 600.0), 0.0);
    world.set_actor_team(turret, 1);

    let shot = world.spawn_actor_at(
        Projectile::new(Some(turret)).with_texture("bullet.png"),
        Vec2::new(300.0, 330.0),
        -90.0,
    );

    for _ in 0..10 {
        app.advance(dt);
    }

    let world = app.world();
    assert!(!world.is_actor_alive(shot));
    assert_eq!(world.actor::<Dummy>(target).map(|d| d.damage_taken), Some(10.0));
    assert!(world.is_actor_alive(target));
}

#[test]
fn test_projectile_ignores_friendly_actors() {
    let mut app = app();
    let dt = app.target_delta_time();
    let world = app.world_mut();
    world.assets_mut().insert_texture("dummy.png", 40, 40);

    let friend = world.spawn_actor_at(Dummy::default(), Vec2::new(300.0, 300.0), 0.0);
    world.set_actor_texture(friend, "dummy.png");
    world.set_actor_team(friend, 1);

    let owner = world.spawn_actor_at(Dummy::default(), Vec2::new(50.0, 50.0), 0.0);
    world.set_actor_team(owner, 1);

    let shot = world.spawn_actor_at(
        Projectile::new(Some(owner)),
        Vec2::new(300.0, 310.0),
        -90.0,
    );

    app.advance(dt);
    app.advance(dt);

    let world = app.world();
    assert!(world.is_actor_alive(shot));
    assert_eq!(world.actor::<Dummy>(friend).map(|d| d.damage_taken), Some(0.0));
}
