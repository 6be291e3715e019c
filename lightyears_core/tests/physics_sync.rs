//! Physics attachment, transform sync and contact delivery

use approx::assert_relative_eq;
use lightyears_core::{Actor, ActorContext, ActorId, GameResult, Vec2, World};
use std::cell::RefCell;
use std::rc::Rc;

/// Enables physics on begin play and logs overlaps
struct Body {
    overlaps: Rc<RefCell<Vec<(ActorId, ActorId)>>>,
    destroy_on_overlap: bool,
}

impl Body {
    fn new(overlaps: &Rc<RefCell<Vec<(ActorId, ActorId)>>>) -> Self {
        Self {
            overlaps: Rc::clone(overlaps),
            destroy_on_overlap: false,
        }
    }
}

impl Actor for Body {
    fn begin_play(&mut self, ctx: &mut ActorContext<'_>) -> GameResult<()> {
        ctx.set_enable_physics(true);
        Ok(())
    }

    fn on_begin_overlap(&mut self, ctx: &mut ActorContext<'_>, other: ActorId) {
        self.overlaps.borrow_mut().push((ctx.id(), other));
        if self.destroy_on_overlap {
            ctx.destroy();
        }
    }
}

struct Plain;

impl Actor for Plain {}

fn textured_world() -> World {
    let mut world = World::default();
    world.assets_mut().insert_texture("box.png", 20, 20);
    world
}

#[test]
fn test_enable_physics_twice_keeps_one_body() {
    let mut world = World::default();
    let id = world.spawn_actor(Plain);
    world.tick_internal(1.0 / 60.0);

    world.set_enable_physics(id, true);
    world.set_enable_physics(id, true);
    assert_eq!(world.physics().body_count(), 1);

    world.set_enable_physics(id, false);
    world.step_physics(1.0 / 60.0);
    assert_eq!(world.physics().body_count(), 0);
}

#[test]
fn test_disable_without_body_is_noop() {
    let mut world = World::default();
    let id = world.spawn_actor(Plain);
    world.set_enable_physics(id, false);
    assert!(!world.is_actor_physics_enabled(id));
    assert_eq!(world.physics().pending_removal_count(), 0);
}

#[test]
fn test_render_location_becomes_physics_location() {
    let mut world = World::default();
    let id = world.spawn_actor_at(Plain, Vec2::new(250.0, 125.0), 30.0);
    world.set_enable_physics(id, true);

    let body = world.actor_core(id).and_then(|core| core.physics_body()).unwrap();
    let raw = world.physics().body_physics_translation(body).unwrap();
    let scale = world.physics().physics_scale();
    assert_relative_eq!(raw.x, 250.0 * scale, epsilon = 1e-5);
    assert_relative_eq!(raw.y, 125.0 * scale, epsilon = 1e-5);

    let (location, rotation) = world.physics().body_transform(body).unwrap();
    assert_relative_eq!(location.x, 250.0, epsilon = 1e-3);
    assert_relative_eq!(location.y, 125.0, epsilon = 1e-3);
    assert_relative_eq!(rotation, 30.0, epsilon = 1e-3);
}

#[test]
fn test_constant_velocity_for_one_second() {
    let overlaps = Rc::new(RefCell::new(Vec::new()));
    let mut world = World::default();
    let id = world.spawn_actor_at(Body::new(&overlaps), Vec2::new(100.0, 300.0), 0.0);

    world.tick_internal(1.0 / 60.0);
    world.set_actor_velocity(id, Vec2::new(100.0, 0.0));
    let start = world.actor_location(id).unwrap();

    for _ in 0..60 {
        world.step_physics(1.0 / 60.0);
    }

    let end = world.actor_location(id).unwrap();
    assert_relative_eq!(end.x - start.x, 100.0, epsilon = 0.5);
    assert_relative_eq!(end.y, start.y, epsilon = 1e-3);
}

#[test]
fn test_overlap_reaches_both_actors() {
    let overlaps = Rc::new(RefCell::new(Vec::new()));
    let mut world = textured_world();
    let a = world.spawn_actor_at(Body::new(&overlaps), Vec2::new(100.0, 100.0), 0.0);
    let b = world.spawn_actor_at(Body::new(&overlaps), Vec2::new(110.0, 100.0), 0.0);
    world.set_actor_texture(a, "box.png");
    world.set_actor_texture(b, "box.png");

    world.tick_internal(1.0 / 60.0);
    world.step_physics(1.0 / 60.0);

    let mut seen = overlaps.borrow().clone();
    seen.sort();
    let mut expected = vec![(a, b), (b, a)];
    expected.sort();
    assert_eq!(seen, expected);
}

#[test]
fn test_contact_with_actor_destroyed_in_same_step_is_dropped() {
    let overlaps = Rc::new(RefCell::new(Vec::new()));
    let mut world = textured_world();
    let mut first = Body::new(&overlaps);
    first.destroy_on_overlap = true;
    let a = world.spawn_actor_at(first, Vec2::new(100.0, 100.0), 0.0);
    let b = world.spawn_actor_at(Body::new(&overlaps), Vec2::new(105.0, 100.0), 0.0);
    let c = world.spawn_actor_at(Body::new(&overlaps), Vec2::new(95.0, 100.0), 0.0);
    for id in [a, b, c] {
        world.set_actor_texture(id, "box.png");
    }

    world.tick_internal(1.0 / 60.0);
    world.step_physics(1.0 / 60.0);

    // `a` destroyed itself on its first overlap; later contacts involving
    // it were dropped and nobody saw `a` after that
    assert!(!world.is_actor_alive(a));
    let seen = overlaps.borrow().clone();
    let from_a = seen.iter().filter(|(owner, _)| *owner == a).count();
    assert_eq!(from_a, 1);
    assert!(seen.contains(&(b, c)) && seen.contains(&(c, b)));

    world.step_physics(1.0 / 60.0);
    assert_eq!(world.physics().body_count(), 2);
}
