//! Straight-flying projectile
//!
//! Flies along its forward direction, damages the first hostile actor it
//! overlaps and disappears. Leaving the window also destroys it.

use crate::core::{Actor, ActorId};
use crate::error::GameResult;
use crate::world::ActorContext;
use tracing::trace;

pub const DEFAULT_PROJECTILE_SPEED: f32 = 600.0;
pub const DEFAULT_PROJECTILE_DAMAGE: f32 = 10.0;

#[derive(Debug, Clone)]
pub struct Projectile {
    owner: Option<ActorId>,
    texture: Option<String>,
    speed: f32,
    damage: f32,
}

impl Projectile {
    pub fn new(owner: Option<ActorId>) -> Self {
        Self {
            owner,
            texture: None,
            speed: DEFAULT_PROJECTILE_SPEED,
            damage: DEFAULT_PROJECTILE_DAMAGE,
        }
    }

    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    pub fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn damage(&self) -> f32 {
        self.damage
    }
}

impl Actor for Projectile {
    fn name(&self) -> &str {
        "projectile"
    }

    fn begin_play(&mut self, ctx: &mut ActorContext<'_>) -> GameResult<()> {
        if let Some(path) = &self.texture {
            ctx.set_texture(path);
        }
        if let Some(team_id) = self.owner.and_then(|owner| ctx.world().actor_team(owner)) {
            ctx.set_team_id(team_id);
        }
        // Collider is sized from the sprite, so texture first
        ctx.set_enable_physics(true);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut ActorContext<'_>, delta_time: f32) {
        let step = ctx.forward_vector() * self.speed * delta_time;
        ctx.add_location_offset(step);
        if ctx.is_out_of_window_bounds() {
            trace!("Projectile {:?} left the window", ctx.id());
            ctx.destroy();
        }
    }

    fn on_begin_overlap(&mut self, ctx: &mut ActorContext<'_>, other: ActorId) {
        if ctx.is_other_hostile(other) {
            ctx.apply_damage_to(other, self.damage);
            ctx.destroy();
        }
    }
}
