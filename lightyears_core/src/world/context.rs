//! Per-hook view of the world from one actor's side

use super::World;
use crate::core::{Actor, ActorCore, ActorId, TimerHandle};
use crate::math::{Rect, Vec2};
use nalgebra::Vector2;

/// Handed to every [`Actor`] hook
///
/// Wraps the world together with the id of the actor whose hook is running,
/// so actor code can say `ctx.set_location(..)` instead of threading its own
/// id through every world call. The full world stays reachable through
/// [`world_mut`](Self::world_mut).
pub struct ActorContext<'w> {
    world: &'w mut World,
    id: ActorId,
}

impl<'w> ActorContext<'w> {
    pub(crate) fn new(world: &'w mut World, id: ActorId) -> Self {
        Self { world, id }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn world(&self) -> &World {
        &*self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    pub fn core(&self) -> Option<&ActorCore> {
        self.world.actor_core(self.id)
    }

    pub fn location(&self) -> Vec2 {
        self.world.actor_location(self.id).unwrap_or_else(Vec2::zeros)
    }

    pub fn rotation(&self) -> f32 {
        self.world.actor_rotation(self.id).unwrap_or(0.0)
    }

    pub fn set_location(&mut self, location: Vec2) {
        self.world.set_actor_location(self.id, location);
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.world.set_actor_rotation(self.id, rotation);
    }

    pub fn add_location_offset(&mut self, offset: Vec2) {
        self.world.add_actor_location_offset(self.id, offset);
    }

    pub fn add_rotation_offset(&mut self, offset: f32) {
        self.world.add_actor_rotation_offset(self.id, offset);
    }

    pub fn forward_vector(&self) -> Vec2 {
        self.world
            .actor_forward_vector(self.id)
            .unwrap_or_else(|| Vec2::new(1.0, 0.0))
    }

    pub fn right_vector(&self) -> Vec2 {
        self.world
            .actor_right_vector(self.id)
            .unwrap_or_else(|| Vec2::new(0.0, 1.0))
    }

    pub fn global_bounds(&self) -> Rect {
        self.world.actor_global_bounds(self.id).unwrap_or_default()
    }

    pub fn window_size(&self) -> Vector2<u32> {
        self.world.window_size()
    }

    pub fn is_out_of_window_bounds(&self) -> bool {
        self.world.is_actor_out_of_window_bounds(self.id)
    }

    pub fn set_texture(&mut self, path: &str) {
        self.world.set_actor_texture(self.id, path);
    }

    pub fn set_enable_physics(&mut self, enable: bool) {
        self.world.set_enable_physics(self.id, enable);
    }

    pub fn is_physics_enabled(&self) -> bool {
        self.world.is_actor_physics_enabled(self.id)
    }

    pub fn velocity(&self) -> Vec2 {
        self.world.actor_velocity(self.id).unwrap_or_else(Vec2::zeros)
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.world.set_actor_velocity(self.id, velocity);
    }

    pub fn team_id(&self) -> u8 {
        self.world
            .actor_team(self.id)
            .unwrap_or(crate::core::NEUTRAL_TEAM_ID)
    }

    pub fn set_team_id(&mut self, team_id: u8) {
        self.world.set_actor_team(self.id, team_id);
    }

    pub fn is_other_hostile(&self, other: ActorId) -> bool {
        self.world.is_hostile(self.id, other)
    }

    /// Damage another actor. Damaging yourself from inside your own hook is
    /// ignored.
    pub fn apply_damage_to(&mut self, target: ActorId, amount: f32) {
        self.world.apply_damage(target, amount);
    }

    pub fn spawn_actor(&mut self, actor: impl Actor + 'static) -> ActorId {
        self.world.spawn_actor(actor)
    }

    pub fn spawn_actor_at(
        &mut self,
        actor: impl Actor + 'static,
        location: Vec2,
        rotation: f32,
    ) -> ActorId {
        self.world.spawn_actor_at(actor, location, rotation)
    }

    /// Mark this actor for destruction
    pub fn destroy(&mut self) {
        self.world.destroy_actor(self.id);
    }

    pub fn is_pending_destroy(&self) -> bool {
        !self.world.is_actor_alive(self.id)
    }

    /// Timer owned by this actor: it stops firing once the actor is gone
    pub fn set_timer(
        &mut self,
        duration: f32,
        repeat: bool,
        callback: impl FnMut(&mut World) + 'static,
    ) -> TimerHandle {
        self.world
            .set_timer(Some(self.id), duration, repeat, callback)
    }
}
