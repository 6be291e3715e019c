//! Actor trait and per-actor engine state
//!
//! An actor is split in two halves stored side by side in the world arena:
//! the engine-owned [`ActorCore`] (transform, sprite, physics handle,
//! lifecycle state) and the user-implemented [`Actor`] behavior. Behavior
//! hooks reach the core and the rest of the world through an
//! [`ActorContext`].
//!
//! ## Lifecycle
//!
//! 1. **Constructed** - spawned into the world, not yet active
//! 2. **BegunPlay** - `begin_play()` ran exactly once; ticked every frame
//! 3. **PendingDestroy** - `destroy()` was requested; skipped by tick and
//!    render, removed at the next cleanup cycle

use crate::error::GameResult;
use crate::math::{Rect, Vec2};
use crate::render::{RenderTarget, Sprite};
use crate::world::ActorContext;
use rapier2d::prelude::RigidBodyHandle;
use slotmap::new_key_type;
use std::any::Any;
use std::fmt;

use super::delegate::Delegate;

new_key_type! {
    /// Generation-checked handle to an actor in a [`World`](crate::world::World)
    pub struct ActorId;
}

/// Team of actors that are never hostile to anyone
pub const NEUTRAL_TEAM_ID: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    Constructed,
    BegunPlay,
    PendingDestroy,
}

impl fmt::Display for ActorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorState::Constructed => write!(f, "Constructed"),
            ActorState::BegunPlay => write!(f, "BegunPlay"),
            ActorState::PendingDestroy => write!(f, "PendingDestroy"),
        }
    }
}

/// Upcast helper so boxed actors can be downcast to their concrete type
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior of a simulated game object
///
/// Every hook has a default, so an actor only overrides what it needs.
pub trait Actor: AsAny {
    /// Name used in log output
    fn name(&self) -> &str {
        "actor"
    }

    /// Called exactly once, before the first tick
    fn begin_play(&mut self, _ctx: &mut ActorContext<'_>) -> GameResult<()> {
        Ok(())
    }

    /// Called once per fixed step while the actor is alive
    fn tick(&mut self, _ctx: &mut ActorContext<'_>, _delta_time: f32) {}

    fn on_begin_overlap(&mut self, _ctx: &mut ActorContext<'_>, _other: ActorId) {}

    fn on_end_overlap(&mut self, _ctx: &mut ActorContext<'_>, _other: ActorId) {}

    fn apply_damage(&mut self, _ctx: &mut ActorContext<'_>, _amount: f32) {}

    /// Draw the actor. The default draws its sprite.
    fn render(&self, core: &ActorCore, target: &mut dyn RenderTarget) {
        target.draw_sprite(core.sprite());
    }
}

/// Engine-owned half of an actor
#[derive(Debug)]
pub struct ActorCore {
    pub(crate) state: ActorState,
    pub(crate) name: String,
    pub(crate) sprite: Sprite,
    pub(crate) physics_body: Option<RigidBodyHandle>,
    pub(crate) team_id: u8,
    pub on_actor_destroyed: Delegate<ActorId>,
}

impl ActorCore {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            state: ActorState::Constructed,
            name: name.into(),
            sprite: Sprite::default(),
            physics_body: None,
            team_id: NEUTRAL_TEAM_ID,
            on_actor_destroyed: Delegate::new(),
        }
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_begun_play(&self) -> bool {
        self.state != ActorState::Constructed
    }

    pub fn is_pending_destroy(&self) -> bool {
        self.state == ActorState::PendingDestroy
    }

    /// Alive and active: begun play and not marked for destruction
    pub fn is_live(&self) -> bool {
        self.state == ActorState::BegunPlay
    }

    pub fn location(&self) -> Vec2 {
        self.sprite.position
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.sprite.rotation
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn global_bounds(&self) -> Rect {
        self.sprite.global_bounds()
    }

    pub fn physics_body(&self) -> Option<RigidBodyHandle> {
        self.physics_body
    }

    pub fn is_physics_enabled(&self) -> bool {
        self.physics_body.is_some()
    }

    pub fn team_id(&self) -> u8 {
        self.team_id
    }
}

/// Whether two teams are hostile. Neutral actors are never hostile.
pub fn teams_hostile(team_a: u8, team_b: u8) -> bool {
    if team_a == NEUTRAL_TEAM_ID || team_b == NEUTRAL_TEAM_ID {
        return false;
    }
    team_a != team_b
}
