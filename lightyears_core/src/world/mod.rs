//! # World
//!
//! Owning container and simulation driver for every actor in a level.
//!
//! Actors live in a generational arena. Destruction is two-phase: `destroy`
//! only marks an actor [`ActorState::PendingDestroy`] and releases its physics
//! body; the slot itself is reclaimed by [`World::clean_cycle`]. Handles held
//! across that point simply stop resolving.
//!
//! Spawning during a tick is deferred: new actors wait in a spawn queue and
//! begin play at the start of the next world tick.

pub mod context;
pub mod stage;

pub use context::ActorContext;
pub use stage::{GameStage, StageStatus, WaitStage};

use crate::config::EngineConfig;
use crate::core::{
    teams_hostile, Actor, ActorCore, ActorId, ActorState, AsAny, Delegate, TimerHandle,
    TimerManager,
};
use crate::math::{rotation_to_vector, Rect, Vec2};
use crate::physics::{ContactEvent, ContactKind, PhysicsSystem};
use crate::render::{AssetManager, RenderTarget};
use nalgebra::Vector2;
use slotmap::SlotMap;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, trace, warn};

pub(crate) struct ActorEntry {
    pub(crate) core: ActorCore,
    /// Taken out while one of the actor's hooks is running
    pub(crate) behavior: Option<Box<dyn Actor>>,
}

pub struct World {
    actors: SlotMap<ActorId, ActorEntry>,
    /// Live iteration order; also the back-to-front render order
    order: Vec<ActorId>,
    pending_spawn: Vec<ActorId>,
    physics: PhysicsSystem,
    assets: AssetManager,
    timers: TimerManager<World>,
    window_size: Vector2<u32>,
    stages: VecDeque<Box<dyn GameStage>>,
    current_stage: Option<Box<dyn GameStage>>,
    stages_finished: bool,
    has_begun_play: bool,
    /// Broadcast once the stage queue drains
    pub on_all_stages_finished: Delegate<()>,
}

impl World {
    pub fn new(physics: PhysicsSystem, assets: AssetManager, window_size: Vector2<u32>) -> Self {
        Self {
            actors: SlotMap::with_key(),
            order: Vec::new(),
            pending_spawn: Vec::new(),
            physics,
            assets,
            timers: TimerManager::new(),
            window_size,
            stages: VecDeque::new(),
            current_stage: None,
            stages_finished: false,
            has_begun_play: false,
            on_all_stages_finished: Delegate::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            PhysicsSystem::new(&config.physics),
            AssetManager::new(config.asset_root.clone()),
            Vector2::new(config.window.width, config.window.height),
        )
    }

    // ----- Frame loop -----

    /// Tick every live actor, then the current stage, then due timers.
    pub fn tick_internal(&mut self, delta_time: f32) {
        if !self.has_begun_play {
            self.begin_play();
        }

        self.begin_pending_spawns();

        let ids = self.order.clone();
        for id in ids {
            self.tick_actor(id, delta_time);
        }

        self.tick_stages(delta_time);
        self.update_timers(delta_time);
    }

    fn begin_play(&mut self) {
        self.has_begun_play = true;
        info!("World begin play ({} stage(s) queued)", self.stages.len());
        self.start_next_stage();
    }

    pub fn has_begun_play(&self) -> bool {
        self.has_begun_play
    }

    fn begin_pending_spawns(&mut self) {
        let spawned = std::mem::take(&mut self.pending_spawn);
        for id in spawned {
            if !self.actors.contains_key(id) {
                continue;
            }
            self.order.push(id);
            self.begin_play_actor(id);
        }
    }

    fn begin_play_actor(&mut self, id: ActorId) {
        match self.actors.get_mut(id) {
            Some(entry) if entry.core.state == ActorState::Constructed => {
                entry.core.state = ActorState::BegunPlay;
            }
            _ => return,
        }

        let result = self.invoke_hook(id, "begin_play", |actor, ctx| actor.begin_play(ctx));
        if let Some(Err(err)) = result {
            warn!("Actor {:?} failed to begin play: {}", id, err);
            self.destroy_actor(id);
        }
    }

    fn tick_actor(&mut self, id: ActorId, delta_time: f32) {
        if !self.is_actor_live(id) {
            return;
        }
        self.invoke_hook(id, "tick", |actor, ctx| actor.tick(ctx, delta_time));
        self.sync_from_physics(id);
    }

    /// Step physics, sync transforms from the bodies, then deliver contacts.
    pub fn step_physics(&mut self, delta_time: f32) {
        let contacts = self.physics.step(delta_time);

        let ids = self.order.clone();
        for id in ids {
            self.sync_from_physics(id);
        }

        for contact in contacts {
            self.dispatch_contact(contact);
        }
    }

    fn dispatch_contact(&mut self, contact: ContactEvent) {
        let ContactEvent {
            kind,
            actor_a,
            actor_b,
        } = contact;
        if !self.is_actor_live(actor_a) || !self.is_actor_live(actor_b) {
            trace!("Dropping contact {:?} with stale actor", contact);
            return;
        }

        match kind {
            ContactKind::Begin => {
                self.invoke_hook(actor_a, "on_begin_overlap", |actor, ctx| {
                    actor.on_begin_overlap(ctx, actor_b)
                });
                if self.is_actor_live(actor_b) {
                    self.invoke_hook(actor_b, "on_begin_overlap", |actor, ctx| {
                        actor.on_begin_overlap(ctx, actor_a)
                    });
                }
            }
            ContactKind::End => {
                self.invoke_hook(actor_a, "on_end_overlap", |actor, ctx| {
                    actor.on_end_overlap(ctx, actor_b)
                });
                if self.is_actor_live(actor_b) {
                    self.invoke_hook(actor_b, "on_end_overlap", |actor, ctx| {
                        actor.on_end_overlap(ctx, actor_a)
                    });
                }
            }
        }
    }

    /// Physics is the source of truth for position once enabled.
    fn sync_from_physics(&mut self, id: ActorId) {
        let Some(entry) = self.actors.get_mut(id) else {
            return;
        };
        if !entry.core.is_live() {
            return;
        }
        let Some(body) = entry.core.physics_body else {
            return;
        };
        if let Some((location, rotation)) = self.physics.body_transform(body) {
            entry.core.sprite.position = location;
            entry.core.sprite.rotation = rotation;
        }
    }

    fn tick_stages(&mut self, delta_time: f32) {
        let Some(mut stage) = self.current_stage.take() else {
            return;
        };

        let status =
            panic::catch_unwind(AssertUnwindSafe(|| stage.tick_stage(self, delta_time)));
        match status {
            Ok(StageStatus::Running) => self.current_stage = Some(stage),
            Ok(StageStatus::Finished) => {
                let finished =
                    panic::catch_unwind(AssertUnwindSafe(|| stage.stage_finished(self)));
                match finished {
                    Ok(()) => info!("Stage '{}' finished", stage.name()),
                    Err(payload) => error!(
                        "Stage '{}' panicked in stage_finished: {}",
                        stage.name(),
                        panic_message(payload.as_ref())
                    ),
                }
                self.start_next_stage();
            }
            Err(payload) => {
                error!(
                    "Stage '{}' panicked: {}; skipping to the next stage",
                    stage.name(),
                    panic_message(payload.as_ref())
                );
                self.start_next_stage();
            }
        }
    }

    /// Start the first queued stage that starts cleanly. A stage panicking
    /// in `start_stage` is dropped.
    fn start_next_stage(&mut self) {
        while let Some(mut stage) = self.stages.pop_front() {
            info!("Stage '{}' started", stage.name());
            match panic::catch_unwind(AssertUnwindSafe(|| stage.start_stage(self))) {
                Ok(()) => {
                    self.current_stage = Some(stage);
                    return;
                }
                Err(payload) => error!(
                    "Stage '{}' panicked in start_stage: {}; skipping to the next stage",
                    stage.name(),
                    panic_message(payload.as_ref())
                ),
            }
        }

        if !self.stages_finished {
            self.stages_finished = true;
            info!("All stages finished");
            let delegate = &mut self.on_all_stages_finished;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| delegate.broadcast(&())))
            {
                error!(
                    "on_all_stages_finished listener panicked: {}",
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    /// Queue a stage. Starts it right away if the world is idle.
    pub fn add_stage(&mut self, stage: impl GameStage + 'static) {
        self.stages.push_back(Box::new(stage));
        self.stages_finished = false;
        if self.has_begun_play && self.current_stage.is_none() {
            self.start_next_stage();
        }
    }

    pub fn current_stage_name(&self) -> Option<&str> {
        self.current_stage.as_ref().map(|stage| stage.name())
    }

    pub fn queued_stage_count(&self) -> usize {
        self.stages.len()
    }

    fn update_timers(&mut self, delta_time: f32) {
        for handle in self.timers.update(delta_time) {
            if let Some(owner) = self.timers.owner(handle) {
                if !self.is_actor_alive(owner) {
                    trace!("Clearing timer {:?} of dead actor {:?}", handle, owner);
                    self.timers.clear_timer(handle);
                    continue;
                }
            }

            let Some(mut callback) = self.timers.take_callback(handle) else {
                continue;
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(self)));
            match outcome {
                Ok(()) => self.timers.finish(handle, callback),
                Err(payload) => {
                    error!(
                        "Timer {:?} panicked: {}",
                        handle,
                        panic_message(payload.as_ref())
                    );
                    self.timers.clear_timer(handle);
                }
            }
        }
    }

    /// Draw every live actor in insertion order.
    pub fn render(&mut self, target: &mut dyn RenderTarget) {
        let mut faulted = Vec::new();
        for &id in &self.order {
            let Some(entry) = self.actors.get(id) else {
                continue;
            };
            if !entry.core.is_live() {
                continue;
            }
            let Some(behavior) = entry.behavior.as_deref() else {
                continue;
            };
            let drawn = panic::catch_unwind(AssertUnwindSafe(|| {
                behavior.render(&entry.core, &mut *target)
            }));
            if let Err(payload) = drawn {
                error!(
                    "Actor {:?} panicked in render: {}",
                    id,
                    panic_message(payload.as_ref())
                );
                faulted.push(id);
            }
        }
        for id in faulted {
            self.destroy_actor(id);
        }
    }

    /// Reclaim the slots of every actor marked for destruction.
    ///
    /// Returns the number of actors removed.
    pub fn clean_cycle(&mut self) -> usize {
        let doomed: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|(_, entry)| entry.core.is_pending_destroy())
            .map(|(id, _)| id)
            .collect();

        for &id in &doomed {
            self.actors.remove(id);
        }
        let actors = &self.actors;
        self.order.retain(|id| actors.contains_key(*id));
        self.pending_spawn.retain(|id| actors.contains_key(*id));

        if !doomed.is_empty() {
            debug!("Clean cycle removed {} actor(s)", doomed.len());
        }
        doomed.len()
    }

    /// Release every physics body and timer. The world is unusable for
    /// simulation afterwards.
    pub fn shutdown(&mut self) {
        for (_, entry) in self.actors.iter_mut() {
            entry.core.physics_body = None;
        }
        self.timers.clear();
        self.physics.clean_up();
        info!("World shut down ({} actor(s) released)", self.actors.len());
    }

    // ----- Hook dispatch -----

    /// Run `f` on the actor's behavior with a context for that actor.
    ///
    /// Returns `None` if the actor is gone or its behavior is already
    /// running further up the stack.
    fn with_behavior<R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut dyn Actor, &mut ActorContext<'_>) -> R,
    ) -> Option<R> {
        let mut behavior = self.actors.get_mut(id)?.behavior.take()?;
        let result = {
            let mut ctx = ActorContext::new(self, id);
            f(behavior.as_mut(), &mut ctx)
        };
        if let Some(entry) = self.actors.get_mut(id) {
            entry.behavior = Some(behavior);
        }
        Some(result)
    }

    /// [`with_behavior`](Self::with_behavior) with panic isolation: a
    /// panicking actor is logged and destroyed.
    fn invoke_hook<R>(
        &mut self,
        id: ActorId,
        hook: &str,
        f: impl FnOnce(&mut dyn Actor, &mut ActorContext<'_>) -> R,
    ) -> Option<R> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.with_behavior(id, f))) {
            Ok(result) => result,
            Err(payload) => {
                error!(
                    "Actor {:?} panicked in {}: {}",
                    id,
                    hook,
                    panic_message(payload.as_ref())
                );
                self.destroy_actor(id);
                None
            }
        }
    }

    /// Run `f` on an actor downcast to its concrete type.
    pub fn with_actor<T: Actor, R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut T, &mut ActorContext<'_>) -> R,
    ) -> Option<R> {
        self.with_behavior(id, |actor, ctx| {
            actor
                .as_any_mut()
                .downcast_mut::<T>()
                .map(|actor| f(actor, ctx))
        })
        .flatten()
    }

    /// Borrow an actor as its concrete type.
    pub fn actor<T: Actor>(&self, id: ActorId) -> Option<&T> {
        self.actors
            .get(id)?
            .behavior
            .as_deref()?
            .as_any()
            .downcast_ref::<T>()
    }

    // ----- Spawning and destruction -----

    /// Register an actor with the world. It begins play on the next tick.
    pub fn spawn_actor(&mut self, actor: impl Actor + 'static) -> ActorId {
        let core = ActorCore::new(actor.name());
        let id = self.actors.insert(ActorEntry {
            core,
            behavior: Some(Box::new(actor)),
        });
        self.pending_spawn.push(id);
        debug!("Spawned actor {:?}", id);
        id
    }

    /// [`spawn_actor`](Self::spawn_actor) at an initial transform.
    pub fn spawn_actor_at(
        &mut self,
        actor: impl Actor + 'static,
        location: Vec2,
        rotation: f32,
    ) -> ActorId {
        let id = self.spawn_actor(actor);
        self.set_actor_location(id, location);
        self.set_actor_rotation(id, rotation);
        id
    }

    /// Mark an actor for removal at the next cleanup cycle. Idempotent.
    pub fn destroy_actor(&mut self, id: ActorId) {
        let Some(entry) = self.actors.get_mut(id) else {
            return;
        };
        if entry.core.is_pending_destroy() {
            return;
        }
        entry.core.state = ActorState::PendingDestroy;
        if let Some(body) = entry.core.physics_body.take() {
            self.physics.remove_listener(body);
        }

        debug!("Actor {:?} ({}) marked for destruction", id, entry.core.name);
        // Listeners cannot reach the world, so the delegate is broadcast in place
        let delegate = &mut entry.core.on_actor_destroyed;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| delegate.broadcast(&id))) {
            error!(
                "on_actor_destroyed listener of {:?} panicked: {}",
                id,
                panic_message(payload.as_ref())
            );
        }
    }

    // ----- Queries -----

    /// Exists and is not marked for destruction
    pub fn is_actor_alive(&self, id: ActorId) -> bool {
        self.actors
            .get(id)
            .is_some_and(|entry| !entry.core.is_pending_destroy())
    }

    /// Begun play and not marked for destruction
    pub fn is_actor_live(&self, id: ActorId) -> bool {
        self.actors.get(id).is_some_and(|entry| entry.core.is_live())
    }

    pub fn actor_state(&self, id: ActorId) -> Option<ActorState> {
        self.actors.get(id).map(|entry| entry.core.state)
    }

    pub fn actor_core(&self, id: ActorId) -> Option<&ActorCore> {
        self.actors.get(id).map(|entry| &entry.core)
    }

    /// Every actor slot still held, including ones awaiting cleanup
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn live_actor_count(&self) -> usize {
        self.actors
            .values()
            .filter(|entry| entry.core.is_live())
            .count()
    }

    /// Live actors in insertion order
    pub fn live_actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|&id| self.is_actor_live(id))
    }

    /// Live actors of a concrete type, in insertion order
    pub fn live_actors_of<T: Actor>(&self) -> Vec<ActorId> {
        self.live_actors()
            .filter(|&id| self.actor::<T>(id).is_some())
            .collect()
    }

    pub fn on_actor_destroyed(&mut self, id: ActorId) -> Option<&mut Delegate<ActorId>> {
        self.actors
            .get_mut(id)
            .map(|entry| &mut entry.core.on_actor_destroyed)
    }

    // ----- Transform -----

    pub fn actor_location(&self, id: ActorId) -> Option<Vec2> {
        self.actor_core(id).map(|core| core.location())
    }

    /// Rotation in degrees
    pub fn actor_rotation(&self, id: ActorId) -> Option<f32> {
        self.actor_core(id).map(|core| core.rotation())
    }

    pub fn actor_global_bounds(&self, id: ActorId) -> Option<Rect> {
        self.actor_core(id).map(|core| core.global_bounds())
    }

    pub fn actor_forward_vector(&self, id: ActorId) -> Option<Vec2> {
        self.actor_rotation(id).map(rotation_to_vector)
    }

    pub fn actor_right_vector(&self, id: ActorId) -> Option<Vec2> {
        self.actor_rotation(id)
            .map(|rotation| rotation_to_vector(rotation + 90.0))
    }

    /// Move an actor. With physics enabled this moves its body too.
    pub fn set_actor_location(&mut self, id: ActorId, location: Vec2) {
        let Some(entry) = self.actors.get_mut(id) else {
            return;
        };
        entry.core.sprite.position = location;
        if let Some(body) = entry.core.physics_body {
            self.physics
                .set_body_transform(body, location, entry.core.sprite.rotation);
        }
    }

    /// Rotate an actor (degrees). With physics enabled this rotates its body too.
    pub fn set_actor_rotation(&mut self, id: ActorId, rotation: f32) {
        let Some(entry) = self.actors.get_mut(id) else {
            return;
        };
        entry.core.sprite.rotation = rotation;
        if let Some(body) = entry.core.physics_body {
            self.physics
                .set_body_transform(body, entry.core.sprite.position, rotation);
        }
    }

    pub fn add_actor_location_offset(&mut self, id: ActorId, offset: Vec2) {
        if let Some(location) = self.actor_location(id) {
            self.set_actor_location(id, location + offset);
        }
    }

    pub fn add_actor_rotation_offset(&mut self, id: ActorId, offset: f32) {
        if let Some(rotation) = self.actor_rotation(id) {
            self.set_actor_rotation(id, rotation + offset);
        }
    }

    pub fn window_size(&self) -> Vector2<u32> {
        self.window_size
    }

    pub fn set_window_size(&mut self, size: Vector2<u32>) {
        self.window_size = size;
    }

    /// Whether the actor has fully left the window, allowing one sprite
    /// extent of margin on every side
    pub fn is_actor_out_of_window_bounds(&self, id: ActorId) -> bool {
        let Some(core) = self.actor_core(id) else {
            return false;
        };
        let bounds = core.global_bounds();
        let location = core.location();
        let window_width = self.window_size.x as f32;
        let window_height = self.window_size.y as f32;

        location.x < -bounds.width
            || location.x > window_width + bounds.width
            || location.y < -bounds.height
            || location.y > window_height + bounds.height
    }

    // ----- Physics -----

    /// Attach or release the actor's physics body.
    ///
    /// Enabling twice keeps the existing body; disabling without a body is
    /// a no-op.
    pub fn set_enable_physics(&mut self, id: ActorId, enable: bool) {
        let Some(entry) = self.actors.get_mut(id) else {
            return;
        };

        if enable {
            if entry.core.physics_body.is_some() || entry.core.is_pending_destroy() {
                return;
            }
            // The body carries the rotation, so the collider uses the unrotated size
            entry.core.physics_body = self.physics.add_listener(
                id,
                entry.core.location(),
                entry.core.rotation(),
                entry.core.sprite.local_size(),
            );
        } else if let Some(body) = entry.core.physics_body.take() {
            self.physics.remove_listener(body);
        }
    }

    pub fn is_actor_physics_enabled(&self, id: ActorId) -> bool {
        self.actor_core(id)
            .is_some_and(|core| core.is_physics_enabled())
    }

    /// Velocity in render units per second, physics-enabled actors only
    pub fn set_actor_velocity(&mut self, id: ActorId, velocity: Vec2) {
        if let Some(body) = self.actor_core(id).and_then(|core| core.physics_body) {
            self.physics.set_body_velocity(body, velocity);
        }
    }

    pub fn actor_velocity(&self, id: ActorId) -> Option<Vec2> {
        let body = self.actor_core(id)?.physics_body?;
        self.physics.body_velocity(body)
    }

    pub fn physics(&self) -> &PhysicsSystem {
        &self.physics
    }

    // ----- Rendering and assets -----

    /// Swap the actor's texture. A missing texture leaves the actor
    /// invisible rather than failing.
    pub fn set_actor_texture(&mut self, id: ActorId, path: &str) {
        if !self.actors.contains_key(id) {
            return;
        }
        let texture = self.assets.load_texture(path);
        let Some(entry) = self.actors.get_mut(id) else {
            return;
        };
        match texture {
            Ok(texture) => entry.core.sprite.set_texture(texture),
            Err(err) => {
                warn!("Actor {:?} has no texture: {}", id, err);
                entry.core.sprite.clear_texture();
            }
        }
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetManager {
        &mut self.assets
    }

    // ----- Gameplay -----

    pub fn actor_team(&self, id: ActorId) -> Option<u8> {
        self.actor_core(id).map(|core| core.team_id())
    }

    pub fn set_actor_team(&mut self, id: ActorId, team_id: u8) {
        if let Some(entry) = self.actors.get_mut(id) {
            entry.core.team_id = team_id;
        }
    }

    /// Whether two existing actors are on hostile teams
    pub fn is_hostile(&self, a: ActorId, b: ActorId) -> bool {
        match (self.actor_team(a), self.actor_team(b)) {
            (Some(team_a), Some(team_b)) => teams_hostile(team_a, team_b),
            _ => false,
        }
    }

    /// Route damage to a live actor's `apply_damage` hook.
    pub fn apply_damage(&mut self, target: ActorId, amount: f32) {
        if !self.is_actor_live(target) {
            return;
        }
        self.invoke_hook(target, "apply_damage", |actor, ctx| {
            actor.apply_damage(ctx, amount)
        });
    }

    // ----- Timers -----

    /// Register a callback after `duration` seconds of simulated time.
    ///
    /// With an `owner`, the timer is cleared once that actor is gone.
    pub fn set_timer(
        &mut self,
        owner: Option<ActorId>,
        duration: f32,
        repeat: bool,
        callback: impl FnMut(&mut World) + 'static,
    ) -> TimerHandle {
        self.timers.set_timer(owner, duration, repeat, callback)
    }

    pub fn clear_timer(&mut self, handle: TimerHandle) -> bool {
        self.timers.clear_timer(handle)
    }

    pub fn is_timer_active(&self, handle: TimerHandle) -> bool {
        self.timers.is_active(handle)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("actors", &self.actors.len())
            .field("pending_spawn", &self.pending_spawn.len())
            .field("bodies", &self.physics.body_count())
            .field("timers", &self.timers.len())
            .field("stages", &self.stages.len())
            .field("has_begun_play", &self.has_begun_play)
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GameError, GameResult};
    use crate::render::HeadlessCanvas;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counter {
        begun: u32,
        ticks: u32,
    }

    impl Actor for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn begin_play(&mut self, _ctx: &mut ActorContext<'_>) -> GameResult<()> {
            self.begun += 1;
            Ok(())
        }

        fn tick(&mut self, _ctx: &mut ActorContext<'_>, _delta_time: f32) {
            self.ticks += 1;
        }
    }

    struct FailsToBegin;

    impl Actor for FailsToBegin {
        fn begin_play(&mut self, _ctx: &mut ActorContext<'_>) -> GameResult<()> {
            Err(GameError::BeginPlay("no texture budget".to_string()))
        }
    }

    struct Spawner {
        spawned: Option<ActorId>,
    }

    impl Actor for Spawner {
        fn tick(&mut self, ctx: &mut ActorContext<'_>, _delta_time: f32) {
            if self.spawned.is_none() {
                self.spawned = Some(ctx.spawn_actor(Counter::default()));
            }
        }
    }

    #[test]
    fn test_spawned_actor_begins_play_on_next_tick() {
        let mut world = World::default();
        let id = world.spawn_actor(Counter::default());
        assert_eq!(world.actor_state(id), Some(ActorState::Constructed));

        world.tick_internal(1.0 / 60.0);
        world.tick_internal(1.0 / 60.0);

        let counter = world.actor::<Counter>(id).unwrap();
        assert_eq!(counter.begun, 1);
        assert_eq!(counter.ticks, 2);
        assert_eq!(world.actor_state(id), Some(ActorState::BegunPlay));
    }

    #[test]
    fn test_spawn_during_tick_is_deferred() {
        let mut world = World::default();
        let spawner = world.spawn_actor(Spawner { spawned: None });

        world.tick_internal(0.1);
        let child = world.actor::<Spawner>(spawner).unwrap().spawned.unwrap();
        assert_eq!(world.actor_state(child), Some(ActorState::Constructed));

        world.tick_internal(0.1);
        let counter = world.actor::<Counter>(child).unwrap();
        assert_eq!(counter.begun, 1);
        assert_eq!(counter.ticks, 1);
    }

    #[test]
    fn test_failed_begin_play_destroys_actor() {
        let mut world = World::default();
        let id = world.spawn_actor(FailsToBegin);
        world.tick_internal(0.1);
        assert_eq!(world.actor_state(id), Some(ActorState::PendingDestroy));
        assert_eq!(world.clean_cycle(), 1);
        assert_eq!(world.actor_state(id), None);
    }

    #[test]
    fn test_destroy_is_idempotent_and_broadcasts_once() {
        let mut world = World::default();
        let id = world.spawn_actor(Counter::default());
        let notified = Rc::new(RefCell::new(Vec::new()));
        {
            let notified = Rc::clone(&notified);
            world
                .on_actor_destroyed(id)
                .unwrap()
                .bind_fn(move |id| notified.borrow_mut().push(*id));
        }

        world.destroy_actor(id);
        world.destroy_actor(id);
        assert_eq!(*notified.borrow(), vec![id]);
    }

    #[test]
    fn test_enable_physics_uses_current_location() {
        let mut world = World::default();
        let id = world.spawn_actor_at(Counter::default(), Vec2::new(120.0, 40.0), 0.0);
        world.tick_internal(1.0 / 60.0);

        world.set_enable_physics(id, true);
        world.set_enable_physics(id, true);
        assert_eq!(world.physics().body_count(), 1);

        world.step_physics(1.0 / 60.0);
        let location = world.actor_location(id).unwrap();
        assert!((location.x - 120.0).abs() < 1e-3);
        assert!((location.y - 40.0).abs() < 1e-3);

        world.set_enable_physics(id, false);
        world.set_enable_physics(id, false);
        assert!(!world.is_actor_physics_enabled(id));
    }

    #[test]
    fn test_render_draws_live_actors_in_order() {
        let mut world = World::default();
        world.assets_mut().insert_texture("a.png", 8, 8);
        world.assets_mut().insert_texture("b.png", 8, 8);
        let first = world.spawn_actor(Counter::default());
        let second = world.spawn_actor(Counter::default());
        let hidden = world.spawn_actor(Counter::default());
        world.set_actor_texture(first, "a.png");
        world.set_actor_texture(second, "b.png");
        world.set_actor_texture(hidden, "b.png");
        world.tick_internal(0.1);
        world.destroy_actor(hidden);

        let mut canvas = HeadlessCanvas::new(600, 980);
        world.render(&mut canvas);
        let drawn: Vec<&str> = canvas
            .pending_draws()
            .iter()
            .map(|draw| draw.texture.as_str())
            .collect();
        assert_eq!(drawn, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_missing_texture_leaves_actor_invisible() {
        let mut world = World::default();
        let id = world.spawn_actor(Counter::default());
        world.set_actor_texture(id, "does/not/exist.png");
        assert!(world.actor_core(id).unwrap().sprite().texture.is_none());
    }

    #[test]
    fn test_owned_timer_is_cleared_with_its_owner() {
        let mut world = World::default();
        let owner = world.spawn_actor(Counter::default());
        let fired = Rc::new(RefCell::new(0));
        let handle = {
            let fired = Rc::clone(&fired);
            world.set_timer(Some(owner), 0.1, true, move |_| *fired.borrow_mut() += 1)
        };

        world.tick_internal(0.1);
        assert_eq!(*fired.borrow(), 1);

        world.destroy_actor(owner);
        world.tick_internal(0.1);
        assert_eq!(*fired.borrow(), 1);
        assert!(!world.is_timer_active(handle));
    }

    #[test]
    fn test_stages_run_in_order_then_broadcast() {
        let mut world = World::default();
        let done = Rc::new(RefCell::new(false));
        {
            let done = Rc::clone(&done);
            world
                .on_all_stages_finished
                .bind_fn(move |_| *done.borrow_mut() = true);
        }
        world.add_stage(WaitStage::new(0.2));
        world.add_stage(WaitStage::new(0.2));

        world.tick_internal(0.1);
        assert_eq!(world.current_stage_name(), Some("wait"));
        assert_eq!(world.queued_stage_count(), 1);

        world.tick_internal(0.1);
        assert_eq!(world.queued_stage_count(), 0);
        assert!(!*done.borrow());

        world.tick_internal(0.1);
        world.tick_internal(0.1);
        assert!(world.current_stage_name().is_none());
        assert!(*done.borrow());
    }

    struct FaultyStage {
        panic_on_start: bool,
    }

    impl GameStage for FaultyStage {
        fn name(&self) -> &str {
            "faulty"
        }

        fn start_stage(&mut self, _world: &mut World) {
            if self.panic_on_start {
                panic!("stage failed to start");
            }
        }

        fn tick_stage(&mut self, _world: &mut World, _delta_time: f32) -> StageStatus {
            StageStatus::Finished
        }

        fn stage_finished(&mut self, _world: &mut World) {
            panic!("stage failed to finish");
        }
    }

    #[test]
    fn test_stage_lifecycle_panics_skip_to_next_stage() {
        let mut world = World::default();
        let id = world.spawn_actor(Counter::default());
        world.add_stage(FaultyStage {
            panic_on_start: true,
        });
        world.add_stage(FaultyStage {
            panic_on_start: false,
        });
        world.add_stage(WaitStage::new(10.0));

        // The first stage never starts; the second starts and then fails to finish
        world.tick_internal(0.1);
        assert_eq!(world.current_stage_name(), Some("wait"));
        assert_eq!(world.queued_stage_count(), 0);
        assert_eq!(world.actor::<Counter>(id).map(|c| c.ticks), Some(1));

        world.tick_internal(0.1);
        assert_eq!(world.actor::<Counter>(id).map(|c| c.ticks), Some(2));
    }

    #[test]
    fn test_panicking_listeners_do_not_escape() {
        let mut world = World::default();
        world
            .on_all_stages_finished
            .bind_fn(|_| panic!("broadcast listener failed"));
        let id = world.spawn_actor(Counter::default());
        world
            .on_actor_destroyed(id)
            .unwrap()
            .bind_fn(|_| panic!("destroy listener failed"));

        world.tick_internal(0.1);
        world.destroy_actor(id);

        assert_eq!(world.actor_state(id), Some(ActorState::PendingDestroy));
        assert_eq!(world.on_actor_destroyed(id).map(|d| d.len()), Some(1));
        world.tick_internal(0.1);
    }

    #[test]
    fn test_destroyed_delegate_keeps_its_bindings() {
        let mut world = World::default();
        let id = world.spawn_actor(Counter::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            world
                .on_actor_destroyed(id)
                .unwrap()
                .bind_fn(move |id| seen.borrow_mut().push(*id));
        }

        world.destroy_actor(id);
        world.destroy_actor(id);

        assert_eq!(*seen.borrow(), vec![id]);
        assert_eq!(world.on_actor_destroyed(id).map(|d| d.len()), Some(1));
    }

    #[test]
    fn test_with_actor_downcasts_and_checks_type() {
        let mut world = World::default();
        let id = world.spawn_actor(Counter::default());

        let ticks = world.with_actor::<Counter, _>(id, |counter, ctx| {
            counter.ticks = 41;
            ctx.set_location(Vec2::new(5.0, 6.0));
            counter.ticks + 1
        });
        assert_eq!(ticks, Some(42));
        assert_eq!(world.actor_location(id), Some(Vec2::new(5.0, 6.0)));
        assert!(world.with_actor::<Spawner, _>(id, |_, _| ()).is_none());
        assert!(world.actor::<Counter>(id).is_some());
    }

    #[test]
    fn test_hostility_requires_two_existing_actors() {
        let mut world = World::default();
        let a = world.spawn_actor(Counter::default());
        let b = world.spawn_actor(Counter::default());
        assert!(!world.is_hostile(a, b));
        world.set_actor_team(a, 1);
        world.set_actor_team(b, 2);
        assert!(world.is_hostile(a, b));

        world.destroy_actor(b);
        world.clean_cycle();
        assert!(!world.is_hostile(a, b));
    }
}
