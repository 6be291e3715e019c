//! rapier2d world owner
//!
//! Each step:
//!
//! 1. Bodies queued by [`PhysicsSystem::remove_listener`] are removed, so a
//!    destroyed actor's body never participates in the step.
//! 2. rapier steps the simulation with the fixed delta.
//! 3. Collision events are collected and resolved to [`ContactEvent`]s via
//!    the `ActorId` stored in each body's user data.
//!
//! Render space and physics space differ by a constant scale factor. All
//! positions and velocities crossing this API are given in render units and
//! converted here, in both directions.

use super::contact::{actor_to_user_data, user_data_to_actor, ContactEvent, ContactKind};
use crate::config::PhysicsConfig;
use crate::core::ActorId;
use crate::math::{degrees_to_radians, radians_to_degrees, Vec2};
use rapier2d::prelude::*;
use slotmap::Key;
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// Smallest collider half extent in render units
const MIN_HALF_EXTENT: f32 = 0.5;

pub struct PhysicsSystem {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,

    physics_scale: f32,
    /// Kept in request order so removal is deterministic
    pending_remove: Vec<RigidBodyHandle>,
}

impl PhysicsSystem {
    pub fn new(config: &PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations).unwrap_or(NonZeroUsize::MIN);
        integration_parameters.num_internal_pgs_iterations = config.position_iterations.max(1);

        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![config.gravity[0], config.gravity[1]],
            integration_parameters,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            physics_scale: config.scale,
            pending_remove: Vec::new(),
        }
    }

    /// Physics units per render unit
    pub fn physics_scale(&self) -> f32 {
        self.physics_scale
    }

    pub fn to_physics(&self, render: Vec2) -> Vector<Real> {
        vector![render.x * self.physics_scale, render.y * self.physics_scale]
    }

    pub fn to_render(&self, physics: &Vector<Real>) -> Vec2 {
        Vec2::new(physics.x / self.physics_scale, physics.y / self.physics_scale)
    }

    /// Advance the simulation and return the contacts it produced.
    pub fn step(&mut self, delta_time: f32) -> Vec<ContactEvent> {
        self.process_pending_removals();
        if delta_time <= 0.0 {
            return Vec::new();
        }
        self.integration_parameters.dt = delta_time;

        let (collision_send, collision_recv) =
            rapier2d::crossbeam::channel::unbounded::<CollisionEvent>();
        let (force_send, _force_recv) =
            rapier2d::crossbeam::channel::unbounded::<ContactForceEvent>();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        let mut contacts = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let Some(contact) = self.resolve_contact(event) {
                contacts.push(contact);
            }
        }

        // Channel delivery order is not stable across runs
        contacts.sort_by_key(|contact| {
            let (a, b) = (contact.actor_a, contact.actor_b);
            (contact.kind, a.min(b), a.max(b))
        });
        contacts
    }

    /// Create a dynamic body for `actor` at a render-space transform.
    ///
    /// Returns `None` for a null actor handle.
    pub fn add_listener(
        &mut self,
        actor: ActorId,
        location: Vec2,
        rotation: f32,
        size: Vec2,
    ) -> Option<RigidBodyHandle> {
        if actor.is_null() {
            warn!("Refusing to create a physics body for a null actor");
            return None;
        }

        let body = RigidBodyBuilder::dynamic()
            .translation(self.to_physics(location))
            .rotation(degrees_to_radians(rotation))
            .user_data(actor_to_user_data(actor))
            .can_sleep(false)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let half_extents = self.to_physics(Vec2::new(
            (size.x / 2.0).max(MIN_HALF_EXTENT),
            (size.y / 2.0).max(MIN_HALF_EXTENT),
        ));
        // Overlap reporting only: contacts never push bodies apart
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .density(1.0)
            .friction(0.3)
            .solver_groups(InteractionGroups::none())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        debug!("Added physics body {:?} for actor {:?}", handle, actor);
        Some(handle)
    }

    /// Queue a body for removal before the next step. Idempotent.
    pub fn remove_listener(&mut self, body: RigidBodyHandle) {
        if !self.rigid_body_set.contains(body) {
            return;
        }
        if !self.pending_remove.contains(&body) {
            self.pending_remove.push(body);
            debug!("Queued physics body {:?} for removal", body);
        }
    }

    fn process_pending_removals(&mut self) {
        for handle in self.pending_remove.drain(..) {
            self.rigid_body_set.remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true, // remove attached colliders
            );
        }
    }

    fn resolve_contact(&self, event: CollisionEvent) -> Option<ContactEvent> {
        let (kind, collider_a, collider_b) = match event {
            CollisionEvent::Started(a, b, _) => (ContactKind::Begin, a, b),
            CollisionEvent::Stopped(a, b, _) => (ContactKind::End, a, b),
        };
        Some(ContactEvent {
            kind,
            actor_a: self.collider_owner(collider_a)?,
            actor_b: self.collider_owner(collider_b)?,
        })
    }

    fn collider_owner(&self, collider: ColliderHandle) -> Option<ActorId> {
        let body = self.collider_set.get(collider)?.parent()?;
        if self.pending_remove.contains(&body) {
            return None;
        }
        let body = self.rigid_body_set.get(body)?;
        Some(user_data_to_actor(body.user_data))
    }

    /// Whether the body exists and is not queued for removal
    pub fn is_body_alive(&self, body: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(body) && !self.pending_remove.contains(&body)
    }

    pub fn body_owner(&self, body: RigidBodyHandle) -> Option<ActorId> {
        self.rigid_body_set
            .get(body)
            .map(|body| user_data_to_actor(body.user_data))
    }

    /// Render-space location and rotation (degrees) of a body
    pub fn body_transform(&self, body: RigidBodyHandle) -> Option<(Vec2, f32)> {
        let body = self.rigid_body_set.get(body)?;
        Some((
            self.to_render(body.translation()),
            radians_to_degrees(body.rotation().angle()),
        ))
    }

    /// Raw physics-space translation of a body
    pub fn body_physics_translation(&self, body: RigidBodyHandle) -> Option<Vector<Real>> {
        self.rigid_body_set.get(body).map(|body| *body.translation())
    }

    pub fn set_body_transform(&mut self, body: RigidBodyHandle, location: Vec2, rotation: f32) {
        let translation = self.to_physics(location);
        if let Some(body) = self.rigid_body_set.get_mut(body) {
            body.set_translation(translation, true);
            body.set_rotation(Rotation::new(degrees_to_radians(rotation)), true);
        }
    }

    /// Linear velocity in render units per second
    pub fn body_velocity(&self, body: RigidBodyHandle) -> Option<Vec2> {
        let body = self.rigid_body_set.get(body)?;
        Some(self.to_render(body.linvel()))
    }

    pub fn set_body_velocity(&mut self, body: RigidBodyHandle, velocity: Vec2) {
        let linvel = self.to_physics(velocity);
        if let Some(body) = self.rigid_body_set.get_mut(body) {
            body.set_linvel(linvel, true);
        }
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn pending_removal_count(&self) -> usize {
        self.pending_remove.len()
    }

    /// Release every body and reset the simulation state.
    pub fn clean_up(&mut self) {
        let bodies = self.rigid_body_set.len();
        self.pending_remove.clear();
        self.rigid_body_set = RigidBodySet::new();
        self.collider_set = ColliderSet::new();
        self.island_manager = IslandManager::new();
        self.broad_phase = DefaultBroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.impulse_joint_set = ImpulseJointSet::new();
        self.multibody_joint_set = MultibodyJointSet::new();
        self.ccd_solver = CCDSolver::new();
        info!("Physics system cleaned up ({} bodies released)", bodies);
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}
