//! # Light Years Core
//!
//! Actor/world simulation core for a fixed-timestep 2D top-down shooter.
//!
//! - **Actors**: game objects with a transform, a sprite, an optional
//!   physics body and lifecycle hooks ([`Actor`])
//! - **World**: arena that owns the actors and drives tick, contact
//!   dispatch, render and deferred destruction ([`World`])
//! - **Physics**: rapier2d world owner with scaled render/physics units
//!   ([`PhysicsSystem`])
//! - **Application**: fixed-timestep accumulator loop ([`Application`])
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lightyears_core::{Actor, ActorContext, Application, EngineConfig, HeadlessWindow, Vec2};
//!
//! struct Mover;
//!
//! impl Actor for Mover {
//!     fn tick(&mut self, ctx: &mut ActorContext<'_>, delta_time: f32) {
//!         ctx.add_location_offset(Vec2::new(50.0 * delta_time, 0.0));
//!     }
//! }
//!
//! let config = EngineConfig::default();
//! let window = HeadlessWindow::new(config.window.width, config.window.height, Some(120));
//! let mut app = Application::new(window, &config);
//! app.world_mut().spawn_actor(Mover);
//! app.run_simulated();
//! ```

pub mod actors;
pub mod application;
pub mod config;
pub mod core;
pub mod error;
pub mod math;
pub mod physics;
pub mod render;
pub mod world;

pub use crate::application::Application;
pub use crate::config::{EngineConfig, PhysicsConfig, WindowConfig};
pub use crate::core::{
    Actor, ActorCore, ActorId, ActorState, Delegate, HealthComponent, PlayerStats, TimerHandle,
    NEUTRAL_TEAM_ID,
};
pub use crate::error::{GameError, GameResult};
pub use crate::math::{Rect, Vec2};
pub use crate::physics::{ContactEvent, ContactKind, PhysicsSystem};
pub use crate::render::{AssetManager, HeadlessWindow, RenderTarget, Sprite, Window, WindowEvent};
pub use crate::world::{ActorContext, GameStage, StageStatus, WaitStage, World};
