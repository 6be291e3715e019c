//! # Light Years
//!
//! Small 2D top-down shooter framework: fixed-timestep actor/world
//! simulation over rapier2d physics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lightyears::prelude::*;
//!
//! struct Spinner;
//!
//! impl Actor for Spinner {
//!     fn tick(&mut self, ctx: &mut ActorContext<'_>, delta_time: f32) {
//!         ctx.add_rotation_offset(90.0 * delta_time);
//!     }
//! }
//!
//! let config = EngineConfig::default();
//! let window = HeadlessWindow::new(config.window.width, config.window.height, Some(60));
//! let mut app = Application::new(window, &config);
//! app.world_mut().spawn_actor(Spinner);
//! app.run_simulated();
//! ```

pub use lightyears_core::{self, *};

pub mod demo;

/// Everything needed to write actors and drive a world
pub mod prelude {
    pub use lightyears_core::actors::Projectile;
    pub use lightyears_core::core::{
        Delegate, HealthChange, HealthComponent, PlayerStats, NEUTRAL_TEAM_ID,
    };
    pub use lightyears_core::math::{rotation_to_vector, Rect, Vec2};
    pub use lightyears_core::render::{HeadlessWindow, RenderTarget, Sprite, Window, WindowEvent};
    pub use lightyears_core::world::{ActorContext, GameStage, StageStatus, WaitStage, World};
    pub use lightyears_core::{
        Actor, ActorId, Application, EngineConfig, GameError, GameResult,
    };

    pub use std::cell::RefCell;
    pub use std::rc::Rc;

    pub use anyhow::{anyhow, bail, Context, Result as AnyResult};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
