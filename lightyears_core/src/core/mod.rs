//! # Core types for the Light Years framework
//!
//! - **Actor**: behavior trait and engine-owned per-actor state
//! - **Delegate**: observable events with weakly held listeners
//! - **HealthComponent**: health with change notifications
//! - **PlayerStats**: score and life count with change notifications
//! - **TimerManager**: delayed and repeating callbacks in simulated time

pub mod actor;
pub mod delegate;
pub mod health;
pub mod player;
pub mod timer;

pub use actor::{teams_hostile, Actor, ActorCore, ActorId, ActorState, AsAny, NEUTRAL_TEAM_ID};
pub use delegate::{BindingId, Delegate};
pub use health::{HealthChange, HealthComponent};
pub use player::PlayerStats;
pub use timer::{TimerCallback, TimerHandle, TimerManager};
