//! # Physics
//!
//! [`PhysicsSystem`] owns the rapier2d world. Actors only hold opaque
//! [`RigidBodyHandle`](rapier2d::prelude::RigidBodyHandle)s and go through the
//! system for every body operation.

pub mod contact;
pub mod system;

pub use contact::{ContactEvent, ContactKind};
pub use system::PhysicsSystem;
