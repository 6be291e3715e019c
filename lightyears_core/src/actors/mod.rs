//! Stock actors shipped with the core

pub mod projectile;

pub use projectile::Projectile;
