//! # Render surface
//!
//! The drawing and windowing backends are external collaborators. The core
//! only needs a [`RenderTarget`] to draw sprites into and a [`Window`] to
//! poll. [`HeadlessWindow`] is an in-memory implementation used by tests and
//! by the headless runner.

pub mod assets;
pub mod headless;

pub use assets::{AssetManager, Texture};
pub use headless::{DrawCall, HeadlessCanvas, HeadlessWindow};

use crate::math::{Rect, Vec2};
use nalgebra::Vector2;
use std::rc::Rc;

/// Drawable image placed in render space, pivoted on its center
#[derive(Debug, Clone)]
pub struct Sprite {
    pub texture: Option<Rc<Texture>>,
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: None,
            position: Vec2::zeros(),
            rotation: 0.0,
        }
    }
}

impl Sprite {
    pub fn set_texture(&mut self, texture: Rc<Texture>) {
        self.texture = Some(texture);
    }

    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    /// Unrotated size, zero without a texture
    pub fn local_size(&self) -> Vec2 {
        self.texture
            .as_ref()
            .map(|texture| Vec2::new(texture.size.x as f32, texture.size.y as f32))
            .unwrap_or_else(Vec2::zeros)
    }

    /// Axis-aligned bounds of the rotated sprite
    pub fn global_bounds(&self) -> Rect {
        let size = self.local_size();
        let radians = self.rotation.to_radians();
        let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
        let extent = Vec2::new(size.x * cos + size.y * sin, size.x * sin + size.y * cos);
        Rect::centered(self.position, extent)
    }
}

/// Surface actors and the world draw into
pub trait RenderTarget {
    fn size(&self) -> Vector2<u32>;

    fn clear(&mut self);

    fn draw_sprite(&mut self, sprite: &Sprite);

    fn display(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Closed,
    Resized { width: u32, height: u32 },
}

pub trait Window: RenderTarget {
    fn is_open(&self) -> bool;

    fn poll_event(&mut self) -> Option<WindowEvent>;

    fn close(&mut self);
}
