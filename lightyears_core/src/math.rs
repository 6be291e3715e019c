//! 2D math helpers shared by render space and physics space.
//!
//! Render space is y-down with rotations in degrees. Physics space uses
//! radians.

use nalgebra::Vector2;

/// Render-space vector
pub type Vec2 = Vector2<f32>;

pub fn degrees_to_radians(degrees: f32) -> f32 {
    degrees.to_radians()
}

pub fn radians_to_degrees(radians: f32) -> f32 {
    radians.to_degrees()
}

/// Unit vector pointing along `rotation` (degrees).
pub fn rotation_to_vector(rotation: f32) -> Vec2 {
    let radians = degrees_to_radians(rotation);
    Vec2::new(radians.cos(), radians.sin())
}

/// Axis-aligned rectangle in render space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle of `size` centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}
