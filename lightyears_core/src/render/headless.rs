//! In-memory render target and window

use super::{RenderTarget, Sprite, Window, WindowEvent};
use crate::math::Vec2;
use nalgebra::Vector2;
use std::collections::VecDeque;

/// A recorded sprite draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture: String,
    pub position: Vec2,
    pub rotation: f32,
}

/// Render target that records draw calls instead of rasterizing
#[derive(Debug, Clone)]
pub struct HeadlessCanvas {
    size: Vector2<u32>,
    current: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    frames_presented: u64,
}

impl HeadlessCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Vector2::new(width, height),
            current: Vec::new(),
            last_frame: Vec::new(),
            frames_presented: 0,
        }
    }

    /// Draw calls of the frame being built
    pub fn pending_draws(&self) -> &[DrawCall] {
        &self.current
    }

    /// Draw calls of the most recently displayed frame
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = Vector2::new(width, height);
    }
}

impl RenderTarget for HeadlessCanvas {
    fn size(&self) -> Vector2<u32> {
        self.size
    }

    fn clear(&mut self) {
        self.current.clear();
    }

    fn draw_sprite(&mut self, sprite: &Sprite) {
        // Nothing to draw without a texture
        let Some(texture) = sprite.texture.as_ref() else {
            return;
        };
        self.current.push(DrawCall {
            texture: texture.path.clone(),
            position: sprite.position,
            rotation: sprite.rotation,
        });
    }

    fn display(&mut self) {
        self.last_frame = std::mem::take(&mut self.current);
        self.frames_presented += 1;
    }
}

/// Window backed by a [`HeadlessCanvas`]
///
/// With a frame limit the window requests its own close once that many
/// frames have been displayed.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    canvas: HeadlessCanvas,
    open: bool,
    frame_limit: Option<u64>,
    close_requested: bool,
    events: VecDeque<WindowEvent>,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32, frame_limit: Option<u64>) -> Self {
        Self {
            canvas: HeadlessCanvas::new(width, height),
            open: true,
            frame_limit,
            close_requested: false,
            events: VecDeque::new(),
        }
    }

    pub fn canvas(&self) -> &HeadlessCanvas {
        &self.canvas
    }

    pub fn push_event(&mut self, event: WindowEvent) {
        self.events.push_back(event);
    }
}

impl RenderTarget for HeadlessWindow {
    fn size(&self) -> Vector2<u32> {
        self.canvas.size()
    }

    fn clear(&mut self) {
        self.canvas.clear();
    }

    fn draw_sprite(&mut self, sprite: &Sprite) {
        self.canvas.draw_sprite(sprite);
    }

    fn display(&mut self) {
        self.canvas.display();
    }
}

impl Window for HeadlessWindow {
    fn is_open(&self) -> bool {
        self.open
    }

    fn poll_event(&mut self) -> Option<WindowEvent> {
        if let Some(event) = self.events.pop_front() {
            if let WindowEvent::Resized { width, height } = event {
                self.canvas.resize(width, height);
            }
            return Some(event);
        }

        let limit_reached = self
            .frame_limit
            .is_some_and(|limit| self.canvas.frames_presented() >= limit);
        if limit_reached && !self.close_requested {
            self.close_requested = true;
            return Some(WindowEvent::Closed);
        }
        None
    }

    fn close(&mut self) {
        self.open = false;
    }
}
