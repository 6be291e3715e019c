//! Texture cache
//!
//! Textures are handed out as shared `Rc<Texture>` handles. The cache keeps
//! its own handle, so a texture whose only remaining reference is the cache
//! is unused and gets evicted on [`AssetManager::clean_cycle`].

use crate::error::{GameError, GameResult};
use image::ImageError;
use nalgebra::Vector2;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// Image resource resolved by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub path: String,
    pub size: Vector2<u32>,
}

impl Texture {
    pub fn new(path: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            size: Vector2::new(width, height),
        }
    }
}

#[derive(Debug)]
pub struct AssetManager {
    root: PathBuf,
    textures: HashMap<String, Rc<Texture>>,
}

impl AssetManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            textures: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get a cached texture or load it from `root/path`
    pub fn load_texture(&mut self, path: &str) -> GameResult<Rc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.root.join(path);
        let (width, height) = image::image_dimensions(&full_path).map_err(|err| match err {
            ImageError::IoError(e) if e.kind() == io::ErrorKind::NotFound => {
                GameError::AssetNotFound(path.to_string())
            }
            source => GameError::Texture {
                path: path.to_string(),
                source,
            },
        })?;

        debug!("Loaded texture '{}' ({}x{})", path, width, height);
        let texture = Rc::new(Texture::new(path, width, height));
        self.textures.insert(path.to_string(), texture.clone());
        Ok(texture)
    }

    /// Seed the cache with a texture that has no backing file
    pub fn insert_texture(&mut self, path: &str, width: u32, height: u32) -> Rc<Texture> {
        let texture = Rc::new(Texture::new(path, width, height));
        self.textures.insert(path.to_string(), texture.clone());
        texture
    }

    /// Evict textures nobody outside the cache references. Returns the count.
    pub fn clean_cycle(&mut self) -> usize {
        let before = self.textures.len();
        self.textures
            .retain(|_, texture| Rc::strong_count(texture) > 1);
        let evicted = before - self.textures.len();
        if evicted > 0 {
            debug!("Evicted {} unused texture(s)", evicted);
        }
        evicted
    }

    pub fn cached_count(&self) -> usize {
        self.textures.len()
    }
}
