//! Error types for the Light Years core
//!
//! Frame-loop operations never surface these: stale handles and missing
//! assets degrade silently there. Errors are reserved for setup paths such as
//! configuration loading and actor begin-play.

use thiserror::Error;

/// Errors produced by the engine core
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Asset '{0}' not found")]
    AssetNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to read texture '{path}': {source}")]
    Texture {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Begin play failed: {0}")]
    BeginPlay(String),
}

/// Result type for engine operations
pub type GameResult<T> = Result<T, GameError>;
