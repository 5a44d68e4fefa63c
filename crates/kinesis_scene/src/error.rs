//! Error types for the scene layer

use crate::proxy::ProxyHandle;
use kinesis_physics::PhysicsError;
use thiserror::Error;

/// Scene layer errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// Error raised by the physics world
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// Proxy handle not known to the host
    #[error("Unknown proxy: {0:?}")]
    UnknownProxy(ProxyHandle),

    /// Triangle mesh rejected at construction
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// IO error while reading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for SceneError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
