//! Error types for the physics core

use crate::body::BodyHandle;
use crate::material::MaterialId;
use thiserror::Error;

/// Physics core errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// The handle was never issued by this world or the body was removed
    #[error("Invalid body handle: {0:?}")]
    InvalidHandle(BodyHandle),

    /// Shape parameters rejected at construction time
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Body description rejected before registration
    #[error("Invalid body description: {0}")]
    InvalidBody(String),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),

    /// Material id not defined in this world's registry
    #[error("Unknown material: {0:?}")]
    UnknownMaterial(MaterialId),

    /// A vector or scalar input was NaN or infinite
    #[error("Non-finite {0}")]
    NonFinite(&'static str),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
