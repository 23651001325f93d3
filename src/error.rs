//! Error type for the simulation core
//!
//! Gameplay never errors. Only caller bugs (querying outside the collision
//! map) and config/level loading can fail.

/// Crate result alias
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A collision-map query outside the configured extents
    #[error("point ({x}, {y}) is outside the collision map")]
    PointOutOfBounds { x: i32, y: i32 },

    #[error("malformed JSON: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
