//! Error types for the replication layer.

use edgegrid_core::{IdError, Topic};
use thiserror::Error;

use crate::NodeStatus;

/// Result type for replication layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in replication layer operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Dispatch attempted before the room synced, or after it left
    #[error("not connected to topic {0}")]
    NotConnected(Topic),

    /// The local node is not running
    #[error("node is {0}, expected started")]
    NodeNotStarted(NodeStatus),

    /// The room stopped following its topic
    #[error("room closed")]
    Closed,

    /// A frame that cannot be stamped
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// Bad peer id or topic
    #[error("invalid identifier: {0}")]
    Identity(#[from] IdError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
