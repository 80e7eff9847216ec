//! Replication layer configuration.

use edgegrid_core::PeerId;

use crate::error::{Error, Result};

/// Default per-topic broadcast buffer, in frames.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Environment variable holding a fixed peer id.
pub const ENV_PEER_ID: &str = "EDGEGRID_PEER_ID";

/// Environment variable holding the broadcast buffer size.
pub const ENV_CHANNEL_CAPACITY: &str = "EDGEGRID_CHANNEL_CAPACITY";

/// Configuration for a hub and the nodes attached to it.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    /// Fixed identity for the local node; random when `None`.
    pub peer_id: Option<PeerId>,

    /// Frames buffered per subscriber before it lags and must resync.
    pub channel_capacity: usize,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            peer_id: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl EdgeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let peer_id = lookup(ENV_PEER_ID)
            .map(|id| {
                PeerId::new(id.trim()).map_err(|e| Error::Config(format!("{ENV_PEER_ID}: {e}")))
            })
            .transpose()?;

        let channel_capacity = match lookup(ENV_CHANNEL_CAPACITY) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&c| c > 0)
                .ok_or_else(|| Error::Config(format!("invalid {ENV_CHANNEL_CAPACITY}: {raw:?}")))?,
            None => DEFAULT_CHANNEL_CAPACITY,
        };

        Ok(Self {
            peer_id,
            channel_capacity,
        })
    }

    /// Use a fixed peer id.
    #[must_use]
    pub fn with_peer_id(mut self, peer_id: PeerId) -> Self {
        self.peer_id = Some(peer_id);
        self
    }

    /// Set the broadcast buffer size (at least 1).
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}
