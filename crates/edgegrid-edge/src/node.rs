//! The local peer.

use edgegrid_core::{PeerId, Reducer, Topic};
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;
use tracing::info;

use crate::config::EdgeConfig;
use crate::error::{Error, Result};
use crate::hub::EdgeHub;
use crate::room::{Room, RoomHooks};

/// Coarse node lifecycle, exposed read-only for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Starting,
    Started,
    Stopping,
    Stopped,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Started => write!(f, "started"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// One participant attached to a hub.
///
/// Holds the peer identity the hub stamps onto everything this node
/// dispatches. The identity is stable until the node is dropped.
#[derive(Debug)]
pub struct EdgeNode {
    hub: EdgeHub,
    peer_id: PeerId,
    status: watch::Sender<NodeStatus>,
}

impl EdgeNode {
    /// Attach a node to `hub`, using the configured peer id or a random one.
    pub fn start(hub: EdgeHub, config: &EdgeConfig) -> Self {
        let peer_id = config.peer_id.clone().unwrap_or_else(PeerId::random);
        let (status, _) = watch::channel(NodeStatus::Starting);

        info!(peer = %peer_id, "Edge node starting");
        status.send_replace(NodeStatus::Started);

        Self {
            hub,
            peer_id,
            status,
        }
    }

    /// This node's identity.
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Current lifecycle status.
    pub fn status(&self) -> NodeStatus {
        *self.status.borrow()
    }

    /// Subscribe to a topic.
    ///
    /// The returned room has already replayed the topic's history and is
    /// connected.
    pub async fn join<R: Reducer>(
        &self,
        topic: &str,
        reducer: R,
        hooks: RoomHooks<R>,
    ) -> Result<Room<R>> {
        let status = self.status();
        if status != NodeStatus::Started {
            return Err(Error::NodeNotStarted(status));
        }

        let topic = Topic::new(topic)?;
        Ok(Room::open(
            self.hub.clone(),
            topic,
            self.peer_id.clone(),
            self.status.subscribe(),
            reducer,
            hooks,
        )
        .await)
    }

    /// Stop the node. Its rooms report disconnected and refuse dispatch.
    pub fn stop(&self) {
        if self.status() == NodeStatus::Stopped {
            return;
        }
        self.status.send_replace(NodeStatus::Stopping);
        info!(peer = %self.peer_id, "Edge node stopping");
        self.status.send_replace(NodeStatus::Stopped);
    }
}
