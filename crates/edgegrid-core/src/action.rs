//! Stamped actions.
//!
//! On the wire an action is a flat JSON object: the action's own fields
//! (`type`, `payload`) plus the sender's identity under `peerId`, which the
//! replication layer adds on admission.

use serde::{Deserialize, Deserializer, Serialize};

use crate::PeerId;

/// An action as seen by a reducer: the intent plus who sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeAction<A> {
    /// The intent emitted by the sender.
    #[serde(flatten)]
    pub action: A,

    /// Sender identity; `None` until stamped by the replication layer.
    #[serde(
        rename = "peerId",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_peer_id"
    )]
    pub peer_id: Option<PeerId>,
}

impl<A> EdgeAction<A> {
    /// An intent that has not been admitted yet.
    pub fn unsigned(action: A) -> Self {
        Self {
            action,
            peer_id: None,
        }
    }

    /// An intent stamped with its sender.
    pub fn stamped(action: A, peer_id: PeerId) -> Self {
        Self {
            action,
            peer_id: Some(peer_id),
        }
    }

    /// The sender, if the action was stamped.
    pub fn sender(&self) -> Option<&PeerId> {
        self.peer_id.as_ref()
    }
}

/// Missing, `null` and empty `peerId` all mean "no sender".
fn lenient_peer_id<'de, D>(deserializer: D) -> Result<Option<PeerId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|id| PeerId::new(id).ok()))
}
