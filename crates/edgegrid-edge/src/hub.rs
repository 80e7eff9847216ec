//! Topic sequencer.
//!
//! The hub is the single point of ordering: every frame published to a topic
//! receives the next sequence number, is appended to the topic log and is
//! broadcast to every subscriber, all under one lock. Subscribers therefore
//! observe the same total order, and a late subscriber can rebuild state from
//! the log.

use edgegrid_core::{PeerId, Topic};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, trace};

use crate::config::EdgeConfig;
use crate::error::{Error, Result};

/// Wire field carrying the sender identity.
pub const PEER_ID_FIELD: &str = "peerId";

/// A sequenced frame as stored in a topic log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Position in the topic log, starting at 1.
    pub seq: u64,
    /// The stamped action, still undecoded.
    pub body: Value,
}

/// Log and fan-out channel for one topic.
#[derive(Debug)]
struct TopicLog {
    frames: Vec<Arc<Frame>>,
    tx: broadcast::Sender<Arc<Frame>>,
}

impl TopicLog {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            frames: Vec::new(),
            tx,
        }
    }

    fn append(&mut self, body: Value) -> u64 {
        let seq = self.frames.len() as u64 + 1;
        let frame = Arc::new(Frame { seq, body });
        self.frames.push(Arc::clone(&frame));
        // No subscribers is not an error: the log still holds the frame.
        let receivers = self.tx.send(frame).unwrap_or(0);
        trace!(seq, receivers, "Broadcast frame");
        seq
    }
}

/// A new subscription: everything published so far plus a live receiver.
pub(crate) struct Subscription {
    pub backlog: Vec<Arc<Frame>>,
    pub rx: broadcast::Receiver<Arc<Frame>>,
}

#[derive(Debug)]
struct HubInner {
    topics: Mutex<HashMap<Topic, TopicLog>>,
    capacity: usize,
}

/// Shared in-memory hub; clones refer to the same topics.
#[derive(Debug, Clone)]
pub struct EdgeHub {
    inner: Arc<HubInner>,
}

impl Default for EdgeHub {
    fn default() -> Self {
        Self::from_config(&EdgeConfig::default())
    }
}

impl EdgeHub {
    /// Create a hub whose subscribers buffer up to `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                topics: Mutex::new(HashMap::new()),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Create a hub from configuration.
    pub fn from_config(config: &EdgeConfig) -> Self {
        Self::new(config.channel_capacity)
    }

    /// Stamp an intent with its sender and publish it.
    ///
    /// Any `peerId` already present in the intent is overwritten: identity
    /// comes from the hub, never from the payload. Returns the frame's
    /// sequence number.
    pub async fn publish(&self, topic: &Topic, sender: &PeerId, intent: Value) -> Result<u64> {
        let Value::Object(mut body) = intent else {
            return Err(Error::InvalidFrame("intent must be a JSON object".to_string()));
        };
        body.insert(PEER_ID_FIELD.to_string(), Value::String(sender.to_string()));

        let seq = self.append(topic, Value::Object(body)).await;
        debug!(topic = %topic, peer = sender.short(), seq, "Published stamped frame");
        Ok(seq)
    }

    /// Publish a frame exactly as given, without stamping.
    ///
    /// Models arbitrary input arriving from the network.
    pub async fn publish_raw(&self, topic: &Topic, body: Value) -> u64 {
        let seq = self.append(topic, body).await;
        debug!(topic = %topic, seq, "Published raw frame");
        seq
    }

    /// Sequence number of the newest frame in a topic (0 when empty).
    pub async fn head(&self, topic: &Topic) -> u64 {
        let topics = self.inner.topics.lock().await;
        topics.get(topic).map_or(0, |log| log.frames.len() as u64)
    }

    /// Topics that have been subscribed or published to, sorted.
    pub async fn topics(&self) -> Vec<Topic> {
        let topics = self.inner.topics.lock().await;
        let mut names: Vec<Topic> = topics.keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot the log and subscribe atomically, so no frame is missed or
    /// delivered twice.
    pub(crate) async fn subscribe(&self, topic: &Topic) -> Subscription {
        let mut topics = self.inner.topics.lock().await;
        let log = topics
            .entry(topic.clone())
            .or_insert_with(|| TopicLog::new(self.inner.capacity));
        Subscription {
            backlog: log.frames.clone(),
            rx: log.tx.subscribe(),
        }
    }

    /// Frames of a topic with a sequence number above `after`, for
    /// resynchronization.
    ///
    /// The log keeps every frame for the life of the hub, so a replica only
    /// ever needs the part it has not applied yet.
    pub(crate) async fn log_since(&self, topic: &Topic, after: u64) -> Vec<Arc<Frame>> {
        let topics = self.inner.topics.lock().await;
        let Some(log) = topics.get(topic) else {
            return Vec::new();
        };
        let start = usize::try_from(after).unwrap_or(usize::MAX);
        log.frames.get(start..).map(<[_]>::to_vec).unwrap_or_default()
    }

    async fn append(&self, topic: &Topic, body: Value) -> u64 {
        let mut topics = self.inner.topics.lock().await;
        topics
            .entry(topic.clone())
            .or_insert_with(|| TopicLog::new(self.inner.capacity))
            .append(body)
    }
}
