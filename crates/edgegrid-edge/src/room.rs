//! Rooms: one local replica of a topic's state.
//!
//! A room replays the topic log when it opens, then follows the topic's
//! broadcast in a background task, applying frames strictly in sequence
//! order. If the broadcast lags or a sequence gap shows up, the replica
//! pulls the frames after its last applied sequence number from the log
//! rather than skipping ahead.
//!
//! # Hooks
//!
//! - `on_dispatch`: an intent is about to be handed to the hub
//! - `on_payload`: a frame was applied and produced a new state
//! - `on_reset`: the replica caught up from the topic log (join or resync)

use edgegrid_core::{EdgeAction, PeerId, Reducer, Topic};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::hub::{EdgeHub, Frame, Subscription};
use crate::node::NodeStatus;

/// A callback shared between the room handle and its replica task.
pub type Hook<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Optional observers for room activity.
pub struct RoomHooks<R: Reducer> {
    on_dispatch: Option<Hook<R::Action>>,
    on_payload: Option<Hook<R::State>>,
    on_reset: Option<Hook<R::State>>,
}

impl<R: Reducer> RoomHooks<R> {
    /// No hooks.
    pub fn new() -> Self {
        Self {
            on_dispatch: None,
            on_payload: None,
            on_reset: None,
        }
    }

    /// Called with each intent before it is published.
    #[must_use]
    pub fn on_dispatch(mut self, hook: impl Fn(&R::Action) + Send + Sync + 'static) -> Self {
        self.on_dispatch = Some(Arc::new(hook));
        self
    }

    /// Called with the new state after each applied frame.
    #[must_use]
    pub fn on_payload(mut self, hook: impl Fn(&R::State) + Send + Sync + 'static) -> Self {
        self.on_payload = Some(Arc::new(hook));
        self
    }

    /// Called with the state after catching up from the topic log.
    #[must_use]
    pub fn on_reset(mut self, hook: impl Fn(&R::State) + Send + Sync + 'static) -> Self {
        self.on_reset = Some(Arc::new(hook));
        self
    }

    fn dispatched(&self, action: &R::Action) {
        if let Some(hook) = &self.on_dispatch {
            hook(action);
        }
    }

    fn payload(&self, state: &R::State) {
        if let Some(hook) = &self.on_payload {
            hook(state);
        }
    }

    fn reset(&self, state: &R::State) {
        if let Some(hook) = &self.on_reset {
            hook(state);
        }
    }
}

impl<R: Reducer> Default for RoomHooks<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Reducer> Clone for RoomHooks<R> {
    fn clone(&self) -> Self {
        Self {
            on_dispatch: self.on_dispatch.clone(),
            on_payload: self.on_payload.clone(),
            on_reset: self.on_reset.clone(),
        }
    }
}

impl<R: Reducer> fmt::Debug for RoomHooks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomHooks")
            .field("on_dispatch", &self.on_dispatch.is_some())
            .field("on_payload", &self.on_payload.is_some())
            .field("on_reset", &self.on_reset.is_some())
            .finish()
    }
}

/// What the room handle can observe of its replica.
#[derive(Debug, Clone)]
struct ReplicaView<S> {
    state: S,
    seq: u64,
    synced: bool,
}

/// Result of offering one frame to a replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameOutcome {
    /// Decoded and reduced
    Applied,
    /// Consumed its sequence number but did not decode
    Skipped,
    /// Already applied
    Stale,
    /// Frames are missing before this one
    Gap { expected: u64, got: u64 },
}

/// The local state machine behind a room.
struct Replica<R: Reducer> {
    reducer: R,
    hooks: RoomHooks<R>,
    topic: Topic,
    state: R::State,
    seq: u64,
}

impl<R: Reducer> Replica<R> {
    fn new(reducer: R, hooks: RoomHooks<R>, topic: Topic) -> Self {
        let state = reducer.initial_state();
        Self {
            reducer,
            hooks,
            topic,
            state,
            seq: 0,
        }
    }

    /// Apply a contiguous run of log frames following `self.seq`.
    ///
    /// The state up to `self.seq` is already correct, so only the tail of
    /// the log is needed.
    fn catch_up(&mut self, frames: &[Arc<Frame>]) {
        for frame in frames {
            self.apply(frame);
        }
        debug!(topic = %self.topic, seq = self.seq, applied = frames.len(), "Replica caught up from topic log");
        self.hooks.reset(&self.state);
    }

    fn apply(&mut self, frame: &Frame) -> FrameOutcome {
        if frame.seq <= self.seq {
            return FrameOutcome::Stale;
        }
        if frame.seq != self.seq + 1 {
            return FrameOutcome::Gap {
                expected: self.seq + 1,
                got: frame.seq,
            };
        }

        self.seq = frame.seq;
        match EdgeAction::<R::Action>::deserialize(&frame.body) {
            Ok(action) => {
                self.state = self.reducer.reduce(&self.state, &action);
                FrameOutcome::Applied
            }
            Err(e) => {
                warn!(topic = %self.topic, seq = frame.seq, error = %e, "Skipping undecodable frame");
                FrameOutcome::Skipped
            }
        }
    }

    fn view(&self) -> ReplicaView<R::State> {
        ReplicaView {
            state: self.state.clone(),
            seq: self.seq,
            synced: true,
        }
    }
}

fn publish_view<R: Reducer>(view: &watch::Sender<ReplicaView<R::State>>, replica: &Replica<R>) {
    view.send_modify(|v| {
        v.state = replica.state.clone();
        v.seq = replica.seq;
    });
}

async fn run_replica<R: Reducer>(
    mut replica: Replica<R>,
    mut rx: broadcast::Receiver<Arc<Frame>>,
    hub: EdgeHub,
    view: Arc<watch::Sender<ReplicaView<R::State>>>,
) {
    loop {
        let frame = match rx.recv().await {
            Ok(frame) => frame,
            Err(RecvError::Lagged(missed)) => {
                warn!(topic = %replica.topic, missed, "Replica lagged, resyncing from topic log");
                let tail = hub.log_since(&replica.topic, replica.seq).await;
                replica.catch_up(&tail);
                publish_view(&view, &replica);
                continue;
            }
            Err(RecvError::Closed) => {
                debug!(topic = %replica.topic, "Topic channel closed");
                view.send_modify(|v| v.synced = false);
                break;
            }
        };

        match replica.apply(&frame) {
            FrameOutcome::Applied => {
                replica.hooks.payload(&replica.state);
                publish_view(&view, &replica);
            }
            FrameOutcome::Skipped => publish_view(&view, &replica),
            FrameOutcome::Stale => {}
            FrameOutcome::Gap { expected, got } => {
                warn!(topic = %replica.topic, expected, got, "Sequence gap, resyncing from topic log");
                let tail = hub.log_since(&replica.topic, replica.seq).await;
                replica.catch_up(&tail);
                publish_view(&view, &replica);
            }
        }
    }
}

/// A subscription to one topic: current state, dispatch and connectivity.
///
/// Dropping the room stops its replica task.
pub struct Room<R: Reducer> {
    topic: Topic,
    peer_id: PeerId,
    hub: EdgeHub,
    hooks: RoomHooks<R>,
    view: Arc<watch::Sender<ReplicaView<R::State>>>,
    node_status: watch::Receiver<NodeStatus>,
    task: JoinHandle<()>,
}

impl<R: Reducer> Room<R> {
    pub(crate) async fn open(
        hub: EdgeHub,
        topic: Topic,
        peer_id: PeerId,
        node_status: watch::Receiver<NodeStatus>,
        reducer: R,
        hooks: RoomHooks<R>,
    ) -> Self {
        let Subscription { backlog, rx } = hub.subscribe(&topic).await;

        let mut replica = Replica::new(reducer, hooks.clone(), topic.clone());
        replica.catch_up(&backlog);

        let (tx, _) = watch::channel(replica.view());
        let view = Arc::new(tx);
        info!(topic = %topic, peer = peer_id.short(), seq = replica.seq, "Joined topic");

        let task = tokio::spawn(run_replica(replica, rx, hub.clone(), Arc::clone(&view)));

        Self {
            topic,
            peer_id,
            hub,
            hooks,
            view,
            node_status,
            task,
        }
    }

    /// The topic this room follows.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Identity stamped on this room's dispatches.
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    /// Current state snapshot.
    pub fn state(&self) -> R::State {
        self.view.borrow().state.clone()
    }

    /// Sequence number of the last frame applied.
    pub fn seq(&self) -> u64 {
        self.view.borrow().seq
    }

    /// Whether the replica is synced and the node is running.
    pub fn connected(&self) -> bool {
        self.view.borrow().synced
            && *self.node_status.borrow() == NodeStatus::Started
            && !self.task.is_finished()
    }

    /// Hand an intent to the hub for stamping and broadcast.
    ///
    /// Returns the sequence number the hub assigned. The local state changes
    /// only once the frame comes back through the topic, like everyone
    /// else's.
    pub async fn dispatch(&self, action: R::Action) -> Result<u64> {
        if !self.connected() {
            return Err(Error::NotConnected(self.topic.clone()));
        }

        self.hooks.dispatched(&action);
        let intent = serde_json::to_value(EdgeAction::unsigned(action))?;
        self.hub.publish(&self.topic, &self.peer_id, intent).await
    }

    /// Wait until the state satisfies `pred`, returning that state.
    ///
    /// Fails with [`Error::Closed`] once the replica stops following the
    /// topic without having matched.
    pub async fn wait_for(&self, mut pred: impl FnMut(&R::State) -> bool) -> Result<R::State> {
        self.wait_view(|v| pred(&v.state)).await
    }

    /// Wait until frame `seq` has been applied.
    ///
    /// Fails with [`Error::Closed`] once the replica stops following the
    /// topic before reaching `seq`.
    pub async fn wait_for_seq(&self, seq: u64) -> Result<R::State> {
        self.wait_view(|v| v.seq >= seq).await
    }

    async fn wait_view(
        &self,
        mut pred: impl FnMut(&ReplicaView<R::State>) -> bool,
    ) -> Result<R::State> {
        let mut rx = self.view.subscribe();
        let mut matched = false;
        let view = rx
            .wait_for(|v| {
                matched = pred(v);
                matched || !v.synced
            })
            .await
            .map_err(|_| Error::Closed)?;

        if matched {
            Ok(view.state.clone())
        } else {
            Err(Error::Closed)
        }
    }

    /// Stop following the topic. The last state stays readable.
    pub fn leave(&mut self) {
        if self.task.is_finished() && !self.view.borrow().synced {
            return;
        }
        self.task.abort();
        self.view.send_modify(|v| v.synced = false);
        info!(topic = %self.topic, peer = self.peer_id.short(), "Left topic");
    }
}

impl<R: Reducer> Drop for Room<R> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<R: Reducer> fmt::Debug for Room<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("topic", &self.topic)
            .field("peer_id", &self.peer_id)
            .field("seq", &self.seq())
            .field("connected", &self.connected())
            .finish()
    }
}
