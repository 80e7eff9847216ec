//! Edgegrid Edge - In-Process Replication Layer
//!
//! Implements the consumption contract a replicated reducer relies on:
//! topics, sender stamping, a single total order of actions per topic,
//! late-join state transfer and a connectivity flag.
//!
//! # Architecture
//!
//! ```text
//! ┌────────┐ dispatch  ┌──────────────────────────┐ broadcast ┌────────┐
//! │ Room A │ ────────▶ │ EdgeHub                  │ ────────▶ │ Room A │ reduce
//! └────────┘           │  stamp peerId            │ ────────▶ │ Room B │ reduce
//! ┌────────┐ dispatch  │  assign seq, append log  │ ────────▶ │ Room C │ reduce
//! │ Room B │ ────────▶ │                          │           └────────┘
//! └────────┘           └──────────────────────────┘
//! ```
//!
//! - **Hub**: one sequencer per topic; stamps `peerId`, numbers frames,
//!   keeps the log, broadcasts.
//! - **Node**: a local peer with a stable identity and a coarse status.
//! - **Room**: a replica of one topic; replays the log on join, then follows
//!   the broadcast and applies frames in sequence order.
//!
//! # Example
//!
//! ```no_run
//! use edgegrid_edge::{EdgeConfig, EdgeHub, EdgeNode, RoomHooks};
//! use edgegrid_grid::{Color, GridAction, GridReducer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EdgeConfig::from_env()?;
//!     let hub = EdgeHub::from_config(&config);
//!     let node = EdgeNode::start(hub, &config);
//!
//!     let room = node.join("lobby", GridReducer, RoomHooks::new()).await?;
//!     let seq = room.dispatch(GridAction::paint(2, 3, Color::parse("#ff0000")?)).await?;
//!     let state = room.wait_for_seq(seq).await?;
//!     println!("{} cells painted", state.painted_count());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod node;
pub mod room;

pub use config::EdgeConfig;
pub use error::{Error, Result};
pub use hub::{EdgeHub, Frame};
pub use node::{EdgeNode, NodeStatus};
pub use room::{Room, RoomHooks};
