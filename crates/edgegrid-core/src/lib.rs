//! Edgegrid Core - Replicated Reducer Contract
//!
//! The types every replica agrees on before any state is exchanged.
//!
//! # Overview
//!
//! A topic (room) is shared by a set of peers. Each peer keeps a local copy of
//! the room state and applies the same [`Reducer`] to the same totally ordered
//! stream of [`EdgeAction`]s. Because the reducer is pure and deterministic,
//! replicas that have applied the same prefix of the stream hold equal state.
//!
//! The replication layer, not the reducer, decides who sent an action: it
//! stamps every admitted action with the sender's [`PeerId`]. A reducer only
//! trusts the identity it is handed and treats an unstamped action as a no-op.
//!
//! # Example
//!
//! ```
//! use edgegrid_core::{EdgeAction, PeerId, Reducer, replay};
//!
//! struct Counter;
//!
//! impl Reducer for Counter {
//!     type State = u64;
//!     type Action = u64;
//!
//!     fn initial_state(&self) -> u64 {
//!         0
//!     }
//!
//!     fn reduce(&self, state: &u64, action: &EdgeAction<u64>) -> u64 {
//!         match action.sender() {
//!             Some(_) => state + action.action,
//!             None => *state,
//!         }
//!     }
//! }
//!
//! let peer = PeerId::new("peerA").unwrap();
//! let log = vec![
//!     EdgeAction::stamped(2, peer.clone()),
//!     EdgeAction::unsigned(40),
//!     EdgeAction::stamped(3, peer),
//! ];
//! assert_eq!(replay(&Counter, &log), 5);
//! ```

mod action;
mod id;
mod reducer;

pub use action::EdgeAction;
pub use id::{IdError, PeerId, Topic};
pub use reducer::{replay, Reducer};
