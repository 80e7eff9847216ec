//! Edgegrid Grid - Shared Color Grid Reducer
//!
//! A 10×10 grid of colored cells plus a table of peer display names, kept
//! consistent across peers by replicating actions rather than state.
//!
//! # Transitions
//!
//! - `UPDATE_CELL {x, y, value}`: paint or clear one cell; the cell records
//!   the sender as its last writer. Out-of-range coordinates are dropped.
//! - `SET_USER_NAME {name}`: bind the sender to a display name, replacing any
//!   previous one.
//!
//! Anything else, and any action the replication layer did not stamp with a
//! sender, leaves the state untouched.
//!
//! # Example
//!
//! ```
//! use edgegrid_core::{EdgeAction, PeerId};
//! use edgegrid_grid::{reduce, Color, GridAction, GridState};
//!
//! let peer = PeerId::new("peerA").unwrap();
//! let paint = GridAction::paint(2, 3, Color::parse("#ff0000").unwrap());
//!
//! let state = reduce(&GridState::new(), &EdgeAction::stamped(paint, peer.clone()));
//! assert_eq!(state.cell(2, 3).unwrap().updated_by, Some(peer));
//! ```

mod action;
mod color;
mod reducer;
mod state;

pub use action::{GridAction, SET_USER_NAME, UPDATE_CELL};
pub use color::{Color, ColorError};
pub use reducer::{reduce, GridReducer};
pub use state::{Cell, CellChange, GridState, Row, GRID_SIZE};
