//! Grid state.
//!
//! Rows and the name table sit behind `Arc`s. A transition copies only the
//! row it touches; the other rows stay shared with the previous state, so
//! [`GridState::diff`] can skip them by pointer comparison.

use edgegrid_core::PeerId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::Color;

/// Width and height of the grid.
pub const GRID_SIZE: usize = 10;

/// One row of the grid.
pub type Row = [Cell; GRID_SIZE];

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Row index
    pub x: usize,
    /// Column index
    pub y: usize,
    /// Current color, `None` while unset
    pub value: Option<Color>,
    /// Last peer to write this cell
    pub updated_by: Option<PeerId>,
}

impl Cell {
    /// An unset cell at `(x, y)`.
    pub const fn empty(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            value: None,
            updated_by: None,
        }
    }

    /// Whether the cell has been painted.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

/// A cell whose content differs between two states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellChange {
    pub x: usize,
    pub y: usize,
    pub value: Option<Color>,
    pub updated_by: Option<PeerId>,
}

/// Replicated room state: the grid plus peer display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridState {
    grid: [Arc<Row>; GRID_SIZE],
    names: Arc<BTreeMap<PeerId, String>>,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}

impl GridState {
    /// All cells unset, no names.
    pub fn new() -> Self {
        Self {
            grid: std::array::from_fn(|x| Arc::new(std::array::from_fn(|y| Cell::empty(x, y)))),
            names: Arc::new(BTreeMap::new()),
        }
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.grid.get(x).and_then(|row| row.get(y))
    }

    /// Rows in order of `x`.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.grid.iter().map(|row| &**row)
    }

    /// Every cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows().flat_map(|row| row.iter())
    }

    /// Display names keyed by peer.
    pub fn names(&self) -> &BTreeMap<PeerId, String> {
        &self.names
    }

    /// Display name registered by a peer.
    pub fn display_name(&self, peer: &PeerId) -> Option<&str> {
        self.names.get(peer).map(String::as_str)
    }

    /// Number of painted cells.
    pub fn painted_count(&self) -> usize {
        self.cells().filter(|c| c.is_set()).count()
    }

    /// Whether row `x` is the same allocation in both states.
    pub fn shares_row(&self, other: &Self, x: usize) -> bool {
        match (self.grid.get(x), other.grid.get(x)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Cells whose value or writer differ in `next`.
    pub fn diff(&self, next: &Self) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (before, after) in self.grid.iter().zip(next.grid.iter()) {
            if Arc::ptr_eq(before, after) {
                continue;
            }
            for (old, new) in before.iter().zip(after.iter()) {
                if old != new {
                    changes.push(CellChange {
                        x: new.x,
                        y: new.y,
                        value: new.value.clone(),
                        updated_by: new.updated_by.clone(),
                    });
                }
            }
        }
        changes
    }

    /// Copy with one cell rewritten. Caller checks bounds.
    pub(crate) fn with_cell(&self, x: usize, y: usize, value: Option<Color>, peer: &PeerId) -> Self {
        let mut next = self.clone();
        let cell = &mut Arc::make_mut(&mut next.grid[x])[y];
        cell.value = value;
        cell.updated_by = Some(peer.clone());
        next
    }

    /// Copy with `peer` bound to `name`.
    pub(crate) fn with_name(&self, peer: &PeerId, name: &str) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.names).insert(peer.clone(), name.to_string());
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(id: &str) -> PeerId {
        PeerId::new(id).unwrap()
    }

    #[test]
    fn new_state_is_blank() {
        let state = GridState::new();

        assert_eq!(state.cells().count(), GRID_SIZE * GRID_SIZE);
        assert_eq!(state.painted_count(), 0);
        assert!(state.names().is_empty());
        assert!(state.cells().all(|c| c.updated_by.is_none()));
    }

    #[test]
    fn coordinates_match_position() {
        let state = GridState::new();
        for (x, row) in state.rows().enumerate() {
            for (y, cell) in row.iter().enumerate() {
                assert_eq!((cell.x, cell.y), (x, y));
            }
        }
    }

    #[test]
    fn cell_lookup_out_of_range() {
        let state = GridState::new();
        assert!(state.cell(9, 9).is_some());
        assert!(state.cell(10, 0).is_none());
        assert!(state.cell(0, 10).is_none());
    }

    #[test]
    fn with_cell_copies_only_one_row() {
        let before = GridState::new();
        let after = before.with_cell(4, 7, Color::parse("#123").ok(), &peer("p"));

        for x in 0..GRID_SIZE {
            assert_eq!(before.shares_row(&after, x), x != 4);
        }
        assert!(before.cell(4, 7).unwrap().value.is_none());
    }

    #[test]
    fn diff_reports_changed_cells() {
        let before = GridState::new();
        let red = Color::parse("#f00").unwrap();
        let after = before
            .with_cell(1, 2, Some(red.clone()), &peer("a"))
            .with_cell(8, 0, Some(red.clone()), &peer("b"));

        let changes = before.diff(&after);
        assert_eq!(changes.len(), 2);
        assert_eq!((changes[0].x, changes[0].y), (1, 2));
        assert_eq!(changes[1].updated_by, Some(peer("b")));
        assert!(after.diff(&after).is_empty());
    }

    #[test]
    fn serializes_cells_in_camel_case() {
        let state = GridState::new().with_cell(0, 0, Color::parse("#000").ok(), &peer("a"));
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["grid"][0][0]["updatedBy"], "a");
        assert_eq!(json["grid"][0][0]["value"], "#000");
        assert!(json["grid"][0][1]["updatedBy"].is_null());
    }
}
