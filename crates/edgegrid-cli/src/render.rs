//! Plain-text rendering of a grid state.

use edgegrid_core::PeerId;
use edgegrid_grid::{Cell, GridState, GRID_SIZE};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Marker for an unpainted cell.
const EMPTY: char = '.';

/// One character per cell: the writer's initial, `.` when unset.
pub fn grid(state: &GridState) -> String {
    let mut out = String::from("   ");
    for y in 0..GRID_SIZE {
        let _ = write!(out, "{y} ");
    }
    out.truncate(out.trim_end().len());
    out.push('\n');

    for (x, row) in state.rows().enumerate() {
        let _ = write!(out, "{x:>2} ");
        for cell in row.iter() {
            out.push(marker(state, cell));
            out.push(' ');
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
    }
    out
}

/// Display names with painted-cell counts, one peer per line.
pub fn legend(state: &GridState) -> String {
    let mut counts: BTreeMap<&PeerId, usize> = BTreeMap::new();
    for cell in state.cells().filter(|c| c.is_set()) {
        if let Some(peer) = &cell.updated_by {
            *counts.entry(peer).or_default() += 1;
        }
    }

    let mut out = String::new();
    for (peer, name) in state.names() {
        let painted = counts.get(peer).copied().unwrap_or(0);
        let _ = writeln!(out, "{} {:<10} {:>3} cells", peer.short(), name, painted);
    }
    out
}

fn marker(state: &GridState, cell: &Cell) -> char {
    if !cell.is_set() {
        return EMPTY;
    }
    cell.updated_by
        .as_ref()
        .and_then(|peer| state.display_name(peer))
        .and_then(|name| name.chars().next())
        .unwrap_or('?')
}
