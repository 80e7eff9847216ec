//! Grid actions and their wire form.
//!
//! ```text
//! {"type":"UPDATE_CELL","payload":{"x":2,"y":3,"value":"#ff0000"}}
//! {"type":"SET_USER_NAME","payload":{"name":"Bea"}}
//! ```
//!
//! An unrecognised `type` decodes to [`GridAction::Unknown`] so that newer
//! peers cannot knock older replicas off the stream. A recognised `type` with
//! a malformed payload is a decode error.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::Color;

/// Wire tag for [`GridAction::UpdateCell`].
pub const UPDATE_CELL: &str = "UPDATE_CELL";

/// Wire tag for [`GridAction::SetUserName`].
pub const SET_USER_NAME: &str = "SET_USER_NAME";

/// An intent to change the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAction", into = "RawAction")]
pub enum GridAction {
    /// Paint (or clear, with `None`) the cell at `(x, y)`.
    ///
    /// Coordinates are signed so out-of-range values reach the reducer.
    UpdateCell {
        x: i64,
        y: i64,
        value: Option<Color>,
    },

    /// Register or replace the sender's display name.
    SetUserName { name: String },

    /// Any other action type.
    Unknown { kind: String },
}

impl GridAction {
    /// Paint a cell.
    pub fn paint(x: i64, y: i64, color: Color) -> Self {
        Self::UpdateCell {
            x,
            y,
            value: Some(color),
        }
    }

    /// Clear a cell.
    pub fn clear(x: i64, y: i64) -> Self {
        Self::UpdateCell { x, y, value: None }
    }

    /// Set the sender's display name.
    pub fn set_name(name: impl Into<String>) -> Self {
        Self::SetUserName { name: name.into() }
    }

    /// Wire tag of this action.
    pub fn kind(&self) -> &str {
        match self {
            Self::UpdateCell { .. } => UPDATE_CELL,
            Self::SetUserName { .. } => SET_USER_NAME,
            Self::Unknown { kind } => kind.as_str(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    payload: Value,
}

#[derive(Deserialize)]
struct UpdateCellPayload {
    x: i64,
    y: i64,
    #[serde(default)]
    value: Option<Color>,
}

#[derive(Deserialize)]
struct SetUserNamePayload {
    name: String,
}

impl TryFrom<RawAction> for GridAction {
    type Error = serde_json::Error;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            UPDATE_CELL => {
                let p: UpdateCellPayload = serde_json::from_value(raw.payload)?;
                Ok(Self::UpdateCell {
                    x: p.x,
                    y: p.y,
                    value: p.value,
                })
            }
            SET_USER_NAME => {
                let p: SetUserNamePayload = serde_json::from_value(raw.payload)?;
                Ok(Self::SetUserName { name: p.name })
            }
            _ => Ok(Self::Unknown { kind: raw.kind }),
        }
    }
}

impl From<GridAction> for RawAction {
    fn from(action: GridAction) -> Self {
        match action {
            GridAction::UpdateCell { x, y, value } => RawAction {
                kind: UPDATE_CELL.to_string(),
                payload: json!({ "x": x, "y": y, "value": value }),
            },
            GridAction::SetUserName { name } => RawAction {
                kind: SET_USER_NAME.to_string(),
                payload: json!({ "name": name }),
            },
            GridAction::Unknown { kind } => RawAction {
                kind,
                payload: Value::Null,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgegrid_core::{EdgeAction, PeerId};

    #[test]
    fn update_cell_wire_format() {
        let action = GridAction::paint(2, 3, Color::parse("#ff0000").unwrap());
        let value = serde_json::to_value(&action).unwrap();

        assert_eq!(
            value,
            json!({ "type": "UPDATE_CELL", "payload": { "x": 2, "y": 3, "value": "#ff0000" } })
        );
    }

    #[test]
    fn stamped_set_user_name_decodes() {
        let action: EdgeAction<GridAction> = serde_json::from_value(json!({
            "type": "SET_USER_NAME",
            "payload": { "name": "Bea" },
            "peerId": "peerB",
        }))
        .unwrap();

        assert_eq!(action.action, GridAction::set_name("Bea"));
        assert_eq!(action.sender(), Some(&PeerId::new("peerB").unwrap()));
    }

    #[test]
    fn null_value_clears() {
        let action: GridAction = serde_json::from_value(json!({
            "type": "UPDATE_CELL",
            "payload": { "x": 0, "y": 0, "value": null },
        }))
        .unwrap();
        assert_eq!(action, GridAction::clear(0, 0));
    }

    #[test]
    fn out_of_range_coordinates_still_decode() {
        let action: GridAction = serde_json::from_value(json!({
            "type": "UPDATE_CELL",
            "payload": { "x": -1, "y": 10, "value": "#000" },
        }))
        .unwrap();
        assert!(matches!(action, GridAction::UpdateCell { x: -1, y: 10, .. }));
    }

    #[test]
    fn unknown_type_decodes_as_unknown() {
        let action: GridAction = serde_json::from_value(json!({
            "type": "RESET_GRID",
            "payload": { "anything": [1, 2, 3] },
        }))
        .unwrap();

        assert_eq!(action.kind(), "RESET_GRID");
        assert!(matches!(action, GridAction::Unknown { .. }));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let bad_color = serde_json::from_value::<GridAction>(json!({
            "type": "UPDATE_CELL",
            "payload": { "x": 1, "y": 1, "value": "not-a-color" },
        }));
        assert!(bad_color.is_err());

        let missing_name = serde_json::from_value::<GridAction>(json!({
            "type": "SET_USER_NAME",
            "payload": {},
        }));
        assert!(missing_name.is_err());
    }
}
