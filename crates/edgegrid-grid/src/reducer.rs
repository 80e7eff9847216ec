//! The grid reducer.
//!
//! Two effective transitions (`UpdateCell`, `SetUserName`) and a
//! pass-through default. Invalid input never fails: an unstamped action,
//! out-of-range coordinates or an unknown type return the input state.

use edgegrid_core::{EdgeAction, Reducer};
use tracing::trace;

use crate::{GridAction, GridState, GRID_SIZE};

/// [`Reducer`] implementation for the shared grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridReducer;

impl Reducer for GridReducer {
    type State = GridState;
    type Action = GridAction;

    fn initial_state(&self) -> GridState {
        GridState::new()
    }

    fn reduce(&self, state: &GridState, action: &EdgeAction<GridAction>) -> GridState {
        reduce(state, action)
    }
}

/// Apply one stamped action to `state`.
pub fn reduce(state: &GridState, action: &EdgeAction<GridAction>) -> GridState {
    let Some(peer) = action.sender() else {
        trace!(kind = action.action.kind(), "Dropping action without sender identity");
        return state.clone();
    };

    match &action.action {
        GridAction::SetUserName { name } => state.with_name(peer, name),
        GridAction::UpdateCell { x, y, value } => match (in_bounds(*x), in_bounds(*y)) {
            (Some(row), Some(col)) => state.with_cell(row, col, value.clone(), peer),
            _ => {
                trace!(x = *x, y = *y, peer = %peer, "Dropping out-of-bounds cell update");
                state.clone()
            }
        },
        GridAction::Unknown { kind } => {
            trace!(kind = %kind, "Ignoring unknown action type");
            state.clone()
        }
    }
}

fn in_bounds(coord: i64) -> Option<usize> {
    usize::try_from(coord).ok().filter(|&c| c < GRID_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use edgegrid_core::{replay, PeerId};
    use proptest::prelude::*;

    fn peer(id: &str) -> PeerId {
        PeerId::new(id).unwrap()
    }

    fn color(s: &str) -> Color {
        Color::parse(s).unwrap()
    }

    #[test]
    fn paint_cell_scenario() {
        let state = GridState::new();
        let action = EdgeAction::stamped(GridAction::paint(2, 3, color("#ff0000")), peer("peerA"));

        let next = reduce(&state, &action);

        let cell = next.cell(2, 3).unwrap();
        assert_eq!(cell.value, Some(color("#ff0000")));
        assert_eq!(cell.updated_by, Some(peer("peerA")));

        let neighbour = next.cell(2, 4).unwrap();
        assert_eq!(neighbour.value, None);
        assert_eq!(neighbour.updated_by, None);
    }

    #[test]
    fn out_of_bounds_scenario() {
        let state = GridState::new();
        let action = EdgeAction::stamped(GridAction::paint(10, 0, color("#000")), peer("peerA"));

        assert_eq!(reduce(&state, &action), state);
    }

    #[test]
    fn rename_scenario() {
        let bea = EdgeAction::stamped(GridAction::set_name("Bea"), peer("peerB"));
        let beatrice = EdgeAction::stamped(GridAction::set_name("Beatrice"), peer("peerB"));

        let state = replay(&GridReducer, [&bea, &beatrice]);

        assert_eq!(state.display_name(&peer("peerB")), Some("Beatrice"));
        assert_eq!(state.names().len(), 1);
    }

    #[test]
    fn unknown_action_is_ignored() {
        let state = GridState::new().with_name(&peer("a"), "Ada");
        let action = EdgeAction::stamped(
            GridAction::Unknown {
                kind: "RESET_GRID".to_string(),
            },
            peer("a"),
        );

        assert_eq!(reduce(&state, &action), state);
    }

    #[test]
    fn clearing_records_the_writer() {
        let painted = reduce(
            &GridState::new(),
            &EdgeAction::stamped(GridAction::paint(0, 0, color("#fff")), peer("a")),
        );
        let cleared = reduce(
            &painted,
            &EdgeAction::stamped(GridAction::clear(0, 0), peer("b")),
        );

        let cell = cleared.cell(0, 0).unwrap();
        assert_eq!(cell.value, None);
        assert_eq!(cell.updated_by, Some(peer("b")));
    }

    #[test]
    fn update_shares_untouched_rows() {
        let state = GridState::new();
        let next = reduce(
            &state,
            &EdgeAction::stamped(GridAction::paint(5, 5, color("#abc")), peer("a")),
        );

        assert!(!state.shares_row(&next, 5));
        assert!((0..GRID_SIZE).filter(|&x| x != 5).all(|x| state.shares_row(&next, x)));
    }

    #[test]
    fn input_state_is_not_mutated() {
        let state = GridState::new();
        let snapshot = state.clone();
        let _ = reduce(
            &state,
            &EdgeAction::stamped(GridAction::paint(1, 1, color("#111")), peer("a")),
        );
        let _ = reduce(&state, &EdgeAction::stamped(GridAction::set_name("A"), peer("a")));

        assert_eq!(state, snapshot);
    }

    fn arb_color() -> impl Strategy<Value = Color> {
        prop_oneof![
            "#[0-9a-f]{3}".prop_map(|s| color(&s)),
            "#[0-9a-f]{6}".prop_map(|s| color(&s)),
        ]
    }

    fn arb_peer() -> impl Strategy<Value = PeerId> {
        "peer[A-E]".prop_map(|s| peer(&s))
    }

    fn arb_action() -> impl Strategy<Value = GridAction> {
        prop_oneof![
            (-3i64..13, -3i64..13, proptest::option::of(arb_color()))
                .prop_map(|(x, y, value)| GridAction::UpdateCell { x, y, value }),
            "[A-Za-z]{0,8}".prop_map(|name| GridAction::set_name(name)),
            "[A-Z_]{1,12}".prop_map(|kind| GridAction::Unknown { kind }),
        ]
    }

    fn arb_stamped() -> impl Strategy<Value = EdgeAction<GridAction>> {
        (arb_action(), proptest::option::of(arb_peer())).prop_map(|(action, peer_id)| EdgeAction {
            action,
            peer_id,
        })
    }

    fn arb_state() -> impl Strategy<Value = GridState> {
        proptest::collection::vec(arb_stamped(), 0..40)
            .prop_map(|log| replay(&GridReducer, &log))
    }

    proptest! {
        #[test]
        fn unstamped_actions_are_noops(state in arb_state(), action in arb_action()) {
            let next = reduce(&state, &EdgeAction::unsigned(action));
            prop_assert_eq!(next, state);
        }

        #[test]
        fn in_bounds_update_touches_one_cell(
            state in arb_state(),
            x in 0i64..10,
            y in 0i64..10,
            value in proptest::option::of(arb_color()),
            sender in arb_peer(),
        ) {
            let action = EdgeAction::stamped(
                GridAction::UpdateCell { x, y, value: value.clone() },
                sender.clone(),
            );
            let next = reduce(&state, &action);

            let cell = next.cell(x as usize, y as usize).unwrap();
            prop_assert_eq!(&cell.value, &value);
            prop_assert_eq!(cell.updated_by.as_ref(), Some(&sender));

            for (old, new) in state.cells().zip(next.cells()) {
                if (old.x, old.y) != (x as usize, y as usize) {
                    prop_assert_eq!(old, new);
                }
            }
            prop_assert_eq!(next.names(), state.names());
        }

        #[test]
        fn out_of_bounds_update_is_noop(
            state in arb_state(),
            x in prop_oneof![i64::MIN..0, 10i64..i64::MAX],
            y in -20i64..20,
            value in proptest::option::of(arb_color()),
            sender in arb_peer(),
        ) {
            let action = EdgeAction::stamped(GridAction::UpdateCell { x, y, value }, sender);
            let swapped = EdgeAction::stamped(
                GridAction::UpdateCell { x: y, y: x, value: None },
                peer("peerZ"),
            );

            prop_assert_eq!(reduce(&state, &action), state.clone());
            prop_assert_eq!(reduce(&state, &swapped), state);
        }

        #[test]
        fn set_user_name_binds_only_sender(
            state in arb_state(),
            name in "[A-Za-z ]{0,16}",
            sender in arb_peer(),
        ) {
            let next = reduce(&state, &EdgeAction::stamped(GridAction::set_name(name.clone()), sender.clone()));

            prop_assert_eq!(next.display_name(&sender), Some(name.as_str()));
            for (peer, old_name) in state.names() {
                if *peer != sender {
                    prop_assert_eq!(next.display_name(peer), Some(old_name.as_str()));
                }
            }
            prop_assert!(state.diff(&next).is_empty());
        }

        #[test]
        fn replaying_an_applied_action_is_idempotent(state in arb_state(), action in arb_stamped()) {
            let once = reduce(&state, &action);
            let twice = reduce(&once, &action);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn replicas_agree_on_the_same_log(log in proptest::collection::vec(arb_stamped(), 0..60)) {
            let a = replay(&GridReducer, &log);
            let b = replay(&GridReducer, &log);
            prop_assert_eq!(&a, &b);

            for (x, row) in a.rows().enumerate() {
                for (y, cell) in row.iter().enumerate() {
                    prop_assert_eq!((cell.x, cell.y), (x, y));
                }
            }
        }
    }
}
