//! The reducer contract shared by every replica.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::EdgeAction;

/// A pure, deterministic state transition function.
///
/// Every peer in a topic runs the same reducer over the same ordered stream
/// of actions. Implementations must not perform I/O, read clocks, draw random
/// numbers or mutate the input state; invalid input yields the input state.
pub trait Reducer: Send + Sync + 'static {
    /// Replicated state. Cloned on every snapshot, so keep it cheap to clone.
    type State: Clone + PartialEq + Send + Sync + 'static;

    /// Intent type carried on the wire.
    type Action: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// State every replica starts from.
    fn initial_state(&self) -> Self::State;

    /// Apply one stamped action, returning the next state.
    fn reduce(&self, state: &Self::State, action: &EdgeAction<Self::Action>) -> Self::State;
}

/// Fold an ordered action log from the reducer's initial state.
pub fn replay<'a, R, I>(reducer: &R, actions: I) -> R::State
where
    R: Reducer,
    I: IntoIterator<Item = &'a EdgeAction<R::Action>>,
{
    actions
        .into_iter()
        .fold(reducer.initial_state(), |state, action| {
            reducer.reduce(&state, action)
        })
}
