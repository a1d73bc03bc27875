use super::intent::Intent;
use super::state::UiState;

/// Pure transition function for one view.
///
/// No I/O and no clocks: controllers perform requests and feed the outcome
/// back in as an intent.
pub trait Reducer {
    type State: UiState;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
