//! Model-View-Intent primitives shared by every view.
//!
//! ```text
//! user input / request outcome ──→ Intent ──→ Reducer ──→ State ──→ render
//!        ↑                                                  │
//!        └──────────────── controller side effects ─────────┘
//! ```
//!
//! - **State**: the view's data, cloneable and comparable
//! - **Intent**: what happened
//! - **Reducer**: pure `(State, Intent) -> State`
//! - **ViewStore**: the lock-guarded state a controller and its background
//!   tasks share

mod intent;
mod reducer;
mod state;
mod store;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
pub use store::ViewStore;
