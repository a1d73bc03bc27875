//! Polling synchronizer and the ordering/cancellation primitives it uses.
//!
//! Server push is not available, so views re-fetch on a timer. Each view
//! owns a [`CancelToken`]; tearing the view down stops further polls and
//! suppresses results still in flight. A [`Sequencer`] per resource drops
//! responses that arrive out of order.

mod cancel;
mod poller;
mod sequence;

pub use cancel::CancelToken;
pub use poller::{PollHandle, Poller};
pub use sequence::{Sequencer, Ticket};
