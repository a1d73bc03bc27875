//! Finding people.
//!
//! Two independent paths: a synchronous substring filter over a list the
//! view already holds, and a debounced server-side quick search.

mod filter;
mod quick;

pub use filter::{filter, Searchable};
pub use quick::{QuickSearch, Suggestions};
