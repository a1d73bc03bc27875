//! Client core for the Campus Connect social network.
//!
//! Every view is a thin layer over the remote REST backend. The shared
//! machinery lives in [`sync`] (polling with cancellation and stale-result
//! discard), [`mutation`] (optimistic follow toggling behind an in-flight
//! guard) and [`search`] (client-side filter and debounced quick search).

pub mod api;
pub mod app;
pub mod config;
pub mod logging;
pub mod mutation;
pub mod notice;
pub mod search;
pub mod session;
pub mod storage;
pub mod sync;
pub mod ui;
pub mod validation;
