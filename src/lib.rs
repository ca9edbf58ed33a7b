//! Page time tracker
//!
//! Measures how long a user stays active on a page and reports the duration
//! to a collector endpoint when the page is hidden or discarded:
//! - `core`: session state machine, lifecycle handling, payload, config
//! - `http_native`: reqwest reporter for the CLI (feature `cli`)
//! - `http_wasm` / `web`: fetch reporter and JS bindings (feature `wasm`)

pub mod core;
mod time;

#[cfg(all(feature = "cli", not(target_arch = "wasm32")))]
pub mod http_native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod http_wasm;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod web;

pub use crate::core::{
    LifecycleEvent, ReopenPolicy, Reporter, SessionState, TimeReport, TrackError, Tracker,
    TrackerConfig,
};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use web::TimeTracker;
