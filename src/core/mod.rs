//! Platform-agnostic core module - shared between the browser build and the CLI

pub mod clock;
pub mod config;
pub mod error;
pub mod report;
pub mod session;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_log;

pub use clock::{Clock, SystemClock};
pub use config::{ReopenPolicy, TrackerConfig};
pub use error::TrackError;
pub use report::{classify_status, Reporter, TimeReport, TRACKING_API_PATH};
pub use session::{SessionState, SessionTimer, TrackingSession};
pub use tracker::{LifecycleEvent, Tracker};
