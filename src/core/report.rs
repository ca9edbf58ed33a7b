//! Wire payload for the collector endpoint and the reporter seam

use serde::{Deserialize, Serialize};

use super::error::TrackError;

/// Collector path, relative to the page origin
pub const TRACKING_API_PATH: &str = "/api/track_time";

/// Body of `POST /api/track_time`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeReport {
    pub user_id: String,
    /// Whole seconds
    pub time_spent: u64,
}

impl TimeReport {
    pub fn new(user_id: impl Into<String>, time_spent: u64) -> Self {
        Self {
            user_id: user_id.into(),
            time_spent,
        }
    }

    pub fn to_json(&self) -> Result<String, TrackError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Delivers reports to the collector.
///
/// `dispatch` is fire-and-forget: it returns before the request completes and
/// never reports failure to the caller. Implementations log the outcome.
pub trait Reporter {
    fn dispatch(&self, report: TimeReport);
}

impl<R: Reporter + ?Sized> Reporter for std::rc::Rc<R> {
    fn dispatch(&self, report: TimeReport) {
        (**self).dispatch(report)
    }
}

/// 2xx is delivered, anything else is a failure.
pub fn classify_status(status: u16, reason: &str) -> Result<(), TrackError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(TrackError::Status {
            status,
            reason: reason.to_string(),
        })
    }
}

/// Reporter that keeps every dispatched report, for tests
#[cfg(test)]
#[derive(Default)]
pub struct RecordingReporter {
    pub sent: std::cell::RefCell<Vec<TimeReport>>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn dispatch(&self, report: TimeReport) {
        self.sent.borrow_mut().push(report);
    }
}
