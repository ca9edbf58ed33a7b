//! Session interval state machine
//!
//! One `TrackingSession` per page load: an identity, an optional open
//! interval, and the seconds already folded in from closed intervals.

use tracing::{debug, error, info, warn};

use super::clock::{Clock, SystemClock};
use super::error::TrackError;

/// Where the session interval currently stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No identity yet; nothing is being measured
    Uninitialized,
    /// Interval open, time is accumulating
    Open,
    /// Interval folded into the total
    Closed,
}

/// Raw session record
#[derive(Clone, Debug, Default)]
pub struct TrackingSession {
    identity: Option<String>,
    /// Start of the open interval in wall-clock ms, `None` while closed
    started_at: Option<f64>,
    accumulated_seconds: u64,
}

impl TrackingSession {
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn started_at(&self) -> Option<f64> {
        self.started_at
    }

    pub fn accumulated_seconds(&self) -> u64 {
        self.accumulated_seconds
    }
}

/// Measures how long one user stays on the page
pub struct SessionTimer<C = SystemClock> {
    clock: C,
    session: TrackingSession,
}

impl Default for SessionTimer<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> SessionTimer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            session: TrackingSession::default(),
        }
    }

    /// Set the identity and open the first interval.
    ///
    /// An empty identity is logged and leaves the timer `Uninitialized`.
    pub fn init(&mut self, identity: &str) {
        if let Err(e) = self.try_init(identity) {
            error!(error = %e, "Cannot start time tracking");
        }
    }

    fn try_init(&mut self, identity: &str) -> Result<(), TrackError> {
        if identity.is_empty() {
            return Err(TrackError::MissingIdentity);
        }
        if let Some(current) = self.session.identity() {
            warn!(current, ignored = identity, "Time tracking already initialized");
            return Ok(());
        }

        self.session.identity = Some(identity.to_string());
        self.session.started_at = Some(self.clock.now_millis());
        info!(user_id = identity, "Time tracking started");
        Ok(())
    }

    /// Seconds tracked so far, including the open interval. Never mutates.
    pub fn elapsed_seconds(&self) -> u64 {
        let Some(started_at) = self.session.started_at else {
            return self.session.accumulated_seconds;
        };

        let delta_ms = self.clock.now_millis() - started_at;
        if delta_ms < 0.0 {
            debug!(delta_ms, "Clock moved backwards, clamping interval to zero");
        }
        let interval = (delta_ms.max(0.0) / 1000.0).floor() as u64;
        self.session.accumulated_seconds.saturating_add(interval)
    }

    /// Fold the open interval into the total and close it. Returns the total.
    pub fn close(&mut self) -> u64 {
        let total = self.elapsed_seconds();
        self.session.accumulated_seconds = total;
        self.session.started_at = None;
        total
    }

    /// Reopen a closed interval. Only `Closed` sessions move; returns whether one did.
    pub fn resume(&mut self) -> bool {
        if self.state() != SessionState::Closed {
            return false;
        }
        self.session.started_at = Some(self.clock.now_millis());
        debug!(
            accumulated = self.session.accumulated_seconds,
            "Time tracking resumed"
        );
        true
    }

    pub fn state(&self) -> SessionState {
        match (&self.session.identity, self.session.started_at) {
            (None, _) => SessionState::Uninitialized,
            (Some(_), Some(_)) => SessionState::Open,
            (Some(_), None) => SessionState::Closed,
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.session.identity()
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;

    fn timer_at_zero() -> (SessionTimer<ManualClock>, ManualClock) {
        let clock = ManualClock::at(1_700_000_000_000.0);
        (SessionTimer::new(clock.clone()), clock)
    }

    #[test]
    fn test_init_opens_interval_at_zero() {
        let (mut timer, _clock) = timer_at_zero();
        timer.init("user123");

        assert_eq!(timer.state(), SessionState::Open);
        assert_eq!(timer.identity(), Some("user123"));
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn test_empty_identity_stays_uninitialized() {
        let (mut timer, clock) = timer_at_zero();
        timer.init("");
        clock.advance_secs(10.0);

        assert_eq!(timer.state(), SessionState::Uninitialized);
        assert_eq!(timer.identity(), None);
        assert_eq!(timer.session().started_at(), None);
        assert_eq!(timer.elapsed_seconds(), 0);
    }

    #[test]
    fn test_elapsed_floors_to_whole_seconds() {
        let (mut timer, clock) = timer_at_zero();
        timer.init("user123");

        clock.advance_millis(999.0);
        assert_eq!(timer.elapsed_seconds(), 0);
        clock.advance_millis(1.0);
        assert_eq!(timer.elapsed_seconds(), 1);
        clock.advance_millis(41_500.0);
        assert_eq!(timer.elapsed_seconds(), 42);
    }

    #[test]
    fn test_elapsed_does_not_mutate() {
        let (mut timer, clock) = timer_at_zero();
        timer.init("user123");
        clock.advance_secs(3.0);

        let _ = timer.elapsed_seconds();
        let _ = timer.elapsed_seconds();
        assert_eq!(timer.session().accumulated_seconds(), 0);
        assert_eq!(timer.state(), SessionState::Open);
    }

    #[test]
    fn test_backward_clock_clamps_to_zero() {
        let (mut timer, clock) = timer_at_zero();
        timer.init("user123");
        clock.advance_secs(-30.0);

        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.close(), 0);
    }

    #[test]
    fn test_close_freezes_total() {
        let (mut timer, clock) = timer_at_zero();
        timer.init("user123");
        clock.advance_secs(5.0);

        assert_eq!(timer.close(), 5);
        assert_eq!(timer.state(), SessionState::Closed);

        clock.advance_secs(100.0);
        assert_eq!(timer.elapsed_seconds(), 5);
        assert_eq!(timer.elapsed_seconds(), 5);
        assert_eq!(timer.close(), 5);
    }

    #[test]
    fn test_accumulated_never_decreases() {
        let (mut timer, clock) = timer_at_zero();
        timer.init("user123");
        clock.advance_secs(7.0);
        timer.close();
        assert!(timer.resume());

        clock.advance_secs(-60.0);
        assert_eq!(timer.close(), 7);
        assert_eq!(timer.session().accumulated_seconds(), 7);
    }

    #[test]
    fn test_resume_only_from_closed() {
        let (mut timer, clock) = timer_at_zero();
        assert!(!timer.resume());

        timer.init("user123");
        assert!(!timer.resume());

        clock.advance_secs(2.0);
        timer.close();
        clock.advance_secs(60.0);
        assert!(timer.resume());
        assert_eq!(timer.state(), SessionState::Open);

        clock.advance_secs(3.0);
        assert_eq!(timer.elapsed_seconds(), 5);
    }

    #[test]
    fn test_second_init_keeps_first_identity() {
        let (mut timer, clock) = timer_at_zero();
        timer.init("user123");
        clock.advance_secs(4.0);
        timer.init("someone-else");

        assert_eq!(timer.identity(), Some("user123"));
        assert_eq!(timer.elapsed_seconds(), 4);
    }

    #[test]
    fn test_close_uninitialized_is_harmless() {
        let (mut timer, _clock) = timer_at_zero();
        assert_eq!(timer.close(), 0);
        assert_eq!(timer.state(), SessionState::Uninitialized);
    }
}
