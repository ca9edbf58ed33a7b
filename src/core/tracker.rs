//! Tracker - reacts to page lifecycle signals and reports the session
//!
//! Composes a [`SessionTimer`] with a [`Reporter`]. All state changes happen
//! synchronously on the caller's thread; the network send is handed off to
//! the reporter after the duration has been fixed.

use tracing::{debug, error, info};

use super::clock::{Clock, SystemClock};
use super::config::ReopenPolicy;
use super::error::TrackError;
use super::report::{Reporter, TimeReport};
use super::session::{SessionState, SessionTimer};

/// Signals from the hosting environment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The page is about to be discarded (`beforeunload`, process exit)
    PageDiscard,
    /// Visibility toggled; `visible` is the new state
    VisibilityChanged { visible: bool },
}

pub struct Tracker<R, C = SystemClock> {
    timer: SessionTimer<C>,
    reporter: R,
    policy: ReopenPolicy,
}

impl<R: Reporter> Tracker<R, SystemClock> {
    pub fn new(reporter: R, policy: ReopenPolicy) -> Self {
        Self::with_clock(reporter, policy, SystemClock)
    }
}

impl<R: Reporter, C: Clock> Tracker<R, C> {
    pub fn with_clock(reporter: R, policy: ReopenPolicy, clock: C) -> Self {
        Self {
            timer: SessionTimer::new(clock),
            reporter,
            policy,
        }
    }

    pub fn init(&mut self, identity: &str) {
        self.timer.init(identity);
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    pub fn state(&self) -> SessionState {
        self.timer.state()
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Close the interval and send the total.
    ///
    /// Not deduplicated: a second call with no reopened interval sends the same value again.
    pub fn finalize_and_report(&mut self) {
        let total = self.timer.close();
        info!(
            user_id = self.timer.identity().unwrap_or("<unset>"),
            total_seconds = total,
            "Time tracking stopped"
        );
        self.report(total);
    }

    /// Dispatch one report for the current identity. Skipped (and logged) if no identity is set.
    pub fn report(&self, duration_seconds: u64) {
        let Some(user_id) = self.timer.identity() else {
            error!(error = %TrackError::MissingIdentity, "Cannot send time data");
            return;
        };
        self.reporter.dispatch(TimeReport::new(user_id, duration_seconds));
    }

    pub fn handle(&mut self, event: LifecycleEvent) {
        debug!(?event, state = ?self.timer.state(), "Lifecycle event");
        match event {
            LifecycleEvent::PageDiscard => self.finalize_and_report(),
            LifecycleEvent::VisibilityChanged { visible: false } => self.finalize_and_report(),
            LifecycleEvent::VisibilityChanged { visible: true } => {
                if self.policy == ReopenPolicy::OnVisible {
                    self.timer.resume();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::report::RecordingReporter;
    use crate::core::test_log::CapturedLogs;
    use std::rc::Rc;

    type TestTracker = Tracker<Rc<RecordingReporter>, ManualClock>;

    fn tracker(policy: ReopenPolicy) -> (TestTracker, Rc<RecordingReporter>, ManualClock) {
        let reporter = Rc::new(RecordingReporter::default());
        let clock = ManualClock::at(1_700_000_000_000.0);
        let tracker = Tracker::with_clock(reporter.clone(), policy, clock.clone());
        (tracker, reporter, clock)
    }

    #[test]
    fn test_hidden_then_unload_sends_duplicate() {
        let (mut t, reporter, clock) = tracker(ReopenPolicy::Never);
        t.init("user123");
        clock.advance_secs(5.0);

        t.handle(LifecycleEvent::VisibilityChanged { visible: false });
        assert_eq!(*reporter.sent.borrow(), vec![TimeReport::new("user123", 5)]);

        clock.advance_secs(3.0);
        t.handle(LifecycleEvent::PageDiscard);
        assert_eq!(
            *reporter.sent.borrow(),
            vec![TimeReport::new("user123", 5), TimeReport::new("user123", 5)]
        );
    }

    #[test]
    fn test_visible_again_does_not_reopen_by_default() {
        let (mut t, reporter, clock) = tracker(ReopenPolicy::Never);
        t.init("user123");
        clock.advance_secs(2.0);
        t.handle(LifecycleEvent::VisibilityChanged { visible: false });
        t.handle(LifecycleEvent::VisibilityChanged { visible: true });

        assert_eq!(t.state(), SessionState::Closed);
        clock.advance_secs(10.0);
        assert_eq!(t.elapsed_seconds(), 2);
        assert_eq!(reporter.sent.borrow().len(), 1);
    }

    #[test]
    fn test_on_visible_policy_accumulates_across_cycles() {
        let (mut t, reporter, clock) = tracker(ReopenPolicy::OnVisible);
        t.init("user123");
        clock.advance_secs(4.0);
        t.handle(LifecycleEvent::VisibilityChanged { visible: false });

        clock.advance_secs(60.0);
        t.handle(LifecycleEvent::VisibilityChanged { visible: true });
        assert_eq!(t.state(), SessionState::Open);

        clock.advance_secs(6.0);
        t.handle(LifecycleEvent::PageDiscard);

        let sent = reporter.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].time_spent, 4);
        assert_eq!(sent[1].time_spent, 10);
    }

    #[test]
    fn test_uninitialized_never_reports() {
        let (mut t, reporter, clock) = tracker(ReopenPolicy::Never);
        t.init("");
        clock.advance_secs(30.0);

        t.finalize_and_report();
        t.handle(LifecycleEvent::PageDiscard);
        t.report(42);

        assert!(reporter.sent.borrow().is_empty());
        assert_eq!(t.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_report_without_identity_logs_one_error() {
        let logs = CapturedLogs::default();
        let (mut t, reporter, clock) = tracker(ReopenPolicy::Never);

        tracing::subscriber::with_default(logs.subscriber(), || {
            clock.advance_secs(5.0);
            t.finalize_and_report();
        });

        assert!(reporter.sent.borrow().is_empty());
        let errors = logs.errors();
        assert_eq!(errors.len(), 1, "{}", logs.contents());
        assert!(errors[0].contains("user ID is required"), "{}", errors[0]);
    }

    #[test]
    fn test_visible_event_while_uninitialized_is_ignored() {
        let (mut t, reporter, _clock) = tracker(ReopenPolicy::OnVisible);
        t.handle(LifecycleEvent::VisibilityChanged { visible: true });

        assert_eq!(t.state(), SessionState::Uninitialized);
        assert!(reporter.sent.borrow().is_empty());
    }

    #[test]
    fn test_report_uses_given_duration() {
        let (mut t, reporter, _clock) = tracker(ReopenPolicy::Never);
        t.init("user123");
        t.report(42);

        assert_eq!(*reporter.sent.borrow(), vec![TimeReport::new("user123", 42)]);
        // Reporting alone leaves the interval open
        assert_eq!(t.state(), SessionState::Open);
    }
}
