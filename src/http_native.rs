//! Native HTTP reporter for the collector endpoint
//!
//! Each report is one `reqwest` POST spawned onto a tokio runtime. The caller
//! returns immediately; the outcome is only logged.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::core::{classify_status, Reporter, TimeReport, TrackError, TrackerConfig};

/// POST one report. No retry; `timeout` bounds the whole request.
pub async fn send_report(
    client: &reqwest::Client,
    endpoint: &str,
    report: &TimeReport,
    timeout: Duration,
) -> Result<(), TrackError> {
    debug!(endpoint, user_id = %report.user_id, time_spent = report.time_spent, "Sending time data");

    let response = client
        .post(endpoint)
        .timeout(timeout)
        .json(report)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                TrackError::Timeout(timeout.as_millis() as u64)
            } else {
                TrackError::Transport(e.to_string())
            }
        })?;

    let status = response.status();
    classify_status(status.as_u16(), status.canonical_reason().unwrap_or(""))
}

/// Fire-and-forget reporter backed by a tokio runtime
pub struct HttpReporter {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    runtime: Handle,
    /// Sends that may still be running, so the process can wait for them before exit
    in_flight: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl HttpReporter {
    pub fn new(config: &TrackerConfig, runtime: Handle) -> Result<Self, TrackError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TrackError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_millis(config.request_timeout_ms),
            runtime,
            in_flight: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Build on the runtime this is called from.
    pub fn on_current_runtime(config: &TrackerConfig) -> Result<Self, TrackError> {
        let runtime = Handle::try_current()
            .map_err(|e| TrackError::InvalidConfig(format!("no tokio runtime: {e}")))?;
        Self::new(config, runtime)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Number of sends not yet known to be finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every issued send to finish. Bounded by the request timeout.
    pub async fn drain(&self) {
        let handles = std::mem::take(&mut *self.in_flight.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Report task failed");
            }
        }
    }
}

impl Reporter for HttpReporter {
    fn dispatch(&self, report: TimeReport) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;

        let handle = self.runtime.spawn(async move {
            match send_report(&client, &endpoint, &report, timeout).await {
                Ok(()) => info!(
                    user_id = %report.user_id,
                    time_spent = report.time_spent,
                    "Time data sent successfully"
                ),
                Err(e) => error!(
                    error = %e,
                    user_id = %report.user_id,
                    time_spent = report.time_spent,
                    "Failed to send time data"
                ),
            }
        });

        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }
}
