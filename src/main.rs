//! Standalone CLI driving a tracked session against a collector
//!
//! Run with: cargo run --bin tracker-cli
//!
//! Stdin commands stand in for the browser signals: `hidden`, `visible`,
//! `unload`. Ctrl-C or end of input is treated as `unload`.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use page_time_tracker::http_native::HttpReporter;
    use page_time_tracker::{LifecycleEvent, SessionState, Tracker, TrackerConfig};
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tracing::{info, warn};
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,page_time_tracker=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let mut config = TrackerConfig::from_env();
    if config.endpoint.starts_with('/') {
        // No page origin natively; assume a local collector
        config.endpoint = format!("http://127.0.0.1:8080{}", config.endpoint);
    }
    let user_id = TrackerConfig::user_from_env();

    info!(endpoint = %config.endpoint, timeout_ms = config.request_timeout_ms, policy = ?config.reopen_policy, "Starting tracker");
    let reporter = HttpReporter::on_current_runtime(&config)?;
    let mut tracker = Tracker::new(reporter, config.reopen_policy);
    tracker.init(&user_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stats_interval = tokio::time::interval(std::time::Duration::from_secs(5));
    // Registered once so a SIGINT between select passes is not lost
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let event = match line {
                    Ok(Some(cmd)) => match cmd.trim() {
                        "hidden" => LifecycleEvent::VisibilityChanged { visible: false },
                        "visible" => LifecycleEvent::VisibilityChanged { visible: true },
                        "unload" => LifecycleEvent::PageDiscard,
                        "" => continue,
                        other => {
                            warn!(command = other, "Unknown command (hidden|visible|unload)");
                            continue;
                        }
                    },
                    Ok(None) => LifecycleEvent::PageDiscard,
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        LifecycleEvent::PageDiscard
                    }
                };
                tracker.handle(event);
                if event == LifecycleEvent::PageDiscard {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracker.handle(LifecycleEvent::PageDiscard);
                break;
            }
            _ = stats_interval.tick() => {
                info!(
                    elapsed = tracker.elapsed_seconds(),
                    open = tracker.state() == SessionState::Open,
                    in_flight = tracker.reporter().in_flight(),
                    "stats"
                );
            }
        }
    }

    info!(in_flight = tracker.reporter().in_flight(), "Waiting for reports");
    tracker.reporter().drain().await;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
