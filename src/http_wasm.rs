//! Browser reporter using `fetch`
//!
//! Requests go out with `keepalive` so they can outlive the page, and an
//! `AbortController` armed with `setTimeout` bounds how long we wait.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

use crate::core::{classify_status, Reporter, TimeReport, TrackError, TrackerConfig};

fn js_err(e: JsValue) -> TrackError {
    TrackError::Transport(format!("{e:?}"))
}

/// POST one report through `window.fetch`. No retry.
pub async fn post_report(
    endpoint: &str,
    report: &TimeReport,
    timeout_ms: u32,
) -> Result<(), TrackError> {
    let window = web_sys::window().ok_or_else(|| TrackError::Transport("no window".into()))?;
    let body = report.to_json()?;
    debug!(endpoint, body = %body, "Sending time data");

    let headers = Headers::new().map_err(js_err)?;
    headers
        .set("Content-Type", "application/json")
        .map_err(js_err)?;

    let controller = AbortController::new().map_err(js_err)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));
    init.set_keepalive(true);
    init.set_signal(Some(&controller.signal()));
    let request = Request::new_with_str_and_init(endpoint, &init).map_err(js_err)?;

    let timed_out = Rc::new(Cell::new(false));
    let on_timeout = {
        let timed_out = timed_out.clone();
        Closure::once(move || {
            timed_out.set(true);
            controller.abort();
        })
    };
    let timer = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            on_timeout.as_ref().unchecked_ref(),
            timeout_ms.min(i32::MAX as u32) as i32,
        )
        .map_err(js_err)?;

    let result = JsFuture::from(window.fetch_with_request(&request)).await;
    window.clear_timeout_with_handle(timer);
    drop(on_timeout);

    let response: Response = match result {
        Ok(value) => value.dyn_into().map_err(js_err)?,
        Err(_) if timed_out.get() => return Err(TrackError::Timeout(timeout_ms as u64)),
        Err(e) => return Err(js_err(e)),
    };

    classify_status(response.status(), &response.status_text())
}

/// Fire-and-forget reporter for the browser event loop
pub struct FetchReporter {
    endpoint: String,
    timeout_ms: u32,
}

impl FetchReporter {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            timeout_ms: config.request_timeout_ms.min(u32::MAX as u64) as u32,
        }
    }
}

impl Reporter for FetchReporter {
    fn dispatch(&self, report: TimeReport) {
        let endpoint = self.endpoint.clone();
        let timeout_ms = self.timeout_ms;

        wasm_bindgen_futures::spawn_local(async move {
            match post_report(&endpoint, &report, timeout_ms).await {
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
    }
}
