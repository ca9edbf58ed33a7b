//! Browser bindings
//!
//! Exposes `TimeTracker` to JavaScript and wires it to `beforeunload` and
//! `visibilitychange`:
//!
//! ```js
//! const tracker = new TimeTracker();
//! tracker.init("user123");
//! tracker.attachListeners();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, VisibilityState};

use crate::core::{LifecycleEvent, Tracker, TrackerConfig};
use crate::http_wasm::FetchReporter;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();
}

#[wasm_bindgen]
pub struct TimeTracker {
    inner: Rc<RefCell<Tracker<FetchReporter>>>,
}

#[wasm_bindgen]
impl TimeTracker {
    /// Tracker posting to `endpoint`, or `/api/track_time` on the page origin.
    #[wasm_bindgen(constructor)]
    pub fn new(endpoint: Option<String>) -> TimeTracker {
        let mut config = TrackerConfig::default();
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            config.endpoint = endpoint;
        }
        Self::from_config(&config)
    }

    /// Tracker from a JSON `TrackerConfig`; missing fields take their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<TimeTracker, JsValue> {
        let config = TrackerConfig::from_json(json).map_err(|e| {
            error!(error = %e, "Rejected tracker config");
            JsValue::from_str(&e.to_string())
        })?;
        Ok(Self::from_config(&config))
    }

    fn from_config(config: &TrackerConfig) -> TimeTracker {
        let reporter = FetchReporter::new(config);
        TimeTracker {
            inner: Rc::new(RefCell::new(Tracker::new(reporter, config.reopen_policy))),
        }
    }

    /// Start tracking. A missing or empty ID is logged and nothing starts.
    pub fn init(&self, user_id: Option<String>) {
        self.inner
            .borrow_mut()
            .init(user_id.as_deref().unwrap_or(""));
    }

    #[wasm_bindgen(js_name = elapsedSeconds)]
    pub fn elapsed_seconds(&self) -> f64 {
        self.inner.borrow().elapsed_seconds() as f64
    }

    #[wasm_bindgen(js_name = stopTracking)]
    pub fn stop_tracking(&self) {
        self.inner.borrow_mut().finalize_and_report();
    }

    /// Register the page lifecycle hooks. They stay for the lifetime of the page.
    #[wasm_bindgen(js_name = attachListeners)]
    pub fn attach_listeners(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let tracker = self.inner.clone();
        let on_unload = Closure::wrap(Box::new(move |_: Event| {
            tracker.borrow_mut().handle(LifecycleEvent::PageDiscard);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())?;
        on_unload.forget();

        let tracker = self.inner.clone();
        let doc = document.clone();
        let on_visibility = Closure::wrap(Box::new(move |_: Event| {
            let visible = doc.visibility_state() != VisibilityState::Hidden;
            tracker
                .borrow_mut()
                .handle(LifecycleEvent::VisibilityChanged { visible });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback(
            "visibilitychange",
            on_visibility.as_ref().unchecked_ref(),
        )?;
        on_visibility.forget();

        info!("Lifecycle listeners attached");
        Ok(())
    }
}
