// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Window capability.
//
// An in-memory window model keyed by label. Each window owns a bridge
// context id; closing a window sweeps that context's pending calls so
// in-flight futures reject with CANCELLED instead of hanging forever.
// Geometry changes emit `window:resize` for script listeners.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use gangway_bridge::correlate::CorrelationTable;
use gangway_bridge::events::EventDispatcher;
use gangway_bridge::registry::{RegistryBuilder, Threading};
use gangway_core::capability::Capability;
use gangway_core::error::BridgeError;

use crate::parse_params;

/// Label of the window created at startup.
pub const MAIN_WINDOW: &str = "main";

#[derive(Debug, Clone)]
struct WindowState {
    title: String,
    width: u32,
    height: u32,
    context_id: u64,
}

/// Owns all window state and the teardown path into the correlation table.
pub struct WindowManager {
    windows: Mutex<HashMap<String, WindowState>>,
    correlation: Arc<CorrelationTable>,
    events: EventDispatcher,
    next_context: AtomicU64,
}

impl WindowManager {
    pub fn new(correlation: Arc<CorrelationTable>, events: EventDispatcher) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            correlation,
            events,
            next_context: AtomicU64::new(1),
        }
    }

    /// Create a window and return its bridge context id.
    pub fn create_window(&self, label: &str, title: &str, width: u32, height: u32) -> u64 {
        let context_id = self.next_context.fetch_add(1, Ordering::Relaxed);
        let mut windows = self.windows.lock().expect("window lock poisoned");
        windows.insert(
            label.to_owned(),
            WindowState {
                title: title.to_owned(),
                width,
                height,
                context_id,
            },
        );
        info!(label, width, height, context_id, "window created");
        context_id
    }

    /// The context id owning calls from `label`, if the window exists.
    pub fn context_id(&self, label: &str) -> Option<u64> {
        let windows = self.windows.lock().expect("window lock poisoned");
        windows.get(label).map(|w| w.context_id)
    }

    pub fn size(&self, label: &str) -> Option<(u32, u32)> {
        let windows = self.windows.lock().expect("window lock poisoned");
        windows.get(label).map(|w| (w.width, w.height))
    }

    pub fn title(&self, label: &str) -> Option<String> {
        let windows = self.windows.lock().expect("window lock poisoned");
        windows.get(label).map(|w| w.title.clone())
    }

    fn with_window<T>(
        &self,
        label: &str,
        f: impl FnOnce(&mut WindowState) -> T,
    ) -> Result<T, BridgeError> {
        let mut windows = self.windows.lock().expect("window lock poisoned");
        windows
            .get_mut(label)
            .map(f)
            .ok_or_else(|| BridgeError::InvalidParams(format!("unknown window label {label:?}")))
    }

    /// Destroy a window: drop its state and cancel its pending calls.
    pub fn close(&self, label: &str) -> Result<(), BridgeError> {
        let state = {
            let mut windows = self.windows.lock().expect("window lock poisoned");
            windows.remove(label)
        }
        .ok_or_else(|| BridgeError::InvalidParams(format!("unknown window label {label:?}")))?;

        let swept = self.correlation.sweep_context(state.context_id);
        info!(label, swept, "window closed");
        self.events.emit("window:close", json!({ "label": label }));
        Ok(())
    }
}

fn default_label() -> String {
    MAIN_WINDOW.to_owned()
}

#[derive(Deserialize)]
struct LabelParams {
    #[serde(default = "default_label")]
    label: String,
}

#[derive(Deserialize)]
struct SetSizeParams {
    #[serde(default = "default_label")]
    label: String,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct SetTitleParams {
    #[serde(default = "default_label")]
    label: String,
    title: String,
}

pub fn register(builder: &mut RegistryBuilder, manager: &Arc<WindowManager>) {
    let mgr = Arc::clone(manager);
    builder.register(
        "window.getSize",
        Some(Capability::Window),
        Threading::Inline,
        move |params| {
            let p: LabelParams = parse_params(params)?;
            let (width, height) = mgr.with_window(&p.label, |w| (w.width, w.height))?;
            Ok(json!({ "width": width, "height": height }))
        },
    );

    let mgr = Arc::clone(manager);
    builder.register(
        "window.setSize",
        Some(Capability::Window),
        Threading::Inline,
        move |params| {
            let p: SetSizeParams = parse_params(params)?;
            mgr.with_window(&p.label, |w| {
                w.width = p.width;
                w.height = p.height;
            })?;
            debug!(label = %p.label, width = p.width, height = p.height, "window resized");
            mgr.events.emit(
                "window:resize",
                json!({ "label": p.label, "width": p.width, "height": p.height }),
            );
            Ok(Value::Null)
        },
    );

    let mgr = Arc::clone(manager);
    builder.register(
        "window.setTitle",
        Some(Capability::Window),
        Threading::Inline,
        move |params| {
            let p: SetTitleParams = parse_params(params)?;
            mgr.with_window(&p.label, |w| w.title = p.title.clone())?;
            Ok(Value::Null)
        },
    );

    let mgr = Arc::clone(manager);
    builder.register(
        "window.close",
        Some(Capability::Window),
        Threading::Inline,
        move |params| {
            let p: LabelParams = parse_params(params)?;
            mgr.close(&p.label)?;
            Ok(Value::Null)
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use gangway_bridge::registry::RegistryBuilder;
    use serde_json::json;

    fn manager() -> Arc<WindowManager> {
        Arc::new(WindowManager::new(
            Arc::new(CorrelationTable::new()),
            EventDispatcher::new(),
        ))
    }

    fn registry(mgr: &Arc<WindowManager>) -> gangway_bridge::registry::HandlerRegistry {
        let mut builder = RegistryBuilder::new();
        register(&mut builder, mgr);
        builder.build()
    }

    #[test]
    fn set_size_updates_model() {
        let mgr = manager();
        mgr.create_window(MAIN_WINDOW, "Gangway", 1024, 768);
        let registry = registry(&mgr);

        let entry = registry.lookup("window.setSize").expect("registered");
        let result = entry
            .invoke(json!({"width": 800, "height": 600}))
            .expect("invoke");
        assert_eq!(result, Value::Null);
        assert_eq!(mgr.size(MAIN_WINDOW), Some((800, 600)));
    }

    #[test]
    fn get_size_reads_model() {
        let mgr = manager();
        mgr.create_window(MAIN_WINDOW, "Gangway", 1024, 768);
        let registry = registry(&mgr);

        let entry = registry.lookup("window.getSize").expect("registered");
        let result = entry.invoke(Value::Null).expect("invoke");
        assert_eq!(result, json!({"width": 1024, "height": 768}));
    }

    #[test]
    fn unknown_label_is_invalid_params() {
        let mgr = manager();
        let registry = registry(&mgr);

        let entry = registry.lookup("window.setTitle").expect("registered");
        let err = entry
            .invoke(json!({"label": "ghost", "title": "x"}))
            .expect_err("no window");
        assert!(matches!(err, BridgeError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn close_sweeps_pending_calls_for_that_window() {
        let correlation = Arc::new(CorrelationTable::new());
        let mgr = Arc::new(WindowManager::new(
            Arc::clone(&correlation),
            EventDispatcher::new(),
        ));
        let ctx = mgr.create_window("secondary", "tools", 400, 300);
        let other = mgr.create_window(MAIN_WINDOW, "Gangway", 1024, 768);

        let rx_doomed = correlation.create(ctx, "a", "dialog.message").expect("create");
        let _rx_kept = correlation.create(other, "b", "dialog.message").expect("create");

        mgr.close("secondary").expect("close");

        let err = rx_doomed.await.expect("outcome").expect_err("cancelled");
        assert_eq!(err.code, gangway_core::error::ErrorCode::Cancelled);
        assert!(correlation.is_pending("b"));
        assert_eq!(mgr.size("secondary"), None);
    }

    #[test]
    fn resize_emits_window_resize_event() {
        let events = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = events.on("window:resize", move |data| {
            sink.lock().expect("lock").push(data.clone());
        });

        let mgr = Arc::new(WindowManager::new(Arc::new(CorrelationTable::new()), events));
        mgr.create_window(MAIN_WINDOW, "Gangway", 1024, 768);
        let registry = registry(&mgr);

        registry
            .lookup("window.setSize")
            .expect("registered")
            .invoke(json!({"width": 640, "height": 480}))
            .expect("invoke");

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["width"], 640);
    }
}
