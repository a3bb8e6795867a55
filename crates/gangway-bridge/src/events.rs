// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event dispatcher — unsolicited native-to-script delivery.
//
// `emit` is called from platform callbacks (tray click, window resize, menu
// action) on whatever thread the OS chooses. Delivery is marshaled through
// the UI executor before serialization, which both satisfies the WebView's
// thread-affinity requirement and gives FIFO ordering: the executor is a
// single consumer, so two emits for the same event name cannot reorder.
//
// Delivery is fire-and-forget. If the WebView is not ready the payload is
// dropped, not queued — callers needing reliable delivery buffer upstream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;
use tracing::{debug, error, warn};

use gangway_core::wire::BridgeEvent;

use crate::transport::{UiExecutor, WebViewTransport};

/// Native-side listener for a named event.
pub type EventListener = Arc<dyn Fn(&Value) + Send + Sync>;

struct ListenerEntry {
    token: u64,
    listener: EventListener,
}

struct OutboundLane {
    ui: Arc<dyn UiExecutor>,
    transport: Arc<dyn WebViewTransport>,
}

struct DispatcherInner {
    listeners: Mutex<HashMap<String, Vec<ListenerEntry>>>,
    next_token: AtomicU64,
    lane: Mutex<Option<OutboundLane>>,
}

/// Pushes `BridgeEvent` payloads to registered listeners and, when a
/// transport is attached and ready, into the WebView.
///
/// Cheap to clone; all clones share one listener table and outbound lane.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Arc<DispatcherInner>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                listeners: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(1),
                lane: Mutex::new(None),
            }),
        }
    }

    /// Attach the outbound lane. From now on every emit is marshaled through
    /// `ui` and forwarded to `transport` once the page is ready.
    pub fn attach_transport(&self, ui: Arc<dyn UiExecutor>, transport: Arc<dyn WebViewTransport>) {
        let mut lane = self.inner.lane.lock().expect("lane lock poisoned");
        *lane = Some(OutboundLane { ui, transport });
    }

    /// Register a native-side listener. Delivery order follows registration
    /// order. The subscription unregisters on drop.
    pub fn on(&self, event: &str, listener: impl Fn(&Value) + Send + Sync + 'static) -> EventSubscription {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.inner.listeners.lock().expect("listener lock poisoned");
        listeners.entry(event.to_owned()).or_default().push(ListenerEntry {
            token,
            listener: Arc::new(listener),
        });

        EventSubscription {
            dispatcher: Arc::downgrade(&self.inner),
            event: event.to_owned(),
            token,
        }
    }

    /// Emit an event to all listeners for `event`, then to the WebView.
    ///
    /// Callable from any thread. Emitting with zero listeners and no ready
    /// transport is a no-op.
    pub fn emit(&self, event: &str, data: Value) {
        // Snapshot the listener list now; delivery happens on the UI thread.
        let snapshot: Vec<EventListener> = {
            let listeners = self.inner.listeners.lock().expect("listener lock poisoned");
            listeners
                .get(event)
                .map(|entries| entries.iter().map(|e| Arc::clone(&e.listener)).collect())
                .unwrap_or_default()
        };

        let lane_parts = {
            let lane = self.inner.lane.lock().expect("lane lock poisoned");
            lane.as_ref()
                .map(|l| (Arc::clone(&l.ui), Arc::clone(&l.transport)))
        };

        let ui_exec = lane_parts.as_ref().map(|(ui, _)| Arc::clone(ui));

        let event_name = event.to_owned();
        let job = move || {
            for listener in &snapshot {
                listener(&data);
            }

            if let Some((_, ref transport)) = lane_parts {
                if !transport.is_ready() {
                    warn!(event = %event_name, "webview not ready, event dropped");
                    return;
                }
                let payload = BridgeEvent::new(event_name.clone(), data.clone());
                match serde_json::to_string(&payload) {
                    Ok(json) => {
                        if let Err(e) = transport.send_to_script(&json) {
                            error!(event = %event_name, error = %e, "event delivery failed");
                        }
                    }
                    Err(e) => error!(event = %event_name, error = %e, "event serialization failed"),
                }
            }
        };

        // With a lane attached the job must run on the UI thread; without
        // one (tests, headless listeners only) it runs inline.
        match ui_exec {
            Some(ui) => {
                debug!(event, "event queued for ui-thread delivery");
                ui.submit(Box::new(job));
            }
            None => job(),
        }
    }

    #[cfg(test)]
    fn listener_count(&self, event: &str) -> usize {
        self.inner
            .listeners
            .lock()
            .expect("listener lock poisoned")
            .get(event)
            .map_or(0, Vec::len)
    }
}

/// Handle returned by `EventDispatcher::on`; dropping it (or calling
/// `unsubscribe`) removes the listener.
pub struct EventSubscription {
    dispatcher: Weak<DispatcherInner>,
    event: String,
    token: u64,
}

impl EventSubscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.dispatcher.upgrade() {
            let mut listeners = inner.listeners.lock().expect("listener lock poisoned");
            if let Some(entries) = listeners.get_mut(&self.event) {
                entries.retain(|e| e.token != self.token);
                if entries.is_empty() {
                    listeners.remove(&self.event);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn emit_with_no_listeners_is_a_noop() {
        let dispatcher = EventDispatcher::new();
        // No panic, no delivery, nothing to observe.
        dispatcher.emit("tray:click", json!({"button": "left"}));
    }

    #[test]
    fn listeners_receive_emitted_data() {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _sub = dispatcher.on("window:resize", move |data| {
            sink.lock().expect("lock").push(data.clone());
        });

        dispatcher.emit("window:resize", json!({"width": 800}));
        dispatcher.emit("window:resize", json!({"width": 1024}));

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0]["width"], 800);
        assert_eq!(seen[1]["width"], 1024);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let dispatcher = EventDispatcher::new();
        let order = Arc::new(StdMutex::new(Vec::new()));

        let sink = Arc::clone(&order);
        let _a = dispatcher.on("menu:select", move |_| sink.lock().expect("lock").push("a"));
        let sink = Arc::clone(&order);
        let _b = dispatcher.on("menu:select", move |_| sink.lock().expect("lock").push("b"));

        dispatcher.emit("menu:select", Value::Null);
        assert_eq!(*order.lock().expect("lock"), vec!["a", "b"]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let dispatcher = EventDispatcher::new();
        let count = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&count);
        let sub = dispatcher.on("tray:click", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.emit("tray:click", Value::Null);
        sub.unsubscribe();
        dispatcher.emit("tray:click", Value::Null);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.listener_count("tray:click"), 0);
    }

    #[test]
    fn other_event_names_are_not_delivered() {
        let dispatcher = EventDispatcher::new();
        let count = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&count);
        let _sub = dispatcher.on("tray:click", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        dispatcher.emit("window:resize", Value::Null);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropping_subscription_removes_listener() {
        let dispatcher = EventDispatcher::new();
        {
            let _sub = dispatcher.on("menu:select", |_| {});
            assert_eq!(dispatcher.listener_count("menu:select"), 1);
        }
        assert_eq!(dispatcher.listener_count("menu:select"), 0);
    }
}
