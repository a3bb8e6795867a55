// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless in-process transport.
//
// Stands in for a real WebView during tests, CI, and desktop dev runs where
// no native binding exists. Both directions work for real: script-to-native
// payloads are pushed through `push_from_script` into the attached inbound
// hook, and native-to-script deliveries are recorded and optionally forwarded
// to a script sink (typically a `ScriptPort`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use gangway_bridge::transport::{InboundHandler, WebViewTransport};
use gangway_core::error::{BridgeError, Result};

/// Receives each payload delivered "into the page".
pub type ScriptSink = Arc<dyn Fn(&str) + Send + Sync>;

/// In-memory WebView double.
#[derive(Default)]
pub struct HeadlessTransport {
    inbound: Mutex<Option<InboundHandler>>,
    sink: Mutex<Option<ScriptSink>>,
    delivered: Mutex<Vec<String>>,
    ready: AtomicBool,
}

impl HeadlessTransport {
    /// Create a transport in the not-yet-loaded state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the emulated page as loaded (or unloaded).
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
        debug!(ready, "headless transport readiness changed");
    }

    /// Wire the script side: every delivered payload is handed to `sink`.
    pub fn set_script_sink(&self, sink: ScriptSink) {
        *self.sink.lock().expect("sink lock poisoned") = Some(sink);
    }

    /// Emulate the platform message primitive: push a raw payload from the
    /// page into the native inbound hook. Payloads arriving before a hook is
    /// attached are dropped, mirroring real platform behavior.
    pub fn push_from_script(&self, raw: &[u8]) {
        let hook = self.inbound.lock().expect("inbound lock poisoned").clone();
        match hook {
            Some(hook) => hook(raw.to_vec()),
            None => debug!("no inbound hook attached, payload dropped"),
        }
    }

    /// Everything delivered to the page so far, oldest first.
    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().expect("delivered lock poisoned").clone()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().expect("delivered lock poisoned").len()
    }
}

impl WebViewTransport for HeadlessTransport {
    fn attach_inbound(&self, handler: InboundHandler) {
        *self.inbound.lock().expect("inbound lock poisoned") = Some(handler);
    }

    fn send_to_script(&self, json: &str) -> Result<()> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(BridgeError::Transport("page not loaded".into()));
        }

        self.delivered
            .lock()
            .expect("delivered lock poisoned")
            .push(json.to_owned());

        let sink = self.sink.lock().expect("sink lock poisoned").clone();
        if let Some(sink) = sink {
            sink(json);
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_before_ready_fails() {
        let transport = HeadlessTransport::new();
        assert!(transport.send_to_script("{}").is_err());

        transport.set_ready(true);
        transport.send_to_script(r#"{"id":"1"}"#).expect("send");
        assert_eq!(transport.delivered(), vec![r#"{"id":"1"}"#.to_owned()]);
    }

    #[test]
    fn push_without_hook_is_dropped() {
        let transport = HeadlessTransport::new();
        // No panic, nothing recorded.
        transport.push_from_script(b"{}");
    }

    #[test]
    fn push_reaches_attached_hook() {
        let transport = HeadlessTransport::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        transport.attach_inbound(Arc::new(move |raw| {
            sink.lock().expect("lock").push(raw);
        }));

        transport.push_from_script(b"abc");
        assert_eq!(*seen.lock().expect("lock"), vec![b"abc".to_vec()]);
    }

    #[test]
    fn sink_receives_deliveries() {
        let transport = HeadlessTransport::new();
        transport.set_ready(true);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        transport.set_script_sink(Arc::new(move |json| {
            sink.lock().expect("lock").push(json.to_owned());
        }));

        transport.send_to_script("x").expect("send");
        assert_eq!(*seen.lock().expect("lock"), vec!["x".to_owned()]);
    }
}
