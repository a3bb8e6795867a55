// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ScriptPort — the native-side stand-in for the JS bridge glue.
//
// In the shipped page, a small script generates ids, stashes a promise per
// call, posts the request through the platform message primitive, and
// resolves the promise when `window.__gangway.dispatch` is handed the
// matching response. This type emulates exactly that runtime so the full
// correlation path can be driven from Rust: integration tests, the app's
// self-check mode, and headless tooling all speak through it.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use gangway_core::error::ErrorCode;
use gangway_core::wire::{BridgeRequest, InboundMessage};

use crate::correlate::{CallError, CallOutcome, CorrelationTable};
use crate::events::{EventDispatcher, EventSubscription};

/// Function that posts a raw request payload to the native side.
pub type ToNative = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// One script context's view of the bridge: correlated calls out, responses
/// and events in.
pub struct ScriptPort {
    context_id: u64,
    correlation: Arc<CorrelationTable>,
    to_native: ToNative,
    listeners: EventDispatcher,
}

impl ScriptPort {
    /// Create a port with its own private correlation table.
    pub fn new(context_id: u64, to_native: ToNative) -> Self {
        Self::with_correlation(context_id, to_native, Arc::new(CorrelationTable::new()))
    }

    /// Create a port sharing an existing table — used when window teardown
    /// elsewhere needs to sweep this port's pending calls.
    pub fn with_correlation(
        context_id: u64,
        to_native: ToNative,
        correlation: Arc<CorrelationTable>,
    ) -> Self {
        Self {
            context_id,
            correlation,
            to_native,
            // Local-only dispatcher: no transport lane, listeners run inline.
            listeners: EventDispatcher::new(),
        }
    }

    pub fn context_id(&self) -> u64 {
        self.context_id
    }

    /// Invoke `module.method` and await its correlated outcome.
    ///
    /// Ids are generated here (uuid v4), satisfying the uniqueness-while-
    /// pending invariant without caller coordination.
    pub async fn call(&self, module: &str, method: &str, params: Value) -> CallOutcome {
        let id = Uuid::new_v4().to_string();
        let key = format!("{module}.{method}");

        let rx = self
            .correlation
            .create(self.context_id, &id, &key)
            .map_err(|e| CallError {
                code: e.code(),
                message: e.to_string(),
                data: None,
            })?;

        let request = BridgeRequest::new(id.clone(), module, method, params);
        let raw = serde_json::to_vec(&request).map_err(|e| CallError {
            code: ErrorCode::InternalError,
            message: format!("request serialization failed: {e}"),
            data: None,
        })?;

        debug!(id, key, "script call dispatched");
        (self.to_native)(raw);

        // A dropped sender means the table entry vanished without being
        // resolved or swept — treat it as cancellation.
        rx.await.unwrap_or_else(|_| {
            Err(CallError {
                code: ErrorCode::Cancelled,
                message: "pending call dropped".into(),
                data: None,
            })
        })
    }

    /// Register a script-side event listener.
    pub fn on(
        &self,
        event: &str,
        listener: impl Fn(&Value) + Send + Sync + 'static,
    ) -> EventSubscription {
        self.listeners.on(event, listener)
    }

    /// Entry point for payloads the transport delivers into this context.
    ///
    /// Responses resolve (or silently miss) the correlation table; events
    /// fan out to listeners; anything else is dropped.
    pub fn handle_inbound(&self, json: &str) {
        match InboundMessage::decode(json) {
            Some(InboundMessage::Response(response)) => {
                self.correlation.resolve(response);
            }
            Some(InboundMessage::Event(event)) => {
                self.listeners.emit(&event.event, event.data);
            }
            None => warn!("undecodable inbound frame dropped"),
        }
    }

    /// Reject every pending call owned by this context with `CANCELLED`.
    /// Called when the owning WebView/window is destroyed.
    pub fn teardown(&self) -> usize {
        let swept = self.correlation.sweep_context(self.context_id);
        debug!(context_id = self.context_id, swept, "script port torn down");
        swept
    }

    pub fn pending_count(&self) -> usize {
        self.correlation.pending_count()
    }
}
