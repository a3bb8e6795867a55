// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Correlation table — pending-call tracking keyed by request id.
//
// The table is mutated from two directions: call creation on the script side
// and response arrival from the native side, interleaved with event delivery.
// A plain mutex around the map is sufficient; entries are small and every
// operation is a quick insert/remove.
//
// Semantics are at-most-once: each pending entry is fulfilled exactly once,
// and a response whose id has no pending entry (already resolved, or never
// existed) is silently discarded.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use gangway_core::error::{BridgeError, ErrorCode, Result};
use gangway_core::wire::BridgeResponse;

/// Script-visible error object built from a failed response.
#[derive(Debug, Clone)]
pub struct CallError {
    pub code: ErrorCode,
    pub message: String,
    pub data: Option<Value>,
}

impl CallError {
    fn cancelled(reason: &str) -> Self {
        Self {
            code: ErrorCode::Cancelled,
            message: reason.into(),
            data: None,
        }
    }
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// What a pending call ultimately resolves to.
pub type CallOutcome = std::result::Result<Value, CallError>;

/// Metadata about a pending call, exposed to sweep predicates.
#[derive(Debug, Clone)]
pub struct PendingInfo {
    pub id: String,
    pub module_method: String,
    pub context_id: u64,
    pub created_at: DateTime<Utc>,
}

struct PendingCall {
    info: PendingInfo,
    tx: oneshot::Sender<CallOutcome>,
}

/// Concurrent map from request id to awaiting state.
#[derive(Default)]
pub struct CorrelationTable {
    pending: Mutex<HashMap<String, PendingCall>>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending entry and return the handle the caller awaits.
    ///
    /// `context_id` identifies the owning WebView/window so teardown can
    /// sweep its calls. Fails with `InvalidRequest` if `id` is already
    /// pending — ids must be unique among in-flight calls.
    pub fn create(
        &self,
        context_id: u64,
        id: &str,
        module_method: &str,
    ) -> Result<oneshot::Receiver<CallOutcome>> {
        let mut pending = self.pending.lock().expect("correlation lock poisoned");
        if pending.contains_key(id) {
            return Err(BridgeError::InvalidRequest(format!(
                "request id {id:?} is already in flight"
            )));
        }

        let (tx, rx) = oneshot::channel();
        pending.insert(
            id.to_owned(),
            PendingCall {
                info: PendingInfo {
                    id: id.to_owned(),
                    module_method: module_method.to_owned(),
                    context_id,
                    created_at: Utc::now(),
                },
                tx,
            },
        );
        debug!(id, module_method, "pending call registered");
        Ok(rx)
    }

    /// Fulfill the pending entry matching `response.id`.
    ///
    /// Returns `true` if an entry was fulfilled; `false` means the response
    /// was dropped (unknown or already-resolved id).
    pub fn resolve(&self, response: BridgeResponse) -> bool {
        let call = {
            let mut pending = self.pending.lock().expect("correlation lock poisoned");
            pending.remove(&response.id)
        };

        let Some(call) = call else {
            warn!(id = %response.id, "response for unknown pending id dropped");
            return false;
        };

        let outcome = if response.success {
            Ok(response.result.unwrap_or(Value::Null))
        } else {
            let err = response.error.map_or_else(
                || CallError {
                    code: ErrorCode::InternalError,
                    message: "error response without error object".into(),
                    data: None,
                },
                |e| CallError {
                    code: e.code,
                    message: e.message,
                    data: e.data,
                },
            );
            Err(err)
        };

        // The receiver may already be gone (caller dropped the future);
        // that is fine, the entry is cleaned up either way.
        let _ = call.tx.send(outcome);
        true
    }

    /// Reject every entry matching `predicate` with a `CANCELLED` error.
    ///
    /// Returns the number of entries swept.
    pub fn sweep(&self, predicate: impl Fn(&PendingInfo) -> bool) -> usize {
        let swept: Vec<PendingCall> = {
            let mut pending = self.pending.lock().expect("correlation lock poisoned");
            let ids: HashSet<String> = pending
                .values()
                .filter(|c| predicate(&c.info))
                .map(|c| c.info.id.clone())
                .collect();
            ids.iter().filter_map(|id| pending.remove(id)).collect()
        };

        let count = swept.len();
        for call in swept {
            debug!(id = %call.info.id, key = %call.info.module_method, "pending call cancelled");
            let _ = call.tx.send(Err(CallError::cancelled("owning context torn down")));
        }
        count
    }

    /// Sweep all calls owned by a destroyed WebView/window context.
    pub fn sweep_context(&self, context_id: u64) -> usize {
        self.sweep(|info| info.context_id == context_id)
    }

    /// Sweep calls older than `age`. Nothing in the bridge schedules this;
    /// it exists so an embedder can layer a timeout policy on top.
    pub fn sweep_older_than(&self, age: Duration) -> usize {
        let cutoff = Utc::now() - age;
        self.sweep(|info| info.created_at < cutoff)
    }

    /// Whether `id` currently has a pending entry.
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending
            .lock()
            .expect("correlation lock poisoned")
            .contains_key(id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().expect("correlation lock poisoned").len()
    }
}

/// Native-side duplicate-id guard.
///
/// The router tracks ids it is currently serving so a second request reusing
/// an in-flight id is rejected before reaching a handler. Distinct from the
/// script-side table: every request is pending there by construction, so
/// pending-ness alone cannot detect duplicates.
#[derive(Default)]
pub struct InFlightSet {
    ids: Mutex<HashSet<String>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for the duration of a router invocation.
    ///
    /// Returns `false` if the id is already being served.
    pub fn claim(&self, id: &str) -> bool {
        self.ids
            .lock()
            .expect("in-flight lock poisoned")
            .insert(id.to_owned())
    }

    /// Release a claimed id once its response has been built.
    pub fn release(&self, id: &str) {
        self.ids.lock().expect("in-flight lock poisoned").remove(id);
    }
}
