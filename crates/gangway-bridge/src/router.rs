// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Router — the orchestration core of the bridge.
//
// `handle` takes the raw inbound payload through the full pipeline: parse,
// validate, lookup, permission gate, invoke, build response. Parse and
// validation failures never reach handler code, permission denial
// short-circuits before any side effect, and a handler fault of any kind
// (error return or panic) is normalized into the wire taxonomy. Nothing a
// handler does may propagate an unhandled fault into the transport.
//
// The parse/validate/lookup steps are synchronous and allocation-light
// because the inbound hook fires on the platform UI thread. Only the
// `Offloaded` threading class leaves that thread, via the blocking pool.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;
use tracing::{debug, instrument, warn};

use gangway_core::capability::CapabilityGrants;
use gangway_core::error::{BridgeError, ErrorCode};
use gangway_core::wire::{BridgeResponse, SENTINEL_ID};

use crate::correlate::InFlightSet;
use crate::registry::{HandlerRegistry, Threading};

/// Stateless request pipeline over a frozen registry and grant set.
pub struct Router {
    registry: HandlerRegistry,
    grants: CapabilityGrants,
    in_flight: InFlightSet,
}

impl Router {
    pub fn new(registry: HandlerRegistry, grants: CapabilityGrants) -> Self {
        Self {
            registry,
            grants,
            in_flight: InFlightSet::new(),
        }
    }

    /// Process one raw payload and produce the response for it.
    ///
    /// Always returns a response; the request `id` is preserved verbatim
    /// whenever it could be recovered from the payload, else the sentinel
    /// id is used.
    #[instrument(skip_all, fields(bytes = raw.len()))]
    pub async fn handle(&self, raw: &[u8]) -> BridgeResponse {
        let value: Value = match serde_json::from_slice(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unparseable payload");
                return BridgeResponse::err(
                    SENTINEL_ID,
                    ErrorCode::ParseError,
                    format!("malformed JSON: {e}"),
                );
            }
        };

        // Recover the id before anything else so later failures can still
        // correlate back to the originating call.
        let Some(id) = value.get("id").and_then(Value::as_str).map(str::to_owned) else {
            return BridgeResponse::err(
                SENTINEL_ID,
                ErrorCode::InvalidRequest,
                "missing or non-string field `id`",
            );
        };

        // An id may not be reused while its first request is still being
        // served.
        if !self.in_flight.claim(&id) {
            warn!(id, "duplicate in-flight request id");
            return BridgeResponse::err(
                id,
                ErrorCode::InvalidRequest,
                "request id is already in flight",
            );
        }

        let response = self.dispatch(&id, &value).await;
        self.in_flight.release(&id);
        response
    }

    async fn dispatch(&self, id: &str, value: &Value) -> BridgeResponse {
        let module = match value.get("module").and_then(Value::as_str) {
            Some(m) if !m.is_empty() => m,
            _ => {
                return BridgeResponse::err(
                    id,
                    ErrorCode::InvalidRequest,
                    "missing or empty field `module`",
                );
            }
        };
        let method = match value.get("method").and_then(Value::as_str) {
            Some(m) if !m.is_empty() => m,
            _ => {
                return BridgeResponse::err(
                    id,
                    ErrorCode::InvalidRequest,
                    "missing or empty field `method`",
                );
            }
        };
        let params = value.get("params").cloned().unwrap_or(Value::Null);

        let key = format!("{module}.{method}");
        let Some(entry) = self.registry.lookup(&key) else {
            debug!(key, "method not found");
            return BridgeResponse::err(
                id,
                ErrorCode::MethodNotFound,
                format!("no handler registered for {key}"),
            );
        };

        // Permission gate: evaluated before the handler so denial is
        // side-effect-free and idempotent.
        if !self.grants.allows(entry.permission) {
            debug!(key, "permission denied");
            return BridgeResponse::err(
                id,
                ErrorCode::PermissionDenied,
                format!("capability for {key} not granted"),
            );
        }

        let outcome = match entry.threading {
            Threading::Inline => invoke_caught(entry.handler_fn(), params),
            Threading::Offloaded => {
                let handler = entry.handler_fn();
                match tokio::task::spawn_blocking(move || handler(params)).await {
                    Ok(result) => result,
                    Err(join_err) if join_err.is_panic() => Err(BridgeError::Internal(format!(
                        "handler panicked: {}",
                        panic_message(join_err.into_panic())
                    ))),
                    Err(join_err) => Err(BridgeError::Internal(format!(
                        "handler task aborted: {join_err}"
                    ))),
                }
            }
        };

        match outcome {
            Ok(result) => BridgeResponse::ok(id, result),
            Err(e) => {
                debug!(key, code = %e.code(), error = %e, "handler failed");
                BridgeResponse::err(id, e.code(), e.to_string())
            }
        }
    }
}

/// Invoke an inline handler with panic containment.
fn invoke_caught(
    handler: crate::registry::HandlerFn,
    params: Value,
) -> Result<Value, BridgeError> {
    match catch_unwind(AssertUnwindSafe(|| handler(params))) {
        Ok(result) => result,
        Err(payload) => Err(BridgeError::Internal(format!(
            "handler panicked: {}",
            panic_message(payload)
        ))),
    }
}

/// Best-effort extraction of a panic payload's message.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use gangway_core::capability::Capability;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_router(grants: CapabilityGrants) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut builder = RegistryBuilder::new();

        let counter = Arc::clone(&calls);
        builder.register("clipboard.getText", Some(Capability::Clipboard), Threading::Inline, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(json!("hello"))
        });

        let counter = Arc::clone(&calls);
        builder.register("echo.params", None, Threading::Offloaded, move |params| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(params)
        });

        builder.register("panic.inline", None, Threading::Inline, |_| {
            panic!("inline boom")
        });
        builder.register("panic.offloaded", None, Threading::Offloaded, |_| {
            panic!("offloaded boom")
        });
        builder.register("fail.platform", None, Threading::Inline, |_| {
            Err(BridgeError::Platform("clipboard daemon unreachable".into()))
        });
        builder.register("fail.unsupported", None, Threading::Inline, |_| {
            Err(BridgeError::NotSupported("no tray on this platform".into()))
        });
        builder.register("strict.params", None, Threading::Inline, |params| {
            params
                .get("width")
                .and_then(Value::as_u64)
                .map(|w| json!(w))
                .ok_or_else(|| BridgeError::InvalidParams("expected numeric `width`".into()))
        });

        (Router::new(builder.build(), grants), calls)
    }

    fn err_code(resp: &BridgeResponse) -> ErrorCode {
        resp.error.as_ref().expect("error object").code
    }

    #[tokio::test]
    async fn well_formed_request_preserves_id() {
        let (router, _) = test_router(CapabilityGrants::all());
        let resp = router
            .handle(br#"{"id":"req-77","module":"clipboard","method":"getText","params":{}}"#)
            .await;
        assert_eq!(resp.id, "req-77");
        assert!(resp.success);
        assert_eq!(resp.result, Some(json!("hello")));
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error_and_no_handler_runs() {
        let (router, calls) = test_router(CapabilityGrants::all());
        let resp = router.handle(b"{not json at all").await;
        assert_eq!(resp.id, SENTINEL_ID);
        assert_eq!(err_code(&resp), ErrorCode::ParseError);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_id_is_invalid_request_with_sentinel() {
        let (router, _) = test_router(CapabilityGrants::all());
        let resp = router
            .handle(br#"{"module":"clipboard","method":"getText"}"#)
            .await;
        assert_eq!(resp.id, SENTINEL_ID);
        assert_eq!(err_code(&resp), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn missing_method_is_invalid_request_with_recovered_id() {
        let (router, _) = test_router(CapabilityGrants::all());
        let resp = router.handle(br#"{"id":"5","module":"clipboard"}"#).await;
        assert_eq!(resp.id, "5");
        assert_eq!(err_code(&resp), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let (router, _) = test_router(CapabilityGrants::all());
        let resp = router
            .handle(br#"{"id":"6","module":"sidecar","method":"launch"}"#)
            .await;
        assert_eq!(resp.id, "6");
        assert_eq!(err_code(&resp), ErrorCode::MethodNotFound);
    }

    #[tokio::test]
    async fn denied_permission_never_invokes_handler() {
        let (router, calls) = test_router(CapabilityGrants::none());
        let resp = router
            .handle(br#"{"id":"7","module":"clipboard","method":"getText"}"#)
            .await;
        assert_eq!(err_code(&resp), ErrorCode::PermissionDenied);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // Denial is idempotent — a second identical request behaves the same.
        let resp = router
            .handle(br#"{"id":"8","module":"clipboard","method":"getText"}"#)
            .await;
        assert_eq!(err_code(&resp), ErrorCode::PermissionDenied);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn offloaded_handler_round_trips_params() {
        let (router, _) = test_router(CapabilityGrants::all());
        let resp = router
            .handle(br#"{"id":"9","module":"echo","method":"params","params":{"a":1}}"#)
            .await;
        assert!(resp.success);
        assert_eq!(resp.result, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn inline_panic_becomes_internal_error() {
        let (router, _) = test_router(CapabilityGrants::all());
        let resp = router
            .handle(br#"{"id":"10","module":"panic","method":"inline"}"#)
            .await;
        assert_eq!(resp.id, "10");
        assert_eq!(err_code(&resp), ErrorCode::InternalError);
        let msg = &resp.error.as_ref().expect("error").message;
        assert!(msg.contains("inline boom"), "got: {msg}");
    }

    #[tokio::test]
    async fn offloaded_panic_becomes_internal_error() {
        let (router, _) = test_router(CapabilityGrants::all());
        let resp = router
            .handle(br#"{"id":"11","module":"panic","method":"offloaded"}"#)
            .await;
        assert_eq!(err_code(&resp), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn handler_signalled_failures_keep_their_codes() {
        let (router, _) = test_router(CapabilityGrants::all());

        let resp = router
            .handle(br#"{"id":"12","module":"fail","method":"platform"}"#)
            .await;
        assert_eq!(err_code(&resp), ErrorCode::PlatformError);

        let resp = router
            .handle(br#"{"id":"13","module":"fail","method":"unsupported"}"#)
            .await;
        assert_eq!(err_code(&resp), ErrorCode::NotSupported);
    }

    #[tokio::test]
    async fn malformed_params_are_invalid_params() {
        let (router, _) = test_router(CapabilityGrants::all());
        let resp = router
            .handle(br#"{"id":"14","module":"strict","method":"params","params":{"width":"wide"}}"#)
            .await;
        assert_eq!(err_code(&resp), ErrorCode::InvalidParams);
    }

    #[tokio::test]
    async fn duplicate_in_flight_id_is_rejected_but_id_is_reusable_after() {
        let (router, _) = test_router(CapabilityGrants::all());

        // Sequential reuse is fine — uniqueness is only required while
        // pending.
        let first = router
            .handle(br#"{"id":"dup","module":"echo","method":"params","params":1}"#)
            .await;
        assert!(first.success);
        let second = router
            .handle(br#"{"id":"dup","module":"echo","method":"params","params":2}"#)
            .await;
        assert!(second.success);
    }

    #[tokio::test]
    async fn concurrent_requests_resolve_independently() {
        let (router, _) = test_router(CapabilityGrants::all());
        let router = Arc::new(router);

        let a = {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                router
                    .handle(br#"{"id":"A","module":"echo","method":"params","params":"a"}"#)
                    .await
            })
        };
        let b = {
            let router = Arc::clone(&router);
            tokio::spawn(async move {
                router
                    .handle(br#"{"id":"B","module":"echo","method":"params","params":"b"}"#)
                    .await
            })
        };

        let (resp_a, resp_b) = (a.await.expect("join a"), b.await.expect("join b"));
        assert_eq!(resp_a.id, "A");
        assert_eq!(resp_a.result, Some(json!("a")));
        assert_eq!(resp_b.id, "B");
        assert_eq!(resp_b.result, Some(json!("b")));
    }
}
