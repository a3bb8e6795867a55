// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// BridgeContext — the single per-process bridge instance.
//
// Constructed once at startup from a frozen registry and grant set, then
// handed by reference into whatever owns the transport. There are no ambient
// globals; capability modules receive the pieces they need (event dispatcher,
// correlation table) at registration time.

use std::sync::Arc;

use tracing::{error, info};

use gangway_core::capability::CapabilityGrants;
use gangway_core::error::{BridgeError, Result};

use crate::correlate::CorrelationTable;
use crate::events::EventDispatcher;
use crate::registry::HandlerRegistry;
use crate::router::Router;
use crate::transport::{UiExecutor, WebViewTransport};

/// Everything the bridge needs, wired together.
pub struct BridgeContext {
    router: Arc<Router>,
    correlation: Arc<CorrelationTable>,
    events: EventDispatcher,
    registry: HandlerRegistry,
}

impl BridgeContext {
    /// Build the context from a frozen registry and the instance grant set.
    pub fn new(registry: HandlerRegistry, grants: CapabilityGrants) -> Self {
        Self::with_parts(
            registry,
            grants,
            Arc::new(CorrelationTable::new()),
            EventDispatcher::new(),
        )
    }

    /// Like [`new`](Self::new), but sharing a correlation table and event
    /// dispatcher built earlier — capability backends that need either one
    /// at registration time (window teardown, tray clicks) are constructed
    /// before the context, then handed the same instances.
    pub fn with_parts(
        registry: HandlerRegistry,
        grants: CapabilityGrants,
        correlation: Arc<CorrelationTable>,
        events: EventDispatcher,
    ) -> Self {
        info!(handlers = registry.len(), "bridge context created");
        Self {
            router: Arc::new(Router::new(registry.clone(), grants)),
            correlation,
            events,
            registry,
        }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// The script-side correlation table (shared with `ScriptPort`s and with
    /// window teardown).
    pub fn correlation(&self) -> &Arc<CorrelationTable> {
        &self.correlation
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Wire a transport into the bridge.
    ///
    /// Inbound payloads are routed on the async runtime (so the UI thread
    /// only pays for parse-and-spawn), and each response is marshaled back
    /// through `ui` before being handed to `send_to_script`. The event
    /// dispatcher gains the same outbound lane.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach_transport(
        &self,
        ui: Arc<dyn UiExecutor>,
        transport: Arc<dyn WebViewTransport>,
    ) -> Result<()> {
        let rt = tokio::runtime::Handle::try_current()
            .map_err(|e| BridgeError::Internal(format!("no tokio runtime: {e}")))?;

        self.events
            .attach_transport(Arc::clone(&ui), Arc::clone(&transport));

        let router = Arc::clone(&self.router);
        let hook_ui = Arc::clone(&ui);
        let hook_transport = Arc::clone(&transport);

        transport.attach_inbound(Arc::new(move |raw: Vec<u8>| {
            let router = Arc::clone(&router);
            let ui = Arc::clone(&hook_ui);
            let transport = Arc::clone(&hook_transport);

            rt.spawn(async move {
                let response = router.handle(&raw).await;
                match serde_json::to_string(&response) {
                    Ok(json) => ui.submit(Box::new(move || {
                        if let Err(e) = transport.send_to_script(&json) {
                            error!(error = %e, "response delivery failed");
                        }
                    })),
                    Err(e) => error!(error = %e, "response serialization failed"),
                }
            });
        }));

        info!("transport attached to bridge context");
        Ok(())
    }
}
