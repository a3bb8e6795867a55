// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub transport for platforms without a native WebView binding.
//
// Every delivery fails with `NotSupported`; the inbound hook is accepted but
// nothing ever fires it. Real adapters live in the per-platform modules.

use std::sync::Mutex;

use tracing::warn;

use gangway_bridge::transport::{InboundHandler, WebViewTransport};
use gangway_core::error::{BridgeError, Result};

/// No-op transport returned on platforms without an adapter.
#[derive(Default)]
pub struct StubTransport {
    inbound: Mutex<Option<InboundHandler>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WebViewTransport for StubTransport {
    fn attach_inbound(&self, handler: InboundHandler) {
        *self.inbound.lock().expect("inbound lock poisoned") = Some(handler);
    }

    fn send_to_script(&self, _json: &str) -> Result<()> {
        warn!("send_to_script called on stub transport");
        Err(BridgeError::NotSupported(
            "no native WebView adapter for this platform".into(),
        ))
    }

    fn is_ready(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_is_never_ready_and_rejects_sends() {
        let stub = StubTransport::new();
        assert!(!stub.is_ready());
        assert!(matches!(
            stub.send_to_script("{}"),
            Err(BridgeError::NotSupported(_))
        ));
    }
}
