// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dialog capability.
//
// Modal dialogs block until dismissed, so the handler is offloaded — the UI
// thread keeps rendering while a worker waits on the backend. The backend is
// a trait seam: platform adapters present a real dialog, headless runs use
// the auto-confirm stub.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use gangway_bridge::registry::{RegistryBuilder, Threading};
use gangway_core::capability::Capability;
use gangway_core::error::BridgeError;

use crate::parse_params;

/// Presents a message dialog and reports whether it was confirmed.
pub trait DialogBackend: Send + Sync {
    fn message(&self, title: &str, body: &str) -> Result<bool, BridgeError>;
}

/// Headless backend: logs and confirms immediately.
#[derive(Default)]
pub struct AutoConfirmDialogs;

impl DialogBackend for AutoConfirmDialogs {
    fn message(&self, title: &str, body: &str) -> Result<bool, BridgeError> {
        info!(title, body, "dialog auto-confirmed (headless)");
        Ok(true)
    }
}

#[derive(Deserialize)]
struct MessageParams {
    title: String,
    #[serde(default)]
    message: String,
}

pub fn register(builder: &mut RegistryBuilder, backend: &Arc<dyn DialogBackend>) {
    let dialogs = Arc::clone(backend);
    builder.register(
        "dialog.message",
        Some(Capability::Dialog),
        Threading::Offloaded,
        move |params| {
            let p: MessageParams = parse_params(params)?;
            let confirmed = dialogs.message(&p.title, &p.message)?;
            Ok(json!({ "confirmed": confirmed }))
        },
    );
}
