// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Clipboard capability.
//
// An in-process text store standing in for the OS pasteboard; platform
// backends replace the store without touching the handler surface.

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use gangway_bridge::registry::{RegistryBuilder, Threading};
use gangway_core::capability::Capability;

use crate::parse_params;

/// Process-local clipboard text.
#[derive(Default)]
pub struct ClipboardStore {
    text: Mutex<String>,
}

impl ClipboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_text(&self) -> String {
        self.text.lock().expect("clipboard lock poisoned").clone()
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock().expect("clipboard lock poisoned") = text.to_owned();
        debug!(len = text.len(), "clipboard text replaced");
    }
}

#[derive(Deserialize)]
struct SetTextParams {
    text: String,
}

pub fn register(builder: &mut RegistryBuilder, store: &Arc<ClipboardStore>) {
    let clipboard = Arc::clone(store);
    builder.register(
        "clipboard.getText",
        Some(Capability::Clipboard),
        Threading::Inline,
        move |_params| Ok(json!(clipboard.get_text())),
    );

    let clipboard = Arc::clone(store);
    builder.register(
        "clipboard.setText",
        Some(Capability::Clipboard),
        Threading::Inline,
        move |params| {
            let p: SetTextParams = parse_params(params)?;
            clipboard.set_text(&p.text);
            Ok(Value::Null)
        },
    );
}
