// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tray capability.
//
// The tray icon is mostly an event source: clicks arrive from the OS on an
// arbitrary thread and fan out as `tray:click` events. The only script-facing
// method is tooltip control.

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use gangway_bridge::events::EventDispatcher;
use gangway_bridge::registry::{RegistryBuilder, Threading};
use gangway_core::capability::Capability;

use crate::parse_params;

/// In-memory tray model plus the click-to-event path.
pub struct Tray {
    id: String,
    tooltip: Mutex<String>,
    events: EventDispatcher,
}

impl Tray {
    pub fn new(id: impl Into<String>, events: EventDispatcher) -> Self {
        Self {
            id: id.into(),
            tooltip: Mutex::new(String::new()),
            events,
        }
    }

    pub fn tooltip(&self) -> String {
        self.tooltip.lock().expect("tray lock poisoned").clone()
    }

    pub fn set_tooltip(&self, tooltip: &str) {
        *self.tooltip.lock().expect("tray lock poisoned") = tooltip.to_owned();
        debug!(tooltip, "tray tooltip updated");
    }

    /// Platform callback entry point: the tray icon was clicked.
    pub fn clicked(&self, button: &str, x: i32, y: i32) {
        self.events.emit(
            "tray:click",
            json!({ "id": self.id, "button": button, "x": x, "y": y }),
        );
    }
}

#[derive(Deserialize)]
struct TooltipParams {
    tooltip: String,
}

pub fn register(builder: &mut RegistryBuilder, tray: &Arc<Tray>) {
    let tray = Arc::clone(tray);
    builder.register(
        "tray.setTooltip",
        Some(Capability::Tray),
        Threading::Inline,
        move |params| {
            let p: TooltipParams = parse_params(params)?;
            tray.set_tooltip(&p.tooltip);
            Ok(Value::Null)
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_tooltip_updates_model() {
        let tray = Arc::new(Tray::new("tray-1", EventDispatcher::new()));
        let mut builder = RegistryBuilder::new();
        register(&mut builder, &tray);
        let registry = builder.build();

        registry
            .lookup("tray.setTooltip")
            .expect("registered")
            .invoke(json!({"tooltip": "3 jobs running"}))
            .expect("invoke");
        assert_eq!(tray.tooltip(), "3 jobs running");
    }

    #[test]
    fn click_emits_tray_click_with_coordinates() {
        let events = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = events.on("tray:click", move |data| {
            sink.lock().expect("lock").push(data.clone());
        });

        let tray = Tray::new("tray-1", events);
        tray.clicked("left", 100, 200);

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], json!({"id": "tray-1", "button": "left", "x": 100, "y": 200}));
    }

    #[test]
    fn click_with_no_listeners_is_a_noop() {
        let tray = Tray::new("tray-1", EventDispatcher::new());
        tray.clicked("right", 0, 0);
    }
}
