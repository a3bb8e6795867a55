// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notification capability.
//
// Posting is inline — handing a notification to the OS is non-blocking.
// User interaction comes back later as a `notification:action` event from
// whatever thread the platform delivers its callback on.

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use gangway_bridge::events::EventDispatcher;
use gangway_bridge::registry::{RegistryBuilder, Threading};
use gangway_core::capability::Capability;

use crate::parse_params;

/// A notification handed to the OS.
#[derive(Debug, Clone)]
pub struct ShownNotification {
    pub title: String,
    pub body: String,
}

/// Tracks posted notifications and routes action callbacks to events.
pub struct NotificationCenter {
    shown: Mutex<Vec<ShownNotification>>,
    events: EventDispatcher,
}

impl NotificationCenter {
    pub fn new(events: EventDispatcher) -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn show(&self, title: &str, body: &str) {
        info!(title, "notification posted");
        self.shown
            .lock()
            .expect("notification lock poisoned")
            .push(ShownNotification {
                title: title.to_owned(),
                body: body.to_owned(),
            });
    }

    pub fn shown(&self) -> Vec<ShownNotification> {
        self.shown.lock().expect("notification lock poisoned").clone()
    }

    /// Platform callback entry point: the user activated a notification.
    pub fn action_invoked(&self, title: &str, action: &str) {
        self.events.emit(
            "notification:action",
            json!({ "title": title, "action": action }),
        );
    }
}

#[derive(Deserialize)]
struct ShowParams {
    title: String,
    #[serde(default)]
    body: String,
}

pub fn register(builder: &mut RegistryBuilder, center: &Arc<NotificationCenter>) {
    let notifications = Arc::clone(center);
    builder.register(
        "notification.show",
        Some(Capability::Notification),
        Threading::Inline,
        move |params| {
            let p: ShowParams = parse_params(params)?;
            notifications.show(&p.title, &p.body);
            Ok(Value::Null)
        },
    );
}
