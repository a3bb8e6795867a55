// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shell capability — open a URL with the system handler.
//
// The scheme allow-list is enforced before the opener runs; `file:` and
// custom schemes stay blocked even when the capability itself is granted.
// Launching an external program can block on slow desktops, hence offloaded.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use gangway_bridge::registry::{RegistryBuilder, Threading};
use gangway_core::capability::Capability;
use gangway_core::error::BridgeError;

use crate::parse_params;

/// Schemes web content is allowed to hand to the OS.
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Hands a validated URL to the operating system.
pub trait ShellOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), BridgeError>;
}

/// Real opener backed by the platform's default-handler mechanism.
#[derive(Default)]
pub struct SystemOpener;

impl ShellOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), BridgeError> {
        info!(url, "opening with system handler");
        open::that(url).map_err(|e| BridgeError::Platform(format!("open {url:?}: {e}")))
    }
}

fn validate_scheme(url: &str) -> Result<(), BridgeError> {
    let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or_default();
    if ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
        Ok(())
    } else {
        warn!(url, "blocked url scheme");
        Err(BridgeError::InvalidParams(format!(
            "scheme {scheme:?} is not allowed"
        )))
    }
}

#[derive(Deserialize)]
struct OpenParams {
    url: String,
}

pub fn register(builder: &mut RegistryBuilder, opener: &Arc<dyn ShellOpener>) {
    let shell = Arc::clone(opener);
    builder.register(
        "shell.open",
        Some(Capability::Shell),
        Threading::Offloaded,
        move |params| {
            let p: OpenParams = parse_params(params)?;
            validate_scheme(&p.url)?;
            shell.open(&p.url)?;
            Ok(Value::Null)
        },
    );
}
