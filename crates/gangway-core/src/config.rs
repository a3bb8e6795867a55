// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::capability::{Capability, CapabilityGrants};

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window title for the main WebView window.
    pub window_title: String,
    /// Initial window size (logical pixels).
    pub window_width: u32,
    pub window_height: u32,
    /// Capabilities granted to web content in this instance.
    pub granted_capabilities: Vec<Capability>,
    /// Root directory that `fs.*` handlers are confined to.
    /// `None` means the filesystem capability is effectively disabled.
    pub fs_scope: Option<PathBuf>,
    /// URL loaded into the WebView at startup (dev server or bundled asset).
    pub start_url: String,
}

impl AppConfig {
    /// Build the runtime grant set from the configured capability list.
    pub fn grants(&self) -> CapabilityGrants {
        CapabilityGrants::from_iter(self.granted_capabilities.iter().copied())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_title: "Gangway".into(),
            window_width: 1024,
            window_height: 768,
            // Shell is deliberately absent from the default grants — opening
            // external programs requires an explicit opt-in.
            granted_capabilities: vec![
                Capability::Window,
                Capability::Clipboard,
                Capability::Dialog,
                Capability::Notification,
                Capability::Tray,
            ],
            fs_scope: None,
            start_url: "http://localhost:5173".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grants_exclude_shell_and_fs() {
        let grants = AppConfig::default().grants();
        assert!(grants.allows(Some(Capability::Clipboard)));
        assert!(!grants.allows(Some(Capability::Shell)));
        assert!(!grants.allows(Some(Capability::FileSystem)));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).expect("serialize");
        let back: AppConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.window_title, config.window_title);
        assert_eq!(back.granted_capabilities, config.granted_capabilities);
    }
}
