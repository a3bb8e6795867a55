// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gangway Capabilities — the native modules exposed over the bridge.
//
// Each module registers its handler entries with the registry at startup and
// may emit events at any later time; modules never touch the transport or
// the correlation table directly (window close goes through the manager,
// which owns the sweep).
//
// The full method surface is enumerated in `KnownMethod` so internal code
// gets exhaustiveness checks; the wire boundary still falls back to string
// lookup, keeping external extensibility.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use gangway_bridge::registry::RegistryBuilder;
use gangway_core::error::BridgeError;

pub mod clipboard;
pub mod dialog;
pub mod fs;
pub mod notification;
pub mod shell;
pub mod tray;
pub mod window;

pub use clipboard::ClipboardStore;
pub use dialog::{AutoConfirmDialogs, DialogBackend};
pub use fs::FsScope;
pub use notification::NotificationCenter;
pub use shell::{ShellOpener, SystemOpener};
pub use tray::Tray;
pub use window::WindowManager;

/// Every built-in `(module, method)` pair.
///
/// A closed enumeration of the surface this crate registers. Adding a
/// handler without a variant (or vice versa) trips the completeness check in
/// `register_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownMethod {
    WindowGetSize,
    WindowSetSize,
    WindowSetTitle,
    WindowClose,
    ClipboardGetText,
    ClipboardSetText,
    FsReadTextFile,
    FsWriteTextFile,
    DialogMessage,
    ShellOpen,
    NotificationShow,
    TraySetTooltip,
}

impl KnownMethod {
    pub const ALL: [KnownMethod; 12] = [
        KnownMethod::WindowGetSize,
        KnownMethod::WindowSetSize,
        KnownMethod::WindowSetTitle,
        KnownMethod::WindowClose,
        KnownMethod::ClipboardGetText,
        KnownMethod::ClipboardSetText,
        KnownMethod::FsReadTextFile,
        KnownMethod::FsWriteTextFile,
        KnownMethod::DialogMessage,
        KnownMethod::ShellOpen,
        KnownMethod::NotificationShow,
        KnownMethod::TraySetTooltip,
    ];

    /// The wire key, `"<module>.<method>"`.
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::WindowGetSize => "window.getSize",
            Self::WindowSetSize => "window.setSize",
            Self::WindowSetTitle => "window.setTitle",
            Self::WindowClose => "window.close",
            Self::ClipboardGetText => "clipboard.getText",
            Self::ClipboardSetText => "clipboard.setText",
            Self::FsReadTextFile => "fs.readTextFile",
            Self::FsWriteTextFile => "fs.writeTextFile",
            Self::DialogMessage => "dialog.message",
            Self::ShellOpen => "shell.open",
            Self::NotificationShow => "notification.show",
            Self::TraySetTooltip => "tray.setTooltip",
        }
    }

    /// Inverse of `as_key`, for wire-boundary classification.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_key() == key)
    }
}

/// Everything the capability modules need at registration time.
pub struct CapabilityDeps {
    pub windows: Arc<WindowManager>,
    pub clipboard: Arc<ClipboardStore>,
    /// `None` disables the filesystem surface (`NotSupported`).
    pub fs: Option<Arc<FsScope>>,
    pub dialogs: Arc<dyn DialogBackend>,
    pub shell: Arc<dyn ShellOpener>,
    pub notifications: Arc<NotificationCenter>,
    pub tray: Arc<Tray>,
}

/// Register the whole capability surface.
pub fn register_all(builder: &mut RegistryBuilder, deps: &CapabilityDeps) {
    window::register(builder, &deps.windows);
    clipboard::register(builder, &deps.clipboard);
    fs::register(builder, deps.fs.as_ref());
    dialog::register(builder, &deps.dialogs);
    shell::register(builder, &deps.shell);
    notification::register(builder, &deps.notifications);
    tray::register(builder, &deps.tray);

    // Completeness check: every known method must now be registered.
    for method in KnownMethod::ALL {
        debug_assert!(
            builder.contains(method.as_key()),
            "known method {} not registered",
            method.as_key()
        );
    }
}

/// Deserialize handler params, mapping failures to `InvalidParams`.
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, BridgeError> {
    serde_json::from_value(params).map_err(|e| BridgeError::InvalidParams(e.to_string()))
}
