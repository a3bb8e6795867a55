// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability tags and the per-instance grant set.
//
// A handler entry may declare that it requires one capability; the router
// checks the declaration against the grant set before the handler runs.
// Denial happens strictly before invocation, so it is side-effect-free.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Permission tags for handler entries.
///
/// One tag per capability module; finer-grained scoping (e.g. per-path
/// filesystem rules) lives inside the owning module, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Window,
    Clipboard,
    Dialog,
    FileSystem,
    Shell,
    Notification,
    Tray,
}

impl Capability {
    /// All capabilities, in a stable order. Used by `CapabilityGrants::all`.
    pub const ALL: [Capability; 7] = [
        Capability::Window,
        Capability::Clipboard,
        Capability::Dialog,
        Capability::FileSystem,
        Capability::Shell,
        Capability::Notification,
        Capability::Tray,
    ];
}

/// The set of capabilities granted to this app instance.
///
/// Built once at startup from `AppConfig` and treated as read-only
/// afterwards; cloning is cheap enough for the handful of entries involved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityGrants {
    granted: HashSet<Capability>,
}

impl CapabilityGrants {
    /// Empty grant set — every gated handler is denied.
    pub fn none() -> Self {
        Self::default()
    }

    /// Grant everything. Used by dev builds and most tests.
    pub fn all() -> Self {
        Self {
            granted: Capability::ALL.into_iter().collect(),
        }
    }

    pub fn from_iter(caps: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            granted: caps.into_iter().collect(),
        }
    }

    pub fn grant(&mut self, cap: Capability) {
        self.granted.insert(cap);
    }

    pub fn revoke(&mut self, cap: Capability) {
        self.granted.remove(&cap);
    }

    /// Whether a handler gated on `requirement` may run.
    ///
    /// Ungated handlers (`None`) always pass.
    pub fn allows(&self, requirement: Option<Capability>) -> bool {
        match requirement {
            None => true,
            Some(cap) => self.granted.contains(&cap),
        }
    }
}
