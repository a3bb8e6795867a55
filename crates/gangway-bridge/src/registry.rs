// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handler registry — the mapping from "<module>.<method>" keys to native
// callables.
//
// Registration happens once at startup, from each capability module. The
// builder is then frozen into an immutable map shared by every in-flight
// router invocation, so lookups need no locking at all.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use gangway_core::capability::Capability;
use gangway_core::error::BridgeError;

/// Where a handler's body is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threading {
    /// Cheap and non-blocking — runs directly inside the router call on the
    /// thread that delivered the request.
    Inline,
    /// May block (file I/O, process spawn, modal dialogs) — dispatched to a
    /// blocking worker; the response is built when the worker finishes.
    Offloaded,
}

/// The handler callable. Receives the request `params` and returns the
/// result value or a typed error; panics are caught at the router boundary.
pub type HandlerFn = Arc<dyn Fn(Value) -> Result<Value, BridgeError> + Send + Sync>;

/// One registered `module.method` entry. Owned by the registry for the
/// lifetime of the process.
#[derive(Clone)]
pub struct HandlerEntry {
    pub key: String,
    pub permission: Option<Capability>,
    pub threading: Threading,
    invoke: HandlerFn,
}

impl HandlerEntry {
    pub fn invoke(&self, params: Value) -> Result<Value, BridgeError> {
        (self.invoke)(params)
    }

    /// The raw callable, for offloaded dispatch where the closure outlives
    /// the borrow of the entry.
    pub fn handler_fn(&self) -> HandlerFn {
        Arc::clone(&self.invoke)
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("key", &self.key)
            .field("permission", &self.permission)
            .field("threading", &self.threading)
            .finish_non_exhaustive()
    }
}

/// Mutable registration surface used during startup.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, HandlerEntry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `"<module>.<method>"`.
    ///
    /// Re-registering an existing key overwrites it — last write wins. That
    /// path exists for test doubles; production modules register each key
    /// exactly once.
    pub fn register<F>(
        &mut self,
        key: impl Into<String>,
        permission: Option<Capability>,
        threading: Threading,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(Value) -> Result<Value, BridgeError> + Send + Sync + 'static,
    {
        let key = key.into();
        let entry = HandlerEntry {
            key: key.clone(),
            permission,
            threading,
            invoke: Arc::new(handler),
        };
        if self.entries.insert(key.clone(), entry).is_some() {
            debug!(key, "handler overwritten (test double?)");
        }
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Freeze into the immutable, concurrently-shareable registry.
    pub fn build(self) -> HandlerRegistry {
        debug!(count = self.entries.len(), "handler registry frozen");
        HandlerRegistry {
            entries: Arc::new(self.entries),
        }
    }
}

/// Read-only handler map, safe to share across in-flight router invocations
/// without locking.
#[derive(Clone)]
pub struct HandlerRegistry {
    entries: Arc<HashMap<String, HandlerEntry>>,
}

impl HandlerRegistry {
    pub fn lookup(&self, key: &str) -> Option<&HandlerEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered keys, for diagnostics.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_and_lookup() {
        let mut builder = RegistryBuilder::new();
        builder.register("clipboard.getText", Some(Capability::Clipboard), Threading::Inline, |_| {
            Ok(json!("hello"))
        });
        let registry = builder.build();

        let entry = registry.lookup("clipboard.getText").expect("registered");
        assert_eq!(entry.key, "clipboard.getText");
        assert_eq!(entry.permission, Some(Capability::Clipboard));
        assert_eq!(entry.invoke(Value::Null).expect("invoke"), json!("hello"));
    }

    #[test]
    fn lookup_unknown_key_is_none() {
        let registry = RegistryBuilder::new().build();
        assert!(registry.lookup("no.such").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn reregistration_overwrites_last_write_wins() {
        let mut builder = RegistryBuilder::new();
        builder.register("window.getSize", None, Threading::Inline, |_| Ok(json!(1)));
        builder.register("window.getSize", None, Threading::Inline, |_| Ok(json!(2)));
        let registry = builder.build();

        assert_eq!(registry.len(), 1);
        let entry = registry.lookup("window.getSize").expect("registered");
        assert_eq!(entry.invoke(Value::Null).expect("invoke"), json!(2));
    }

    #[test]
    fn registry_is_cheap_to_clone_and_shared() {
        let mut builder = RegistryBuilder::new();
        builder.register("a.b", None, Threading::Offloaded, |p| Ok(p));
        let registry = builder.build();
        let clone = registry.clone();

        assert!(clone.lookup("a.b").is_some());
        assert_eq!(clone.len(), registry.len());
    }
}
