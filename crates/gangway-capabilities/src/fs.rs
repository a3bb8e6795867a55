// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Filesystem capability.
//
// Real file I/O, confined to a configured scope directory. Paths are
// validated before touching the disk: absolute paths and any `..` component
// are rejected outright, so scope checks do not depend on what currently
// exists on disk. Both handlers are offloaded — file I/O never runs on the
// UI thread.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use gangway_bridge::registry::{RegistryBuilder, Threading};
use gangway_core::capability::Capability;
use gangway_core::error::BridgeError;

use crate::parse_params;

/// Root directory that all `fs.*` paths resolve inside.
pub struct FsScope {
    root: PathBuf,
}

impl FsScope {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a scope-relative path, rejecting escapes.
    fn resolve(&self, relative: &str) -> Result<PathBuf, BridgeError> {
        let path = Path::new(relative);
        if path.is_absolute() {
            return Err(BridgeError::InvalidParams(format!(
                "absolute path {relative:?} not allowed"
            )));
        }
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(BridgeError::InvalidParams(format!(
                "path {relative:?} escapes the filesystem scope"
            )));
        }
        Ok(self.root.join(path))
    }

    pub fn read_text_file(&self, relative: &str) -> Result<String, BridgeError> {
        let path = self.resolve(relative)?;
        debug!(path = %path.display(), "reading text file");
        Ok(std::fs::read_to_string(path)?)
    }

    pub fn write_text_file(&self, relative: &str, contents: &str) -> Result<(), BridgeError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), bytes = contents.len(), "writing text file");
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ReadParams {
    path: String,
}

#[derive(Deserialize)]
struct WriteParams {
    path: String,
    contents: String,
}

pub fn register(builder: &mut RegistryBuilder, scope: Option<&Arc<FsScope>>) {
    match scope {
        Some(scope) => {
            let fs = Arc::clone(scope);
            builder.register(
                "fs.readTextFile",
                Some(Capability::FileSystem),
                Threading::Offloaded,
                move |params| {
                    let p: ReadParams = parse_params(params)?;
                    Ok(json!(fs.read_text_file(&p.path)?))
                },
            );

            let fs = Arc::clone(scope);
            builder.register(
                "fs.writeTextFile",
                Some(Capability::FileSystem),
                Threading::Offloaded,
                move |params| {
                    let p: WriteParams = parse_params(params)?;
                    fs.write_text_file(&p.path, &p.contents)?;
                    Ok(Value::Null)
                },
            );
        }
        None => {
            // No scope configured — the surface stays registered so callers
            // get a stable NotSupported instead of MethodNotFound.
            for key in ["fs.readTextFile", "fs.writeTextFile"] {
                builder.register(
                    key,
                    Some(Capability::FileSystem),
                    Threading::Inline,
                    move |_| {
                        Err(BridgeError::NotSupported(
                            "no filesystem scope configured".into(),
                        ))
                    },
                );
            }
        }
    }
}
