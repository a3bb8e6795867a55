// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gangway WebView — per-platform transport adapters.
//
// The bridge core speaks to the page exclusively through the
// `WebViewTransport` and `UiExecutor` traits defined in `gangway-bridge`.
// This crate provides the implementations: a WKWebView adapter on macOS, a
// fully functional in-process headless transport for tests/CI/dev runs, and
// a stub for platforms without a native binding yet.

pub mod headless;
pub mod tokio_ui;

#[cfg(target_os = "macos")]
pub mod macos;

pub mod stub;

/// Whether a native WebView adapter exists for the current target.
pub fn native_webview_available() -> bool {
    cfg!(target_os = "macos")
}
