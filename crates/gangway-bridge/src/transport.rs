// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transport abstraction the router sits on top of.
//
// The transport is the only per-platform piece of the bridge: WKWebView
// script-message handlers on macOS, `WebKitUserContentManager` signals on
// GTK, `WebMessageReceived` on WebView2. Everything above it speaks plain
// UTF-8 JSON strings.
//
// Thread affinity is the sharp edge here. Every platform WebView API demands
// that script evaluation happen on its UI thread, and violating that is a
// crash, not a correctness bug. The `UiExecutor` trait makes that requirement
// an interface-level contract: callers never invoke `send_to_script` from an
// arbitrary thread, they submit a job to the executor that owns the UI
// thread, and the executor runs jobs one at a time in submission order. The
// single-consumer design doubles as the single-writer guarantee per WebView.

use gangway_core::error::Result;
use std::sync::Arc;

/// A unit of work that must run on the UI thread.
pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// Executor that owns the platform UI thread.
///
/// Jobs run in FIFO submission order, one at a time. This ordering is what
/// the event dispatcher relies on for per-event-name FIFO delivery.
pub trait UiExecutor: Send + Sync {
    fn submit(&self, job: UiJob);
}

/// Callback invoked with each raw payload the WebView pushes to native.
pub type InboundHandler = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// One direction-pair of the WebView message channel.
///
/// Implementations register the platform inbound hook via `attach_inbound`
/// and deliver native payloads into the page via `send_to_script`. The
/// payload contract is uniform — a serialized `BridgeResponse` or
/// `BridgeEvent` — even though the evaluation snippet differs per platform.
pub trait WebViewTransport: Send + Sync {
    /// Register the hook that receives script-to-native payloads.
    ///
    /// Called once during context attachment; a later call replaces the
    /// previous hook.
    fn attach_inbound(&self, handler: InboundHandler);

    /// Deliver a JSON payload into the WebView's script context.
    ///
    /// Must only be called from the UI executor's thread.
    fn send_to_script(&self, json: &str) -> Result<()>;

    /// Whether the page has loaded far enough to receive payloads.
    ///
    /// Events emitted before readiness are dropped, not queued.
    fn is_ready(&self) -> bool;
}
