// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gangway Bridge — the message-passing subsystem connecting script running in
// the WebView to native handler code.
//
// Script calls arrive as JSON over the platform transport, are routed to a
// registered handler, and the handler's result travels back correlated by the
// caller-generated request id. Native-originated events flow the other way,
// uncorrelated, to script listeners.

pub mod context;
pub mod correlate;
pub mod events;
pub mod registry;
pub mod router;
pub mod script;
pub mod transport;

pub use context::BridgeContext;
pub use correlate::{CallError, CallOutcome, CorrelationTable};
pub use events::{EventDispatcher, EventSubscription};
pub use registry::{HandlerEntry, HandlerRegistry, RegistryBuilder, Threading};
pub use router::Router;
pub use script::ScriptPort;
pub use transport::{InboundHandler, UiExecutor, UiJob, WebViewTransport};
