// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// macOS transport adapter via objc2 and WebKit.
//
// Inbound: a `WKScriptMessageHandler` registered under the name "gangway" on
// the WebView's user content controller; page script posts with
// `window.webkit.messageHandlers.gangway.postMessage(json)`.
// Outbound: `evaluateJavaScript:` calling the well-known dispatch global.
//
// All WebKit interaction requires the main thread. `send_to_script`
// re-asserts that with a `MainThreadMarker` even though the UI executor
// contract already routes callers there.

#![cfg(target_os = "macos")]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{AnyThread, DefinedClass, MainThreadMarker, MainThreadOnly, define_class, msg_send};
use objc2_foundation::{NSObject, NSObjectProtocol, NSString};
use objc2_web_kit::{WKScriptMessage, WKScriptMessageHandler, WKUserContentController, WKWebView};

use gangway_bridge::transport::{InboundHandler, WebViewTransport};
use gangway_core::error::{BridgeError, Result};
use gangway_core::wire::SCRIPT_DISPATCH_FN;

/// Name the page-side glue posts to: `webkit.messageHandlers.<NAME>`.
const MESSAGE_HANDLER_NAME: &str = "gangway";

/// Hook storage shared between the transport and the ObjC handler object.
type SharedHook = std::sync::Arc<Mutex<Option<InboundHandler>>>;

define_class!(
    // SAFETY: NSObject has no subclassing requirements; the class holds only
    // its ivars and is confined to the main thread by WebKit's delivery.
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "GangwayMessageHandler"]
    #[ivars = SharedHook]
    struct MessageBridge;

    unsafe impl NSObjectProtocol for MessageBridge {}

    unsafe impl WKScriptMessageHandler for MessageBridge {
        #[unsafe(method(userContentController:didReceiveScriptMessage:))]
        fn did_receive_script_message(
            &self,
            _controller: &WKUserContentController,
            message: &WKScriptMessage,
        ) {
            // The page posts the request as a JSON string.
            let body = unsafe { message.body() };
            let Ok(text) = body.downcast::<NSString>() else {
                tracing::warn!("non-string script message dropped");
                return;
            };
            let raw = text.to_string().into_bytes();

            let hook = self.ivars().lock().expect("hook lock poisoned").clone();
            match hook {
                Some(hook) => hook(raw),
                None => tracing::debug!("no inbound hook attached, payload dropped"),
            }
        }
    }
);

impl MessageBridge {
    fn new(mtm: MainThreadMarker, hook: SharedHook) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(hook);
        unsafe { msg_send![super(this), init] }
    }
}

/// WKWebView-backed transport.
pub struct WkTransport {
    webview: Retained<WKWebView>,
    // Keeps the handler object alive for the WebView's lifetime.
    _handler: Retained<MessageBridge>,
    hook: SharedHook,
    ready: AtomicBool,
}

// SAFETY: the WebView pointer is only dereferenced under a fresh
// MainThreadMarker (send_to_script) or during main-thread attachment; the
// remaining fields are Send + Sync on their own.
unsafe impl Send for WkTransport {}
unsafe impl Sync for WkTransport {}

impl WkTransport {
    /// Register the message handler on `webview` and return the transport.
    ///
    /// Must be called on the main thread, before the page is loaded so the
    /// glue script finds the handler at startup.
    pub fn attach(webview: Retained<WKWebView>, mtm: MainThreadMarker) -> Self {
        let hook: SharedHook = SharedHook::default();
        let handler = MessageBridge::new(mtm, std::sync::Arc::clone(&hook));

        unsafe {
            let controller = webview.configuration().userContentController();
            controller.addScriptMessageHandler_name(
                ProtocolObject::from_ref(&*handler),
                &NSString::from_str(MESSAGE_HANDLER_NAME),
            );
        }

        tracing::info!("WKWebView script message handler attached");
        Self {
            webview,
            _handler: handler,
            hook,
            ready: AtomicBool::new(false),
        }
    }

    /// Mark the page loaded. Called by the embedder's navigation delegate
    /// once `didFinishNavigation:` fires.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }
}

impl WebViewTransport for WkTransport {
    fn attach_inbound(&self, handler: InboundHandler) {
        *self.hook.lock().expect("hook lock poisoned") = Some(handler);
    }

    fn send_to_script(&self, json: &str) -> Result<()> {
        let _mtm = MainThreadMarker::new().ok_or_else(|| {
            BridgeError::Transport("send_to_script called off the main thread".into())
        })?;

        if !self.is_ready() {
            return Err(BridgeError::Transport("page not loaded".into()));
        }

        // Pass the payload as a JS string literal; the dispatch global parses
        // it. serde_json's string encoding doubles as JS-safe escaping.
        let literal = serde_json::to_string(json)?;
        let snippet = format!("{SCRIPT_DISPATCH_FN}({literal});");

        unsafe {
            self.webview
                .evaluateJavaScript_completionHandler(&NSString::from_str(&snippet), None);
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
