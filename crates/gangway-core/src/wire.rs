// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire-format types for the WebView message channel.
//
// All three message shapes travel as UTF-8 JSON. Deserialization is tolerant
// of unknown fields (script glue may attach extras) and strict about required
// ones. A `BridgeResponse` carries exactly one of `result`/`error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorCode;

/// Sentinel id used when a malformed payload yields no recoverable id.
pub const SENTINEL_ID: &str = "?";

/// Well-known JS global that receives native-to-script payloads.
pub const SCRIPT_DISPATCH_FN: &str = "window.__gangway.dispatch";

/// A script-originated call: `{ id, module, method, params }`.
///
/// `id` is opaque and caller-generated; it must be unique among the caller's
/// in-flight requests but carries no meaning on the native side beyond
/// correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub id: String,
    pub module: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl BridgeRequest {
    pub fn new(
        id: impl Into<String>,
        module: impl Into<String>,
        method: impl Into<String>,
        params: Value,
    ) -> Self {
        Self {
            id: id.into(),
            module: module.into(),
            method: method.into(),
            params,
        }
    }

    /// The registry lookup key, `"<module>.<method>"`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.module, self.method)
    }
}

/// Wire-level error object inside a failed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// The native reply to a `BridgeRequest`, matched by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl BridgeResponse {
    /// Successful response. `result` is always serialized, even when null,
    /// so script glue can distinguish "resolved with null" from a bad frame.
    pub fn ok(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Failed response with a taxonomy code and human-readable message.
    pub fn err(id: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: false,
            result: None,
            error: Some(WireError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Failed response carrying structured detail alongside the message.
    pub fn err_with_data(
        id: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        data: Value,
    ) -> Self {
        let mut resp = Self::err(id, code, message);
        if let Some(ref mut e) = resp.error {
            e.data = Some(data);
        }
        resp
    }
}

/// An unsolicited native-to-script message. Never correlated to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Discriminator, always `"event"` on the wire.
    #[serde(rename = "type")]
    pub kind: String,
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl BridgeEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            kind: "event".into(),
            event: event.into(),
            data,
        }
    }
}

/// A payload arriving on the script side: either a correlated response or an
/// unsolicited event. Discriminated by the `"type"` field.
#[derive(Debug, Clone)]
pub enum InboundMessage {
    Response(BridgeResponse),
    Event(BridgeEvent),
}

impl InboundMessage {
    /// Classify and decode a raw payload delivered to the script side.
    ///
    /// Returns `None` for frames that are neither — such frames are dropped
    /// by the script glue rather than surfaced as errors.
    pub fn decode(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        if value.get("type").and_then(Value::as_str) == Some("event") {
            return serde_json::from_value(value).ok().map(Self::Event);
        }
        if value.get("id").is_some() {
            return serde_json::from_value(value).ok().map(Self::Response);
        }
        None
    }
}
