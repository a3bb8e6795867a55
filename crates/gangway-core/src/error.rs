// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Gangway.
//
// `BridgeError` is the internal error enum used throughout the native side.
// `ErrorCode` is the stable wire taxonomy consumed by script-side error
// objects — its string forms are part of the protocol and must not change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable wire-level error codes.
///
/// Script code matches on these strings, so the serialized forms are frozen.
/// `Cancelled` and `Timeout` keep their historical SCREAMING forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    PlatformError,
    PermissionDenied,
    NotSupported,
    #[serde(rename = "CANCELLED")]
    Cancelled,
    #[serde(rename = "TIMEOUT")]
    Timeout,
}

impl ErrorCode {
    /// The exact string written to the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "ParseError",
            Self::InvalidRequest => "InvalidRequest",
            Self::MethodNotFound => "MethodNotFound",
            Self::InvalidParams => "InvalidParams",
            Self::InternalError => "InternalError",
            Self::PlatformError => "PlatformError",
            Self::PermissionDenied => "PermissionDenied",
            Self::NotSupported => "NotSupported",
            Self::Cancelled => "CANCELLED",
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for all Gangway operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Protocol errors --
    #[error("malformed request payload: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no handler registered for {0}")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    // -- Handler errors --
    #[error("internal error: {0}")]
    Internal(String),

    #[error("platform call failed: {0}")]
    Platform(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not supported on this platform: {0}")]
    NotSupported(String),

    // -- Lifecycle --
    #[error("call cancelled")]
    Cancelled,

    #[error("call timed out")]
    Timeout,

    // -- Ambient --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

impl BridgeError {
    /// Map onto the wire taxonomy.
    ///
    /// Ambient errors (I/O, serialization, transport) have no code of their
    /// own: I/O faults surface as `PlatformError` (an OS call failed), the
    /// rest as `InternalError`.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) => ErrorCode::ParseError,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::MethodNotFound(_) => ErrorCode::MethodNotFound,
            Self::InvalidParams(_) => ErrorCode::InvalidParams,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Platform(_) | Self::Io(_) => ErrorCode::PlatformError,
            Self::PermissionDenied(_) => ErrorCode::PermissionDenied,
            Self::NotSupported(_) => ErrorCode::NotSupported,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Timeout => ErrorCode::Timeout,
            Self::Serialization(_) | Self::Transport(_) => ErrorCode::InternalError,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
