// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gangway — Core wire types and error definitions shared across all crates.

pub mod capability;
pub mod config;
pub mod error;
pub mod wire;

pub use capability::{Capability, CapabilityGrants};
pub use config::AppConfig;
pub use error::{BridgeError, ErrorCode};
pub use wire::*;
