// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Giggle bridge: core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod platform;
pub mod types;

pub use config::{BridgeConfig, BuildProfile, IdStrategy};
pub use error::{BridgeError, ErrorClass, Result};
pub use platform::PlatformInfo;
pub use types::*;
