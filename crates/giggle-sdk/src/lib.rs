// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Giggle SDK: what web content uses to talk to the Giggle Academy app.
//
// `Bridge` covers navigation (Router), preference reads (Preference) and the
// cached Platform Info record. In a webview build the same surface is
// exported to JavaScript as `GiggleBridge`.

pub mod bridge;
pub mod page_handlers;
pub mod plugins;
pub mod telemetry;
pub mod wasm;

pub use bridge::{Bridge, UNITY_ROUTE_PREFIX};
pub use page_handlers::PageHandlers;
pub use plugins::{PreferencePlugin, RouterPlugin};
pub use telemetry::init_logging;

pub use giggle_bridge::{ChannelTransport, HostMessage, NativeBridge, TransportSelector, host_transports};
pub use giggle_core::{BridgeConfig, BridgeError, BuildProfile, PlatformInfo, Result};
