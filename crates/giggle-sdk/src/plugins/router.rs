// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Router plugin: navigation and loading-overlay control.

use std::sync::Arc;

use serde_json::json;

use giggle_bridge::NativeBridge;
use giggle_core::{Result, method, plugin};

/// Native `Router` plugin. Results are discarded; only failures surface.
#[derive(Clone)]
pub struct RouterPlugin {
    native: Arc<NativeBridge>,
}

impl RouterPlugin {
    pub fn new(native: Arc<NativeBridge>) -> Self {
        Self { native }
    }

    /// Ask the host to open `url` (usually a `giggleacademy://` deep link).
    pub async fn route(&self, url: &str) -> Result<()> {
        self.native
            .call_native(plugin::ROUTER, method::ROUTE, json!({ "url": url }))
            .await
            .map(drop)
    }

    /// Close the current webview.
    pub async fn dismiss(&self) -> Result<()> {
        self.native
            .call_native(plugin::ROUTER, method::DISMISS, json!({}))
            .await
            .map(drop)
    }

    /// Hide the host's loading overlay.
    pub async fn dismiss_loading(&self) -> Result<()> {
        self.native
            .call_native(plugin::ROUTER, method::DISMISS_LOADING, json!({}))
            .await
            .map(drop)
    }
}
