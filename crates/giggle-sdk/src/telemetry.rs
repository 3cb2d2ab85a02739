// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup.

/// Install the global `tracing` subscriber.
///
/// Native builds log to stderr through `tracing-subscriber`, filtered by
/// `RUST_LOG` or, when that is unset or invalid, by `default_directive`
/// (e.g. `"info"` or `"giggle_bridge=debug"`). In a webview the events go to
/// the browser console through `tracing-wasm`.
///
/// Returns `false` if a subscriber was already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(default_directive: &str) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging(default_directive: &str) -> bool {
    use std::sync::atomic::{AtomicBool, Ordering};

    static INSTALLED: AtomicBool = AtomicBool::new(false);

    if INSTALLED.swap(true, Ordering::AcqRel) {
        return false;
    }
    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(max_level(default_directive))
        .build();
    tracing_wasm::set_as_global_default_with_config(config);
    true
}

/// Coarse level from a directive such as `"debug"` or `"giggle_bridge=warn"`.
/// The console layer has no per-target filtering, so only the level is kept.
#[cfg(target_arch = "wasm32")]
fn max_level(directive: &str) -> tracing::Level {
    let level = directive.rsplit('=').next().unwrap_or(directive);
    level.trim().parse().unwrap_or(tracing::Level::INFO)
}
