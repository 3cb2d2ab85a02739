// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Giggle bridge: call/callback correlation between web content and the
// native host.
//
// Outgoing calls get a callback id from the `CallbackRegister`, are handed to
// the first available host channel by the `TransportSelector`, and complete
// when the host answers through `NativeBridge::handle_callback` (JSON string)
// or `NativeBridge::handle_response` (structured envelope).

pub mod handlers;
pub mod native;
pub mod register;
pub mod transport;

mod timer;

pub use handlers::NativeCallRegistry;
pub use native::NativeBridge;
pub use register::{CallbackRegister, PendingReply};
pub use transport::channel::{ChannelTransport, HostMessage, TransportSwitch};
pub use transport::selector::TransportSelector;
pub use transport::NativeTransport;

use giggle_core::BridgeConfig;

/// Host channels available to this build.
///
/// In a webview (`wasm32`) this is the WebKit message handler followed by the
/// Android JavaScript interface, both named per `config`. Elsewhere there is
/// no ambient host channel and the selector starts empty; attach a
/// [`ChannelTransport`] to talk to an in-process host.
pub fn host_transports(config: &BridgeConfig) -> TransportSelector {
    #[cfg(target_arch = "wasm32")]
    {
        TransportSelector::new()
            .with(transport::web::WebKitHandlerTransport::new(
                config.webkit_handler.clone(),
                config.webkit_encoding,
            ))
            .with(transport::web::AndroidInterfaceTransport::new(
                config.android_interface.clone(),
            ))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        tracing::debug!(
            webkit = %config.webkit_handler,
            android = %config.android_interface,
            "no webview host channels on this target"
        );
        TransportSelector::new()
    }
}
