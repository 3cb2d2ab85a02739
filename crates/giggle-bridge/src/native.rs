// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The native bridge: one register, one transport selector, one handler table.
//
// Owns every pending call it issues; dropping the bridge cancels them.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use giggle_core::{
    BridgeConfig, BridgeError, CallEnvelope, CallbackId, ResponseEnvelope, Result, TransportKind,
};

use crate::handlers::NativeCallRegistry;
use crate::register::CallbackRegister;
use crate::timer;
use crate::transport::selector::TransportSelector;

pub struct NativeBridge {
    register: CallbackRegister,
    transports: TransportSelector,
    handlers: NativeCallRegistry,
    call_timeout: Option<Duration>,
}

impl NativeBridge {
    pub fn new(config: &BridgeConfig, transports: TransportSelector) -> Self {
        Self {
            register: CallbackRegister::new(config.callback_ids),
            transports,
            handlers: NativeCallRegistry::new(),
            call_timeout: config.call_timeout(),
        }
    }

    /// Send `plugin.method(params)` to the native host and wait for its
    /// response.
    ///
    /// Fails with [`BridgeError::TransportUnavailable`] when no host channel
    /// is exposed, [`BridgeError::Delivery`] when handing over the envelope
    /// throws, [`BridgeError::Native`] when the host answers with an error,
    /// and [`BridgeError::Timeout`] when a configured timeout elapses.
    #[instrument(skip(self, params), fields(callback_id = tracing::field::Empty))]
    pub async fn call_native(&self, plugin: &str, method: &str, params: Value) -> Result<Value> {
        let (callback_id, mut reply) = self.register.issue();
        tracing::Span::current().record("callback_id", callback_id.as_str());

        let envelope = CallEnvelope::new(plugin, method, params, callback_id.clone());
        match self.transports.deliver(&envelope) {
            Ok(kind) => debug!(transport = %kind, "native call sent"),
            Err(err) => {
                warn!(error = %err, "native call not delivered");
                self.register.reject(&callback_id, err);
            }
        }

        let Some(limit) = self.call_timeout else {
            return reply.await;
        };

        tokio::select! {
            biased;
            outcome = &mut reply => outcome,
            _ = timer::sleep(limit) => {
                let after_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                self.register.expire(&callback_id);
                warn!(after_ms, "native call timed out");
                Err(BridgeError::Timeout {
                    callback_id: callback_id.to_string(),
                    after_ms,
                })
            }
        }
    }

    /// String-variant response delivery: `body` is a JSON `{error?, data?}`.
    /// Returns whether a pending call matched.
    pub fn handle_callback(&self, callback_id: &str, body: &str) -> bool {
        self.register
            .resolve_encoded(&CallbackId::from(callback_id), body)
    }

    /// Object-variant response delivery.
    pub fn handle_response(&self, envelope: ResponseEnvelope) -> bool {
        self.register.resolve_envelope(envelope)
    }

    /// Entry point for calls the host initiates.
    pub fn receive_native_call(&self, method: &str, data: Value) -> Result<Value> {
        self.handlers.dispatch(method, data)
    }

    pub fn handlers(&self) -> &NativeCallRegistry {
        &self.handlers
    }

    pub fn register(&self) -> &CallbackRegister {
        &self.register
    }

    pub fn transports(&self) -> &TransportSelector {
        &self.transports
    }

    /// Channel family the next call would use, if any.
    pub fn active_transport(&self) -> Option<TransportKind> {
        self.transports.active_kind()
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::NativeTransport;
    use crate::transport::channel::{ChannelTransport, HostMessage};
    use giggle_core::{EnvelopeEncoding, IdStrategy};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn config() -> BridgeConfig {
        BridgeConfig {
            callback_ids: IdStrategy::Sequential,
            ..BridgeConfig::default()
        }
    }

    fn android_bridge(config: &BridgeConfig) -> (Arc<NativeBridge>, UnboundedReceiver<HostMessage>) {
        let (transport, rx) =
            ChannelTransport::new(TransportKind::AndroidInterface, EnvelopeEncoding::Json);
        let bridge = NativeBridge::new(config, TransportSelector::new().with(transport));
        (Arc::new(bridge), rx)
    }

    #[tokio::test]
    async fn no_transport_rejects_immediately() {
        let bridge = NativeBridge::new(&config(), TransportSelector::new());
        let err = bridge
            .call_native("Router", "dismiss", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::TransportUnavailable));
        assert_eq!(bridge.register().pending_count(), 0);
    }

    /// Handler that is present but throws from `postMessage`.
    struct ThrowingHandler;

    impl NativeTransport for ThrowingHandler {
        fn kind(&self) -> TransportKind {
            TransportKind::WebKit
        }

        fn is_available(&self) -> bool {
            true
        }

        fn deliver(&self, _envelope: &CallEnvelope) -> Result<()> {
            Err(BridgeError::Config("TypeError: cyclic object value".into()))
        }
    }

    #[tokio::test]
    async fn delivery_failure_rejects_and_clears_entry() {
        let bridge = NativeBridge::new(&config(), TransportSelector::new().with(ThrowingHandler));
        let err = bridge
            .call_native("Router", "dismiss", Value::Null)
            .await
            .unwrap_err();
        match err {
            BridgeError::Delivery { transport, reason } => {
                assert_eq!(transport, "webkit");
                assert!(reason.contains("cyclic"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(bridge.register().pending_count(), 0);
    }

    #[tokio::test]
    async fn closed_host_channel_counts_as_unavailable() {
        let (bridge, rx) = android_bridge(&config());
        drop(rx);
        let err = bridge
            .call_native("Router", "dismiss", Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::TransportUnavailable));
        assert_eq!(bridge.active_transport(), None);
    }

    #[tokio::test]
    async fn host_response_completes_call() {
        let (bridge, mut rx) = android_bridge(&config());

        let caller = {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move {
                bridge
                    .call_native("Preference", "readValues", json!({}))
                    .await
            })
        };

        let message = rx.recv().await.unwrap();
        let envelope = message.envelope().unwrap();
        assert_eq!(envelope.callback_id().as_str(), "cb_1");
        assert_eq!(envelope.plugin(), "Preference");

        assert!(bridge.handle_callback("cb_1", r#"{"data": {"userId": "42"}}"#));
        assert_eq!(caller.await.unwrap().unwrap(), json!({"userId": "42"}));
    }

    #[tokio::test]
    async fn timeout_expires_entry() {
        let config = BridgeConfig {
            call_timeout_ms: Some(20),
            ..config()
        };
        let (bridge, mut rx) = android_bridge(&config);

        let err = bridge
            .call_native("Router", "route", json!({"url": "x"}))
            .await
            .unwrap_err();
        match err {
            BridgeError::Timeout { callback_id, after_ms } => {
                assert_eq!(callback_id, "cb_1");
                assert_eq!(after_ms, 20);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(bridge.register().pending_count(), 0);

        // The host answers late; nothing happens.
        assert!(rx.try_recv().is_ok());
        assert!(!bridge.handle_callback("cb_1", r#"{"data": 1}"#));
    }

    #[tokio::test]
    async fn response_within_timeout_wins() {
        let config = BridgeConfig {
            call_timeout_ms: Some(5_000),
            ..config()
        };
        let (bridge, mut rx) = android_bridge(&config);

        let host = {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move {
                let envelope = rx.recv().await.unwrap().envelope().unwrap();
                bridge.handle_response(ResponseEnvelope::success(
                    envelope.callback_id().clone(),
                    json!("ok"),
                ))
            })
        };

        let out = bridge.call_native("Router", "dismiss", json!({})).await;
        assert_eq!(out.unwrap(), json!("ok"));
        assert!(host.await.unwrap());
    }

    #[test]
    fn receive_native_call_uses_registry() {
        let bridge = NativeBridge::new(&config(), TransportSelector::new());
        bridge
            .handlers()
            .register("getScroll", |_| json!(120))
            .unwrap();

        assert_eq!(bridge.receive_native_call("getScroll", Value::Null).unwrap(), json!(120));
        assert!(matches!(
            bridge.receive_native_call("missing", Value::Null),
            Err(BridgeError::UnknownNativeMethod(_))
        ));
    }
}
