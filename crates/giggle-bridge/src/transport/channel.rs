// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process host channel.
//
// Stands in for a WebKit handler or Android interface when the "native" side
// lives in the same process: host harnesses, desktop shells, tests. Envelopes
// are encoded exactly as the real channel would receive them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::mpsc;

use giggle_core::{BridgeError, CallEnvelope, EnvelopeEncoding, Result, TransportKind};

use super::NativeTransport;

/// What the host end of a [`ChannelTransport`] receives.
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    /// `postMessage(JSON.stringify(envelope))`
    Json(String),
    /// `postMessage(envelope)`
    Object(Value),
}

impl HostMessage {
    /// Decode the envelope on the host side.
    pub fn envelope(&self) -> Result<CallEnvelope> {
        match self {
            HostMessage::Json(text) => CallEnvelope::from_json(text),
            HostMessage::Object(value) => Ok(serde_json::from_value(value.clone())?),
        }
    }
}

/// Shared on/off flag emulating a host that installs or removes its handler.
#[derive(Debug, Clone)]
pub struct TransportSwitch(Arc<AtomicBool>);

impl TransportSwitch {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn on(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn off(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Host channel backed by an unbounded tokio mpsc queue.
pub struct ChannelTransport {
    kind: TransportKind,
    encoding: EnvelopeEncoding,
    name: String,
    tx: mpsc::UnboundedSender<HostMessage>,
    switch: TransportSwitch,
}

impl ChannelTransport {
    /// Create the transport and the receiver the host reads from.
    ///
    /// Android interfaces only accept strings, so `encoding` is forced to
    /// [`EnvelopeEncoding::Json`] for them.
    pub fn new(
        kind: TransportKind,
        encoding: EnvelopeEncoding,
    ) -> (Self, mpsc::UnboundedReceiver<HostMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let encoding = match kind {
            TransportKind::AndroidInterface => EnvelopeEncoding::Json,
            TransportKind::WebKit => encoding,
        };
        let transport = Self {
            kind,
            encoding,
            name: "giggleBridge".into(),
            tx,
            switch: TransportSwitch::new(),
        };
        (transport, rx)
    }

    /// Rename the channel (only affects labels).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn encoding(&self) -> EnvelopeEncoding {
        self.encoding
    }

    /// Handle for toggling availability after the transport has been moved
    /// into a selector.
    pub fn switch(&self) -> TransportSwitch {
        self.switch.clone()
    }
}

impl NativeTransport for ChannelTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn label(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }

    fn is_available(&self) -> bool {
        self.switch.is_on() && !self.tx.is_closed()
    }

    fn deliver(&self, envelope: &CallEnvelope) -> Result<()> {
        let message = match self.encoding {
            EnvelopeEncoding::Json => HostMessage::Json(envelope.to_json()?),
            EnvelopeEncoding::Object => HostMessage::Object(serde_json::to_value(envelope)?),
        };
        self.tx
            .send(message)
            .map_err(|_| BridgeError::delivery(self.label(), "host channel closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giggle_core::CallbackId;
    use serde_json::json;

    #[test]
    fn android_is_always_json() {
        let (transport, _rx) =
            ChannelTransport::new(TransportKind::AndroidInterface, EnvelopeEncoding::Object);
        assert_eq!(transport.encoding(), EnvelopeEncoding::Json);
    }

    #[test]
    fn host_decodes_what_was_sent() {
        let (transport, mut rx) =
            ChannelTransport::new(TransportKind::WebKit, EnvelopeEncoding::Object);
        let env = CallEnvelope::new(
            "Router",
            "route",
            json!({"url": "giggleacademy://unity/playGame"}),
            CallbackId::from("cb_7"),
        );
        transport.deliver(&env).unwrap();

        let received = rx.try_recv().unwrap();
        assert!(matches!(received, HostMessage::Object(_)));
        assert_eq!(received.envelope().unwrap(), env);
    }

    #[test]
    fn send_after_host_hangs_up_is_delivery_error() {
        let (transport, rx) =
            ChannelTransport::new(TransportKind::AndroidInterface, EnvelopeEncoding::Json);
        drop(rx);
        let env = CallEnvelope::new("Router", "dismiss", Value::Null, CallbackId::from("cb_1"));
        match transport.deliver(&env) {
            Err(BridgeError::Delivery { transport, .. }) => {
                assert_eq!(transport, "android:giggleBridge")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
