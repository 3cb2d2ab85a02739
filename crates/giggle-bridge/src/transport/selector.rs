// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-call transport selection: WebKit handler, then Android interface, then
// nothing. At most one channel is tried per call.

use tracing::debug;

use giggle_core::{BridgeError, CallEnvelope, Result, TransportKind};

use super::NativeTransport;

fn priority(kind: TransportKind) -> u8 {
    match kind {
        TransportKind::WebKit => 0,
        TransportKind::AndroidInterface => 1,
    }
}

/// Ordered set of candidate host channels.
#[derive(Default)]
pub struct TransportSelector {
    candidates: Vec<Box<dyn NativeTransport>>,
}

impl TransportSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, transport: impl NativeTransport + 'static) -> Self {
        self.push(Box::new(transport));
        self
    }

    /// Add a candidate. Candidates stay ordered by channel priority; equal
    /// kinds keep insertion order.
    pub fn push(&mut self, transport: Box<dyn NativeTransport>) {
        let rank = priority(transport.kind());
        let at = self
            .candidates
            .iter()
            .position(|t| priority(t.kind()) > rank)
            .unwrap_or(self.candidates.len());
        self.candidates.insert(at, transport);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// First candidate the host currently exposes.
    pub fn select(&self) -> Option<&dyn NativeTransport> {
        self.candidates
            .iter()
            .find(|t| t.is_available())
            .map(|t| &**t)
    }

    /// Channel family a call made right now would use.
    pub fn active_kind(&self) -> Option<TransportKind> {
        self.select().map(|t| t.kind())
    }

    /// Deliver through the selected channel.
    ///
    /// Fails with [`BridgeError::TransportUnavailable`] when nothing is
    /// exposed. Any other failure is reported as [`BridgeError::Delivery`]
    /// tagged with the channel's label.
    pub fn deliver(&self, envelope: &CallEnvelope) -> Result<TransportKind> {
        let transport = self.select().ok_or(BridgeError::TransportUnavailable)?;
        debug!(
            transport = %transport.label(),
            plugin = envelope.plugin(),
            method = envelope.method(),
            "delivering envelope"
        );

        transport.deliver(envelope).map_err(|err| match err {
            err @ (BridgeError::Delivery { .. } | BridgeError::TransportUnavailable) => err,
            other => BridgeError::delivery(transport.label(), other),
        })?;
        Ok(transport.kind())
    }
}
