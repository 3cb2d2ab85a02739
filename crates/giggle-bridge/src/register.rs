// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Callback register: pending native calls keyed by callback id.
//
// Each entry is a one-shot continuation. Whatever settles it first (response,
// rejection, expiry) removes it; anything arriving later for the same id is a
// silent no-op.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use chrono::Utc;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

use giggle_core::{BridgeError, CallbackId, IdStrategy, ResponseEnvelope, ResponsePayload, Result};

type Continuation = oneshot::Sender<Result<Value>>;

#[derive(Default)]
struct RegisterState {
    pending: HashMap<CallbackId, Continuation>,
    seq: u64,
}

#[cfg(test)]
type MintHook = Box<dyn Fn(u64) -> CallbackId + Send + Sync>;

/// Table of in-flight native calls.
pub struct CallbackRegister {
    state: Mutex<RegisterState>,
    strategy: IdStrategy,
    #[cfg(test)]
    mint_hook: Option<MintHook>,
}

/// Caller side of a pending call. Resolves once the register settles the
/// entry, or with [`BridgeError::Cancelled`] if the register goes away first.
#[derive(Debug)]
pub struct PendingReply {
    callback_id: CallbackId,
    rx: oneshot::Receiver<Result<Value>>,
}

impl PendingReply {
    pub fn callback_id(&self) -> &CallbackId {
        &self.callback_id
    }
}

impl Future for PendingReply {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(BridgeError::Cancelled)))
    }
}

impl CallbackRegister {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            state: Mutex::new(RegisterState::default()),
            strategy,
            #[cfg(test)]
            mint_hook: None,
        }
    }

    /// Register a new pending call and return its id together with the
    /// future the caller awaits.
    pub fn issue(&self) -> (CallbackId, PendingReply) {
        let (tx, rx) = oneshot::channel();
        let mut state = self.lock();

        let callback_id = loop {
            state.seq = state.seq.wrapping_add(1);
            let candidate = self.mint(state.seq);
            if !state.pending.contains_key(&candidate) {
                break candidate;
            }
        };
        state.pending.insert(callback_id.clone(), tx);
        debug!(callback_id = %callback_id, pending = state.pending.len(), "callback issued");

        (callback_id.clone(), PendingReply { callback_id, rx })
    }

    /// Complete a pending call successfully. Returns `false` for unknown ids.
    pub fn resolve(&self, callback_id: &CallbackId, data: Value) -> bool {
        self.settle(callback_id, Ok(data))
    }

    /// Fail a pending call. Returns `false` for unknown ids.
    pub fn reject(&self, callback_id: &CallbackId, reason: BridgeError) -> bool {
        self.settle(callback_id, Err(reason))
    }

    /// Settle a pending call from a JSON-encoded `{error?, data?}` body.
    ///
    /// A body that does not parse rejects the call with
    /// [`BridgeError::ResponseParse`]; the entry is removed either way.
    pub fn resolve_encoded(&self, callback_id: &CallbackId, body: &str) -> bool {
        let Some(tx) = self.take(callback_id) else {
            debug!(callback_id = %callback_id, "response for unknown callback dropped");
            return false;
        };

        let outcome = ResponsePayload::parse(body).and_then(ResponsePayload::into_outcome);
        if let Err(BridgeError::ResponseParse(reason)) = &outcome {
            warn!(callback_id = %callback_id, %reason, body, "unparseable native response");
        }
        deliver(callback_id, tx, outcome);
        true
    }

    /// Settle a pending call from a structured response envelope.
    pub fn resolve_envelope(&self, envelope: ResponseEnvelope) -> bool {
        let (callback_id, outcome) = envelope.into_parts();
        self.settle(&callback_id, outcome)
    }

    /// Drop a pending entry whose caller gave up waiting. A response that
    /// arrives afterwards is ignored like any other unknown id.
    pub fn expire(&self, callback_id: &CallbackId) -> bool {
        let removed = self.take(callback_id).is_some();
        if removed {
            debug!(callback_id = %callback_id, "pending callback expired");
        }
        removed
    }

    pub fn is_pending(&self, callback_id: &CallbackId) -> bool {
        self.lock().pending.contains_key(callback_id)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    fn settle(&self, callback_id: &CallbackId, outcome: Result<Value>) -> bool {
        match self.take(callback_id) {
            Some(tx) => {
                deliver(callback_id, tx, outcome);
                true
            }
            None => {
                debug!(callback_id = %callback_id, "response for unknown callback dropped");
                false
            }
        }
    }

    fn take(&self, callback_id: &CallbackId) -> Option<Continuation> {
        self.lock().pending.remove(callback_id)
    }

    fn mint(&self, seq: u64) -> CallbackId {
        #[cfg(test)]
        if let Some(hook) = &self.mint_hook {
            return hook(seq);
        }
        match self.strategy {
            IdStrategy::Sequential => CallbackId::new(format!("cb_{seq}")),
            IdStrategy::Timestamped => {
                let salt = Uuid::new_v4().simple().to_string();
                CallbackId::new(format!(
                    "cb_{}_{}_{}",
                    Utc::now().timestamp_millis(),
                    seq,
                    &salt[..5]
                ))
            }
        }
    }

    // The map is only touched inside these short critical sections, so a
    // poisoned lock still holds a consistent table.
    fn lock(&self) -> MutexGuard<'_, RegisterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CallbackRegister {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

fn deliver(callback_id: &CallbackId, tx: Continuation, outcome: Result<Value>) {
    if tx.send(outcome).is_err() {
        debug!(callback_id = %callback_id, "caller stopped waiting before the response arrived");
    }
}
