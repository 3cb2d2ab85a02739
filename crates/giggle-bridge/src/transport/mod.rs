// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host channel abstraction.
//
// The native host exposes exactly one of a few channel shapes. Each shape is a
// `NativeTransport`; the `TransportSelector` picks among them per call.

pub mod channel;
pub mod selector;

#[cfg(target_arch = "wasm32")]
pub mod web;

use giggle_core::{CallEnvelope, Result, TransportKind};

/// One outgoing host channel.
pub trait NativeTransport: Send + Sync {
    /// Which channel family this is. Decides selection priority.
    fn kind(&self) -> TransportKind;

    /// Name used in logs and delivery errors.
    fn label(&self) -> String {
        self.kind().to_string()
    }

    /// Whether the host currently exposes this channel. Checked on every
    /// call; hosts and test harnesses may swap handlers between calls.
    fn is_available(&self) -> bool;

    /// Hand one envelope to the host. Errors become the call's rejection.
    fn deliver(&self, envelope: &CallEnvelope) -> Result<()>;
}
