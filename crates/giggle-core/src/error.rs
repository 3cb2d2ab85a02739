// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the Giggle bridge.
//
// Every failure of an outgoing native call surfaces as one of these variants
// on the caller's future. Nothing is retried.

use thiserror::Error;

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Outgoing calls --
    #[error("native bridge not available")]
    TransportUnavailable,

    #[error("delivery through {transport} failed: {reason}")]
    Delivery { transport: String, reason: String },

    /// The native host answered with a truthy `error` field. The payload is
    /// passed through untouched.
    #[error("native host reported an error: {0}")]
    Native(serde_json::Value),

    #[error("failed to parse native response: {0}")]
    ResponseParse(String),

    #[error("no response for {callback_id} after {after_ms}ms")]
    Timeout { callback_id: String, after_ms: u64 },

    #[error("call cancelled before the native host responded")]
    Cancelled,

    // -- Unsolicited native calls --
    #[error("no handler registered for native method `{0}`")]
    UnknownNativeMethod(String),

    #[error("invalid handler name `{0}`")]
    InvalidHandlerName(String),

    #[error("a handler is already registered for `{0}`")]
    DuplicateHandler(String),

    /// A page-installed handler threw.
    #[error("handler for `{method}` failed: {reason}")]
    HandlerFailed { method: String, reason: String },

    // -- Local --
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse grouping of [`BridgeError`] for callers that only care about where
/// a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The native host could not be reached at all.
    Unreachable,
    /// The native host was reached and said no.
    Rejected,
    /// The exchange broke down: unparseable response, timeout, dropped register.
    Protocol,
    /// Misuse on the web side (registration, config, encoding).
    Local,
}

impl BridgeError {
    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            BridgeError::TransportUnavailable | BridgeError::Delivery { .. } => {
                ErrorClass::Unreachable
            }
            BridgeError::Native(_) | BridgeError::UnknownNativeMethod(_) => ErrorClass::Rejected,
            BridgeError::ResponseParse(_) | BridgeError::Timeout { .. } | BridgeError::Cancelled => {
                ErrorClass::Protocol
            }
            BridgeError::InvalidHandlerName(_)
            | BridgeError::DuplicateHandler(_)
            | BridgeError::HandlerFailed { .. }
            | BridgeError::Serialization(_)
            | BridgeError::Config(_) => ErrorClass::Local,
        }
    }

    /// Build a delivery error tagged with the transport that failed.
    pub fn delivery(transport: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        BridgeError::Delivery {
            transport: transport.into(),
            reason: reason.to_string(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unavailable_message_matches_host_contract() {
        assert_eq!(
            BridgeError::TransportUnavailable.to_string(),
            "native bridge not available"
        );
    }

    #[test]
    fn native_error_keeps_payload() {
        let err = BridgeError::Native(json!({"code": 403, "msg": "forbidden"}));
        match &err {
            BridgeError::Native(v) => assert_eq!(v["code"], 403),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(err.class(), ErrorClass::Rejected);
    }

    #[test]
    fn classes_split_reachability_from_refusal() {
        assert_eq!(BridgeError::TransportUnavailable.class(), ErrorClass::Unreachable);
        assert_eq!(
            BridgeError::delivery("android", "boom").class(),
            ErrorClass::Unreachable
        );
        assert_eq!(BridgeError::ResponseParse("eof".into()).class(), ErrorClass::Protocol);
        assert_eq!(
            BridgeError::DuplicateHandler("onShow".into()).class(),
            ErrorClass::Local
        );
        assert_eq!(
            BridgeError::HandlerFailed {
                method: "onShow".into(),
                reason: "TypeError".into(),
            }
            .class(),
            ErrorClass::Local
        );
    }

    #[test]
    fn delivery_formats_transport_and_reason() {
        let err = BridgeError::delivery("webkit:giggleBridge", "TypeError: not a function");
        assert_eq!(
            err.to_string(),
            "delivery through webkit:giggleBridge failed: TypeError: not a function"
        );
    }
}
