// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire types exchanged with the native host.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, Result};

/// Plugin names understood by the native host.
pub mod plugin {
    pub const ROUTER: &str = "Router";
    pub const PREFERENCE: &str = "Preference";
}

/// Method names understood by the native host.
pub mod method {
    pub const ROUTE: &str = "route";
    pub const DISMISS: &str = "dismiss";
    pub const DISMISS_LOADING: &str = "dismissLoading";
    pub const READ_VALUES: &str = "readValues";
}

/// Opaque token correlating an outgoing call with its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(String);

impl CallbackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallbackId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for CallbackId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Outgoing call, sent once across the transport boundary.
///
/// Fields are private so an envelope cannot change after its callback id has
/// been registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEnvelope {
    plugin: String,
    method: String,
    #[serde(default = "empty_params")]
    params: Value,
    callback_id: CallbackId,
}

fn empty_params() -> Value {
    Value::Object(serde_json::Map::new())
}

impl CallEnvelope {
    /// Build an envelope. A `null` params value is sent as `{}`.
    pub fn new(
        plugin: impl Into<String>,
        method: impl Into<String>,
        params: Value,
        callback_id: CallbackId,
    ) -> Self {
        let params = if params.is_null() { empty_params() } else { params };
        Self {
            plugin: plugin.into(),
            method: method.into(),
            params,
            callback_id,
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    pub fn callback_id(&self) -> &CallbackId {
        &self.callback_id
    }

    /// JSON string form, as posted to string-based host channels.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode an envelope the way the native side would.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Response delivered as a structured object that carries its own callback id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub callback_id: CallbackId,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResponseEnvelope {
    pub fn success(callback_id: CallbackId, data: Value) -> Self {
        Self {
            callback_id,
            data,
            error: None,
        }
    }

    pub fn failure(callback_id: CallbackId, error: Value) -> Self {
        Self {
            callback_id,
            data: Value::Null,
            error: Some(error),
        }
    }

    /// Read an envelope off a decoded object.
    ///
    /// Only `callbackId` is required, and it must be a string. `data` and
    /// `error` are optional.
    pub fn from_value(value: &Value) -> Result<Self> {
        let callback_id = value
            .get("callbackId")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::ResponseParse("missing string `callbackId`".into()))?;
        Ok(Self {
            callback_id: CallbackId::from(callback_id),
            data: field(value, "data"),
            error: value.get("error").cloned(),
        })
    }

    /// Split into the callback id and the outcome it carries.
    pub fn into_parts(self) -> (CallbackId, Result<Value>) {
        let outcome = outcome(self.data, self.error);
        (self.callback_id, outcome)
    }
}

/// String-variant response body. The callback id is supplied separately by
/// the host's dispatch call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResponsePayload {
    /// Parse a JSON-encoded `{error?, data?}` body.
    ///
    /// Only text that is not JSON at all is a parse error. Any other JSON
    /// value is read field by field, so arrays and scalars carry neither an
    /// error nor data.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| BridgeError::ResponseParse(e.to_string()))?;
        Ok(Self::from_value(&value))
    }

    /// Read `error` and `data` off an already-decoded body.
    pub fn from_value(value: &Value) -> Self {
        Self {
            data: field(value, "data"),
            error: value.get("error").cloned(),
        }
    }

    pub fn into_outcome(self) -> Result<Value> {
        outcome(self.data, self.error)
    }
}

/// `value.key` with JavaScript's reading of missing keys and non-objects.
fn field(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

fn outcome(data: Value, error: Option<Value>) -> Result<Value> {
    match error {
        Some(err) if is_truthy(&err) => Err(BridgeError::Native(err)),
        _ => Ok(data),
    }
}

/// JavaScript truthiness. The host side sends `error: null`, `""` or `false`
/// on success paths, so only a truthy value counts as a failure.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The host channel families a webview can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// `window.webkit.messageHandlers.<name>.postMessage` (iOS WKWebView).
    WebKit,
    /// `window.<name>.postMessage` injected via `addJavascriptInterface` (Android).
    AndroidInterface,
}

impl TransportKind {
    /// Platform label reported in Platform Info.
    pub fn platform_name(&self) -> &'static str {
        match self {
            TransportKind::WebKit => "ios",
            TransportKind::AndroidInterface => "android",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::WebKit => f.write_str("webkit"),
            TransportKind::AndroidInterface => f.write_str("android"),
        }
    }
}

/// How an envelope is handed to a host channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeEncoding {
    /// JSON string.
    #[default]
    Json,
    /// Structured object (WebKit handlers accept plain objects).
    Object,
}
