// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Webview host channels, reached through `js-sys` reflection on the global
// object.
//
// Neither transport caches the handler it finds: the host may inject or
// replace `window.webkit.messageHandlers.*` / `window.<interface>` at any
// time, so every availability check and delivery walks the global again.
// The structs only hold names, which keeps them `Send + Sync`.

#![cfg(target_arch = "wasm32")]

use js_sys::{Function, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

use giggle_core::{BridgeError, CallEnvelope, EnvelopeEncoding, Result, TransportKind};

use super::NativeTransport;

/// Walk `globalThis.<path[0]>.<path[1]>...`, treating `undefined`/`null` as
/// absent.
fn lookup(path: &[&str]) -> Option<JsValue> {
    let mut current: JsValue = js_sys::global().into();
    for key in path {
        let next = Reflect::get(&current, &JsValue::from_str(key)).ok()?;
        if next.is_undefined() || next.is_null() {
            return None;
        }
        current = next;
    }
    Some(current)
}

fn post_message_fn(target: &JsValue) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str("postMessage"))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn js_error_text(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    match err.dyn_ref::<js_sys::Error>() {
        Some(e) => String::from(e.message()),
        None => format!("{err:?}"),
    }
}

fn post(label: &str, target: &JsValue, payload: &JsValue) -> Result<()> {
    let post = post_message_fn(target)
        .ok_or_else(|| BridgeError::delivery(label, "postMessage is not a function"))?;
    post.call1(target, payload)
        .map(|_| ())
        .map_err(|e| BridgeError::delivery(label, js_error_text(&e)))
}

/// iOS `WKScriptMessageHandler` registered under
/// `window.webkit.messageHandlers.<handler>`.
pub struct WebKitHandlerTransport {
    handler: String,
    encoding: EnvelopeEncoding,
}

impl WebKitHandlerTransport {
    pub fn new(handler: impl Into<String>, encoding: EnvelopeEncoding) -> Self {
        Self {
            handler: handler.into(),
            encoding,
        }
    }

    fn handler_object(&self) -> Option<JsValue> {
        lookup(&["webkit", "messageHandlers", self.handler.as_str()])
    }
}

impl NativeTransport for WebKitHandlerTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::WebKit
    }

    fn label(&self) -> String {
        format!("webkit:{}", self.handler)
    }

    fn is_available(&self) -> bool {
        self.handler_object().is_some()
    }

    fn deliver(&self, envelope: &CallEnvelope) -> Result<()> {
        let label = self.label();
        let handler = self
            .handler_object()
            .ok_or(BridgeError::TransportUnavailable)?;

        let payload = match self.encoding {
            EnvelopeEncoding::Json => JsValue::from_str(&envelope.to_json()?),
            EnvelopeEncoding::Object => envelope
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(|e| BridgeError::delivery(&label, e))?,
        };
        post(&label, &handler, &payload)
    }
}

/// Android `@JavascriptInterface` object injected as `window.<name>`.
/// Only strings cross that boundary, so envelopes are always JSON.
pub struct AndroidInterfaceTransport {
    name: String,
}

impl AndroidInterfaceTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn interface_object(&self) -> Option<JsValue> {
        lookup(&[self.name.as_str()])
    }
}

impl NativeTransport for AndroidInterfaceTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::AndroidInterface
    }

    fn label(&self) -> String {
        format!("android:{}", self.name)
    }

    fn is_available(&self) -> bool {
        self.interface_object()
            .as_ref()
            .and_then(post_message_fn)
            .is_some()
    }

    fn deliver(&self, envelope: &CallEnvelope) -> Result<()> {
        let label = self.label();
        let interface = self
            .interface_object()
            .ok_or(BridgeError::TransportUnavailable)?;
        let payload = JsValue::from_str(&envelope.to_json()?);
        post(&label, &interface, &payload)
    }
}
