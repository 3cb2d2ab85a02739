// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JavaScript surface for webview builds.
//
// One `GiggleBridge` per page. Promises reject with a JS `Error` whose
// `kind` property is the error class; native-side errors also carry the
// host's payload under `native`.

#![cfg(target_arch = "wasm32")]

use std::sync::Arc;

use js_sys::{Function, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use giggle_bridge::host_transports;
use giggle_core::{BridgeConfig, BridgeError, ErrorClass, ResponseEnvelope};

use crate::bridge::Bridge;
use crate::page_handlers::PageHandlers;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

fn from_js(value: JsValue) -> Result<Value, JsValue> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| js_sys::Error::new(&e.to_string()).into())
}

fn bridge_error(err: BridgeError) -> JsValue {
    let js_err = js_sys::Error::new(&err.to_string());
    let kind = match err.class() {
        ErrorClass::Unreachable => "unreachable",
        ErrorClass::Rejected => "rejected",
        ErrorClass::Protocol => "protocol",
        ErrorClass::Local => "local",
    };
    let _ = Reflect::set(&js_err, &"kind".into(), &kind.into());
    if let BridgeError::Native(payload) = &err {
        if let Ok(payload) = to_js(payload) {
            let _ = Reflect::set(&js_err, &"native".into(), &payload);
        }
    }
    js_err.into()
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

fn call_page_handler(method: &str, handler: &Function, data: Value) -> giggle_core::Result<Value> {
    let failed = |reason: String| BridgeError::HandlerFailed {
        method: method.to_owned(),
        reason,
    };
    let arg = to_js(&data).map_err(|e| failed(js_error_text(&e)))?;
    let out = handler
        .call1(&JsValue::NULL, &arg)
        .map_err(|e| failed(js_error_text(&e)))?;
    from_js(out).map_err(|e| failed(js_error_text(&e)))
}

#[wasm_bindgen]
pub struct GiggleBridge {
    inner: Arc<Bridge>,
    page_handlers: PageHandlers<Function>,
}

impl GiggleBridge {
    /// The Rust facade behind this export, e.g. for registering
    /// `Send + Sync` handlers through `bridge().native().handlers()`.
    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.inner
    }
}

#[wasm_bindgen]
impl GiggleBridge {
    /// `config` is an optional `BridgeConfig` object; omitted fields take
    /// their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<GiggleBridge, JsValue> {
        crate::telemetry::init_logging("info");

        let config: BridgeConfig = if config.is_undefined() || config.is_null() {
            BridgeConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| bridge_error(BridgeError::Config(e.to_string())))?
        };
        config.validate().map_err(bridge_error)?;

        Ok(Self {
            inner: Arc::new(Bridge::new(&config, host_transports(&config))),
            page_handlers: PageHandlers::new(),
        })
    }

    #[wasm_bindgen(js_name = "callNative")]
    pub fn call_native(&self, plugin: String, method: String, params: JsValue) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move {
            let params = from_js(params)?;
            let data = bridge
                .call_native(&plugin, &method, params)
                .await
                .map_err(bridge_error)?;
            to_js(&data)
        })
    }

    #[wasm_bindgen(js_name = "inviteFriends")]
    pub fn invite_friends(&self) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move { unit(bridge.invite_friends().await) })
    }

    #[wasm_bindgen(js_name = "playGame")]
    pub fn play_game(&self) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move { unit(bridge.play_game().await) })
    }

    #[wasm_bindgen(js_name = "finishChallenge")]
    pub fn finish_challenge(&self) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move { unit(bridge.finish_challenge().await) })
    }

    #[wasm_bindgen(js_name = "flashcardLearning")]
    pub fn flashcard_learning(&self) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move { unit(bridge.flashcard_learning().await) })
    }

    pub fn dismiss(&self) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move { unit(bridge.dismiss().await) })
    }

    #[wasm_bindgen(js_name = "dismissLoading")]
    pub fn dismiss_loading(&self) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move { unit(bridge.dismiss_loading().await) })
    }

    /// `keys` is an optional array of strings.
    #[wasm_bindgen(js_name = "readValues")]
    pub fn read_values(&self, keys: JsValue) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move {
            let keys: Option<Vec<String>> = if keys.is_undefined() || keys.is_null() {
                None
            } else {
                Some(
                    serde_wasm_bindgen::from_value(keys)
                        .map_err(|e| js_sys::Error::new(&e.to_string()))?,
                )
            };
            let patch = bridge
                .read_values(keys.as_deref())
                .await
                .map_err(bridge_error)?;
            to_js(&patch)
        })
    }

    #[wasm_bindgen(js_name = "requestPlatformInfo")]
    pub fn request_platform_info(&self) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move {
            let info = bridge.request_platform_info().await.map_err(bridge_error)?;
            to_js(&info)
        })
    }

    #[wasm_bindgen(js_name = "forceRefreshPlatformInfo")]
    pub fn force_refresh_platform_info(&self) -> Promise {
        let bridge = Arc::clone(&self.inner);
        future_to_promise(async move {
            let info = bridge
                .force_refresh_platform_info()
                .await
                .map_err(bridge_error)?;
            to_js(&info)
        })
    }

    #[wasm_bindgen(getter, js_name = "platformInfo")]
    pub fn platform_info(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.platform_info())
    }

    #[wasm_bindgen(getter, js_name = "isPlatformInited")]
    pub fn is_platform_inited(&self) -> bool {
        self.inner.is_platform_inited()
    }

    #[wasm_bindgen(getter, js_name = "pointsDescDoneBtn")]
    pub fn points_desc_done_btn(&self) -> String {
        self.inner.points_desc_done_btn()
    }

    /// String-variant response from the host. Returns whether a pending call
    /// matched.
    #[wasm_bindgen(js_name = "handleCallback")]
    pub fn handle_callback(&self, callback_id: String, response: String) -> bool {
        self.inner.native().handle_callback(&callback_id, &response)
    }

    /// Object-variant response `{callbackId, data?, error?}`.
    #[wasm_bindgen(js_name = "handleResponse")]
    pub fn handle_response(&self, response: JsValue) -> bool {
        let envelope = from_js(response)
            .map_err(|e| BridgeError::ResponseParse(js_error_text(&e)))
            .and_then(|value| ResponseEnvelope::from_value(&value));
        match envelope {
            Ok(envelope) => self.inner.native().handle_response(envelope),
            Err(e) => {
                warn!(error = %e, "malformed response envelope");
                false
            }
        }
    }

    /// Install a page function answering host-initiated `method` calls. It
    /// receives the call's data and its return value is sent back.
    #[wasm_bindgen(js_name = "registerNativeHandler")]
    pub fn register_native_handler(&self, method: String, handler: Function) -> Result<(), JsValue> {
        self.page_handlers
            .register(self.inner.native().handlers(), &method, handler)
            .map_err(bridge_error)
    }

    /// Remove a page function. Returns whether one was installed.
    #[wasm_bindgen(js_name = "unregisterNativeHandler")]
    pub fn unregister_native_handler(&self, method: String) -> bool {
        self.page_handlers.unregister(&method)
    }

    /// Host-initiated call. Page functions are tried before Rust handlers;
    /// throws when neither has `method`.
    #[wasm_bindgen(js_name = "receiveNativeCall")]
    pub fn receive_native_call(&self, method: String, data: JsValue) -> Result<JsValue, JsValue> {
        let data = from_js(data)?;
        let out = self
            .page_handlers
            .dispatch(self.inner.native().handlers(), &method, data, |handler, data| {
                call_page_handler(&method, handler, data)
            })
            .map_err(bridge_error)?;
        to_js(&out)
    }
}

fn unit(outcome: giggle_core::Result<()>) -> Result<JsValue, JsValue> {
    outcome.map(|()| JsValue::UNDEFINED).map_err(bridge_error)
}
