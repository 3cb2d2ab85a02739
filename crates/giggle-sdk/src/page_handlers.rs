// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handlers installed by page code for host-initiated calls.
//
// Page handlers (JS functions in a webview) are neither `Send` nor `Sync`, so
// they cannot live in `NativeCallRegistry`. They sit in this single-threaded
// table in front of it instead. One method name belongs to at most one of
// the two tables.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use giggle_bridge::NativeCallRegistry;
use giggle_bridge::handlers::validate_name;
use giggle_core::{BridgeError, Result};

pub struct PageHandlers<F> {
    handlers: RefCell<HashMap<String, F>>,
}

impl<F> Default for PageHandlers<F> {
    fn default() -> Self {
        Self {
            handlers: RefCell::new(HashMap::new()),
        }
    }
}

impl<F: Clone> PageHandlers<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler` for `method`. Fails if the name is invalid or
    /// already taken here or in `registry`.
    pub fn register(&self, registry: &NativeCallRegistry, method: &str, handler: F) -> Result<()> {
        validate_name(method)?;
        let mut handlers = self.handlers.borrow_mut();
        if handlers.contains_key(method) || registry.contains(method) {
            return Err(BridgeError::DuplicateHandler(method.to_owned()));
        }
        handlers.insert(method.to_owned(), handler);
        debug!(method, "page handler registered");
        Ok(())
    }

    pub fn unregister(&self, method: &str) -> bool {
        self.handlers.borrow_mut().remove(method).is_some()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.borrow().contains_key(method)
    }

    /// Route a host-initiated call: page handler first, then `registry`.
    ///
    /// `invoke` runs the page handler. The table is not borrowed while it
    /// runs, so handlers may register or remove others.
    pub fn dispatch(
        &self,
        registry: &NativeCallRegistry,
        method: &str,
        data: Value,
        invoke: impl FnOnce(&F, Value) -> Result<Value>,
    ) -> Result<Value> {
        let handler = self.handlers.borrow().get(method).cloned();
        match handler {
            Some(handler) => {
                debug!(method, "dispatching to page handler");
                invoke(&handler, data)
            }
            None => registry.dispatch(method, data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::rc::Rc;

    type Handler = Rc<dyn Fn(Value) -> Value>;

    fn call(handler: &Handler, data: Value) -> Result<Value> {
        Ok(handler(data))
    }

    #[test]
    fn page_handler_answers_host_call() {
        let registry = NativeCallRegistry::new();
        let page = PageHandlers::<Handler>::new();
        page.register(&registry, "onShow", Rc::new(|d: Value| json!({ "page": d })))
            .unwrap();

        let out = page.dispatch(&registry, "onShow", json!(5), call).unwrap();
        assert_eq!(out, json!({"page": 5}));
    }

    #[test]
    fn falls_through_to_registry() {
        let registry = NativeCallRegistry::new();
        registry.register("onHide", |_| json!("rust")).unwrap();
        let page = PageHandlers::<Handler>::new();

        assert_eq!(
            page.dispatch(&registry, "onHide", Value::Null, call).unwrap(),
            json!("rust")
        );
        assert!(matches!(
            page.dispatch(&registry, "onPause", Value::Null, call),
            Err(BridgeError::UnknownNativeMethod(_))
        ));
    }

    #[test]
    fn names_are_unique_across_both_tables() {
        let registry = NativeCallRegistry::new();
        registry.register("onHide", |v| v).unwrap();
        let page = PageHandlers::<Handler>::new();

        assert!(matches!(
            page.register(&registry, "onHide", Rc::new(|v: Value| v)),
            Err(BridgeError::DuplicateHandler(_))
        ));
        page.register(&registry, "onShow", Rc::new(|v: Value| v)).unwrap();
        assert!(matches!(
            page.register(&registry, "onShow", Rc::new(|v: Value| v)),
            Err(BridgeError::DuplicateHandler(_))
        ));
        assert!(matches!(
            page.register(&registry, " onShow", Rc::new(|v: Value| v)),
            Err(BridgeError::InvalidHandlerName(_))
        ));
    }

    #[test]
    fn unregister_restores_unknown_method() {
        let registry = NativeCallRegistry::new();
        let page = PageHandlers::<Handler>::new();
        page.register(&registry, "onShow", Rc::new(|v: Value| v)).unwrap();

        assert!(page.unregister("onShow"));
        assert!(!page.contains("onShow"));
        assert!(matches!(
            page.dispatch(&registry, "onShow", Value::Null, call),
            Err(BridgeError::UnknownNativeMethod(_))
        ));
    }

    #[test]
    fn handler_failure_is_reported() {
        let registry = NativeCallRegistry::new();
        let page = PageHandlers::<Handler>::new();
        page.register(&registry, "onShow", Rc::new(|v: Value| v)).unwrap();

        let err = page
            .dispatch(&registry, "onShow", Value::Null, |_, _| {
                Err(BridgeError::HandlerFailed {
                    method: "onShow".into(),
                    reason: "TypeError: x is undefined".into(),
                })
            })
            .unwrap_err();
        assert!(err.to_string().contains("TypeError"));
    }

    #[test]
    fn handler_may_unregister_itself() {
        let registry = NativeCallRegistry::new();
        let page = Rc::new(PageHandlers::<Handler>::new());
        page.register(&registry, "once", Rc::new(|v: Value| v)).unwrap();

        let inner = Rc::clone(&page);
        page.dispatch(&registry, "once", Value::Null, |_, data| {
            inner.unregister("once");
            Ok(data)
        })
        .unwrap();
        assert!(!page.contains("once"));
    }
}
