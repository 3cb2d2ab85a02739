// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handlers for calls the native host initiates (e.g. "page became visible").

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use giggle_core::{BridgeError, Result};

type Handler = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Method-name → handler table for unsolicited native calls.
#[derive(Default)]
pub struct NativeCallRegistry {
    handlers: Mutex<HashMap<String, Handler>>,
}

impl NativeCallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `method`. Names must be non-empty with no
    /// surrounding whitespace, and may only be registered once.
    pub fn register<F>(&self, method: &str, handler: F) -> Result<()>
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        validate_name(method)?;
        let mut handlers = self.lock();
        if handlers.contains_key(method) {
            return Err(BridgeError::DuplicateHandler(method.to_owned()));
        }
        handlers.insert(method.to_owned(), Arc::new(handler));
        debug!(method, "native call handler registered");
        Ok(())
    }

    /// Install or overwrite the handler for `method`. Returns whether one was
    /// already present.
    pub fn replace<F>(&self, method: &str, handler: F) -> Result<bool>
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        validate_name(method)?;
        let previous = self.lock().insert(method.to_owned(), Arc::new(handler));
        Ok(previous.is_some())
    }

    pub fn unregister(&self, method: &str) -> bool {
        self.lock().remove(method).is_some()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.lock().contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Invoke the handler for `method`.
    ///
    /// The lock is released before the handler runs, so handlers may register
    /// or remove other handlers.
    pub fn dispatch(&self, method: &str, data: Value) -> Result<Value> {
        let handler = self.lock().get(method).cloned();
        match handler {
            Some(handler) => {
                debug!(method, "dispatching native call");
                Ok(handler(data))
            }
            None => {
                warn!(method, "native call for unregistered method");
                Err(BridgeError::UnknownNativeMethod(method.to_owned()))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Handler>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handler names must be non-empty with no surrounding whitespace.
pub fn validate_name(method: &str) -> Result<()> {
    if method.is_empty() || method.trim() != method {
        return Err(BridgeError::InvalidHandlerName(method.to_owned()));
    }
    Ok(())
}
