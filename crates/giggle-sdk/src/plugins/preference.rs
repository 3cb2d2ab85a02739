// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preference plugin: key/value reads from the host's preference store.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, warn};

use giggle_bridge::NativeBridge;
use giggle_core::{Result, method, plugin};

/// A partial Platform Info update as sent by the host.
pub type Patch = Map<String, Value>;

#[derive(Clone)]
pub struct PreferencePlugin {
    native: Arc<NativeBridge>,
}

impl PreferencePlugin {
    pub fn new(native: Arc<NativeBridge>) -> Self {
        Self { native }
    }

    /// Read preference values. `None` leaves the `keys` param out entirely,
    /// which hosts treat as "everything".
    ///
    /// Some hosts answer with a JSON string rather than an object; it is
    /// decoded here. An undecodable or non-object answer yields an empty
    /// patch.
    pub async fn read_values(&self, keys: Option<&[String]>) -> Result<Patch> {
        let mut params = Map::new();
        if let Some(keys) = keys {
            params.insert("keys".into(), Value::from(keys.to_vec()));
        }

        let data = self
            .native
            .call_native(plugin::PREFERENCE, method::READ_VALUES, Value::Object(params))
            .await
            .inspect_err(|e| error!(error = %e, "failed to read platform values"))?;

        Ok(into_patch(data))
    }
}

fn into_patch(data: Value) -> Patch {
    match data {
        Value::Object(map) => map,
        Value::Null => Patch::new(),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => map,
            Ok(Value::Null) => Patch::new(),
            Ok(other) => {
                warn!(kind = value_kind(&other), "preference string is not an object");
                Patch::new()
            }
            Err(e) => {
                warn!(error = %e, "failed to parse preference string response");
                Patch::new()
            }
        },
        other => {
            warn!(kind = value_kind(&other), "unexpected preference response");
            Patch::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_passes_through() {
        let patch = into_patch(json!({"userId": "1", "language": "fr"}));
        assert_eq!(patch.len(), 2);
        assert_eq!(patch["language"], json!("fr"));
    }

    #[test]
    fn null_is_empty() {
        assert!(into_patch(Value::Null).is_empty());
    }

    #[test]
    fn json_string_is_decoded() {
        let patch = into_patch(json!(r#"{"kidName": "Ada"}"#));
        assert_eq!(patch["kidName"], json!("Ada"));
    }

    #[test]
    fn bad_strings_fall_back_to_empty() {
        assert!(into_patch(json!("{not json")).is_empty());
        assert!(into_patch(json!("null")).is_empty());
        assert!(into_patch(json!("[1, 2]")).is_empty());
    }

    #[test]
    fn scalars_fall_back_to_empty() {
        assert!(into_patch(json!(7)).is_empty());
        assert!(into_patch(json!(["userId"])).is_empty());
    }
}
