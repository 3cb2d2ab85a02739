// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::types::EnvelopeEncoding;

/// Environment variable selecting the build profile.
pub const ENV_PROFILE: &str = "GIGGLE_BRIDGE_ENV";
/// Environment variable setting the per-call timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "GIGGLE_BRIDGE_TIMEOUT_MS";

/// Which account/server defaults the Platform Info record starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    #[default]
    Production,
    Development,
    Test,
}

impl BuildProfile {
    /// Parse a profile name (`production`/`prod`, `development`/`dev`, `test`).
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            other => Err(BridgeError::Config(format!("unknown build profile `{other}`"))),
        }
    }
}

/// How callback identifiers are minted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `cb_<unix-millis>_<seq>_<salt>`.
    #[default]
    Timestamped,
    /// `cb_1`, `cb_2`, ... Handy for deterministic host harnesses.
    Sequential,
}

/// Bridge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Selects Platform Info defaults.
    pub profile: BuildProfile,
    /// Upper bound on how long a call waits for its response. `None` waits
    /// forever, which is what the native hosts currently expect.
    pub call_timeout_ms: Option<u64>,
    /// Callback id format.
    pub callback_ids: IdStrategy,
    /// Name under `window.webkit.messageHandlers`.
    pub webkit_handler: String,
    /// Name of the Android JavaScript interface on `window`.
    pub android_interface: String,
    /// Whether WebKit handlers receive a JSON string or a plain object.
    pub webkit_encoding: EnvelopeEncoding,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            profile: BuildProfile::Production,
            call_timeout_ms: None,
            callback_ids: IdStrategy::Timestamped,
            webkit_handler: "giggleBridge".into(),
            android_interface: "giggleBridge".into(),
            webkit_encoding: EnvelopeEncoding::Json,
        }
    }
}

impl BridgeConfig {
    /// Defaults overridden by `GIGGLE_BRIDGE_ENV` / `GIGGLE_BRIDGE_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(profile) = lookup(ENV_PROFILE) {
            config.profile = BuildProfile::parse(&profile)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|e| {
                BridgeError::Config(format!("{ENV_TIMEOUT_MS}=`{raw}` is not a number: {e}"))
            })?;
            config.call_timeout_ms = Some(ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration document; missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| BridgeError::Config(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.call_timeout_ms == Some(0) {
            return Err(BridgeError::Config(
                "call_timeout_ms must be positive; omit it to wait indefinitely".into(),
            ));
        }
        if self.webkit_handler.trim().is_empty() {
            return Err(BridgeError::Config("webkit_handler is empty".into()));
        }
        if self.android_interface.trim().is_empty() {
            return Err(BridgeError::Config("android_interface is empty".into()));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_wait_forever() {
        let config = BridgeConfig::default();
        assert_eq!(config.call_timeout(), None);
        assert_eq!(config.profile, BuildProfile::Production);
        assert_eq!(config.webkit_handler, "giggleBridge");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_profile_and_timeout() {
        let config =
            BridgeConfig::from_lookup(lookup(&[(ENV_PROFILE, "dev"), (ENV_TIMEOUT_MS, "1500")]))
                .unwrap();
        assert_eq!(config.profile, BuildProfile::Development);
        assert_eq!(config.call_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn bad_env_values_are_config_errors() {
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[(ENV_PROFILE, "staging")])),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "soon")])),
            Err(BridgeError::Config(_))
        ));
        assert!(matches!(
            BridgeConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "0")])),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn json_fills_missing_fields() {
        let config =
            BridgeConfig::from_json(r#"{"profile": "test", "webkit_encoding": "object"}"#).unwrap();
        assert_eq!(config.profile, BuildProfile::Test);
        assert_eq!(config.webkit_encoding, EnvelopeEncoding::Object);
        assert_eq!(config.android_interface, "giggleBridge");
        assert_eq!(config.callback_ids, IdStrategy::Timestamped);
    }

    #[test]
    fn empty_handler_name_rejected() {
        assert!(BridgeConfig::from_json(r#"{"webkit_handler": "  "}"#).is_err());
    }
}
