// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `Bridge`: the facade web content talks to.
//
// Wraps one `NativeBridge` with the Router and Preference plugins and keeps
// the Platform Info cache. The cache is only written after a successful
// fetch; a failed fetch leaves both the record and the initialised flag as
// they were.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info, warn};

use giggle_bridge::{NativeBridge, TransportSelector};
use giggle_core::{BridgeConfig, PlatformInfo, Result};

use crate::plugins::preference::Patch;
use crate::plugins::{PreferencePlugin, RouterPlugin};

/// Deep-link prefix for screens owned by the Unity layer.
pub const UNITY_ROUTE_PREFIX: &str = "giggleacademy://unity/";

struct PlatformState {
    info: PlatformInfo,
    inited: bool,
}

pub struct Bridge {
    native: Arc<NativeBridge>,
    router: RouterPlugin,
    preference: PreferencePlugin,
    platform: Mutex<PlatformState>,
}

impl Bridge {
    /// Build a facade over `transports`.
    ///
    /// Platform Info starts from the profile defaults. When a host channel
    /// is already present its platform name ("ios"/"android") replaces the
    /// "web" default.
    pub fn new(config: &BridgeConfig, transports: TransportSelector) -> Self {
        let native = Arc::new(NativeBridge::new(config, transports));

        let mut info = PlatformInfo::defaults_for(config.profile);
        if let Some(kind) = native.active_transport() {
            info.platform = kind.platform_name().to_owned();
        }
        debug!(profile = ?config.profile, platform = %info.platform, "bridge created");

        Self {
            router: RouterPlugin::new(Arc::clone(&native)),
            preference: PreferencePlugin::new(Arc::clone(&native)),
            native,
            platform: Mutex::new(PlatformState { info, inited: false }),
        }
    }

    /// Generic entry point; same contract as [`NativeBridge::call_native`].
    pub async fn call_native(&self, plugin: &str, method: &str, params: Value) -> Result<Value> {
        self.native.call_native(plugin, method, params).await
    }

    pub async fn invite_friends(&self) -> Result<()> {
        self.route_unity("inviteFriends").await
    }

    pub async fn play_game(&self) -> Result<()> {
        self.route_unity("playGame").await
    }

    pub async fn finish_challenge(&self) -> Result<()> {
        self.route_unity("finishChallenge").await
    }

    pub async fn flashcard_learning(&self) -> Result<()> {
        self.route_unity("flashcardLearning").await
    }

    pub async fn dismiss(&self) -> Result<()> {
        self.router.dismiss().await
    }

    pub async fn dismiss_loading(&self) -> Result<()> {
        self.router.dismiss_loading().await
    }

    /// Pass-through to the Preference plugin. Does not touch the cache.
    pub async fn read_values(&self, keys: Option<&[String]>) -> Result<Patch> {
        self.preference.read_values(keys).await
    }

    /// Cached Platform Info. Fetches from the host on first use only.
    pub async fn request_platform_info(&self) -> Result<PlatformInfo> {
        {
            let state = self.state();
            if state.inited {
                debug!("platform info already initialised, returning cache");
                return Ok(state.info.clone());
            }
        }
        self.fetch_platform_info().await
    }

    /// Fetch Platform Info from the host regardless of the cache.
    pub async fn force_refresh_platform_info(&self) -> Result<PlatformInfo> {
        info!("force refreshing platform info");
        self.fetch_platform_info().await
    }

    /// Current record, fetched or not.
    pub fn platform_info(&self) -> PlatformInfo {
        self.state().info.clone()
    }

    pub fn is_platform_inited(&self) -> bool {
        self.state().inited
    }

    /// Rectangle of the points-description "done" button, `"x,y,w,h"`.
    pub fn points_desc_done_btn(&self) -> String {
        self.state().info.points_desc_done_btn.clone()
    }

    /// Underlying bridge, for response delivery and native-call handlers.
    pub fn native(&self) -> &Arc<NativeBridge> {
        &self.native
    }

    async fn route_unity(&self, screen: &str) -> Result<()> {
        self.router
            .route(&format!("{UNITY_ROUTE_PREFIX}{screen}"))
            .await
    }

    async fn fetch_platform_info(&self) -> Result<PlatformInfo> {
        let patch = match self.preference.read_values(None).await {
            Ok(patch) => patch,
            Err(e) => {
                warn!(error = %e, "failed to request platform info");
                return Err(e);
            }
        };

        let mut state = self.state();
        let applied = state.info.merge(&patch);
        state.inited = true;
        info!(fields = applied, "platform info initialised");
        Ok(state.info.clone())
    }

    fn state(&self) -> MutexGuard<'_, PlatformState> {
        self.platform.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use giggle_bridge::ChannelTransport;
    use giggle_core::{BridgeError, BuildProfile, EnvelopeEncoding, IdStrategy, TransportKind};

    fn config(profile: BuildProfile) -> BridgeConfig {
        BridgeConfig {
            profile,
            callback_ids: IdStrategy::Sequential,
            ..BridgeConfig::default()
        }
    }

    #[test]
    fn defaults_follow_profile_and_transport() {
        let bridge = Bridge::new(&config(BuildProfile::Test), TransportSelector::new());
        let info = bridge.platform_info();
        assert_eq!(info.platform, "web");
        assert_eq!(info.user_id, "624100027826245");
        assert!(!bridge.is_platform_inited());
        assert_eq!(bridge.points_desc_done_btn(), "0,0,0,0");

        let (transport, _rx) =
            ChannelTransport::new(TransportKind::AndroidInterface, EnvelopeEncoding::Json);
        let bridge = Bridge::new(
            &config(BuildProfile::Production),
            TransportSelector::new().with(transport),
        );
        assert_eq!(bridge.platform_info().platform, "android");
        assert_eq!(bridge.platform_info().app_version, "1.16.0");
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cache_alone() {
        let bridge = Bridge::new(&config(BuildProfile::Development), TransportSelector::new());
        let before = bridge.platform_info();

        let err = bridge.request_platform_info().await.unwrap_err();
        assert!(matches!(err, BridgeError::TransportUnavailable));
        assert!(!bridge.is_platform_inited());
        assert_eq!(bridge.platform_info(), before);
    }

    #[tokio::test]
    async fn routes_without_host_reject() {
        let bridge = Bridge::new(&config(BuildProfile::Production), TransportSelector::new());
        assert!(matches!(
            bridge.play_game().await,
            Err(BridgeError::TransportUnavailable)
        ));
        assert!(matches!(
            bridge.dismiss_loading().await,
            Err(BridgeError::TransportUnavailable)
        ));
    }
}
