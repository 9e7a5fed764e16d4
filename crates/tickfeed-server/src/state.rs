//! Shared application state.

use crate::config::ServerConfig;
use std::sync::Arc;
use tickfeed_core::AssetSource;

/// Read-only state handed to every handler. Built once at start-up.
#[derive(Debug, Clone)]
pub struct AppState {
    pub assets: Arc<AssetSource>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            assets: Arc::new(AssetSource::new(config.asset_mode, config.static_dir.clone())),
        }
    }
}
