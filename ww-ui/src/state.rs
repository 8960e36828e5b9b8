//! Application state managed via Dioxus context.
//!
//! `AppState` bundles the reactive signals; `ApiContext` carries the HTTP
//! client and the request caches shared by every panel. Both are provided by
//! the root component and read with `use_context`.

use dioxus::prelude::*;
use ww_api::{ApiError, ClientConfig, FetchState, RequestCache, WindwattsClient};
use ww_core::production::{ProductionEstimate, WindEstimate};
use ww_core::store::SettingsStore;

use crate::browser::{BrowserLocation, BrowserStorage};

pub type BrowserSettingsStore = SettingsStore<BrowserStorage, BrowserLocation>;

/// Base URL baked in at build time, falling back to the public service.
pub fn client_config() -> ClientConfig {
    match option_env!("WINDWATTS_API_URL") {
        Some(base_url) => ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        },
        None => ClientConfig::default(),
    }
}

#[derive(Clone, Copy)]
pub struct AppState {
    /// Current settings, mirrored to localStorage and the URL on every write
    pub store: Signal<BrowserSettingsStore>,
    /// Windspeed panel
    pub windspeed: Signal<FetchState<WindEstimate>>,
    /// Production panel (all periods in one response)
    pub production: Signal<FetchState<ProductionEstimate>>,
    /// True while a CSV export is in progress
    pub downloading: Signal<bool>,
    /// Last CSV export failure
    pub download_error: Signal<Option<String>>,
}

impl AppState {
    /// Hydrate settings from the page URL and localStorage.
    pub fn new() -> Self {
        Self {
            store: Signal::new(SettingsStore::hydrate(BrowserStorage, BrowserLocation)),
            windspeed: Signal::new(FetchState::default()),
            production: Signal::new(FetchState::default()),
            downloading: Signal::new(false),
            download_error: Signal::new(None),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct ApiContext {
    pub client: Result<WindwattsClient, ApiError>,
    pub windspeed: RequestCache<WindEstimate>,
    pub production: RequestCache<ProductionEstimate>,
}

impl ApiContext {
    pub fn new(config: ClientConfig) -> Self {
        let client = WindwattsClient::new(config);
        if let Err(e) = &client {
            log::error!("Failed to build API client: {}", e);
        }
        Self {
            client,
            windspeed: RequestCache::new(),
            production: RequestCache::new(),
        }
    }
}
