//! Settings store backed by durable storage and the page URL.
//!
//! The store owns the current [`Settings`]. Every setter validates its input,
//! commits the new value in memory, writes the full snapshot to storage and
//! replaces the page query string. Storage and URL failures are logged and do
//! not roll back the in-memory change.
//!
//! Hydration precedence: URL parameters, then the stored snapshot, then the
//! hard defaults.

use crate::data_model::{snap_hub_height, DataModel};
use crate::power_curve::PowerCurve;
use crate::settings::{
    normalize_partner_id, percent_to_loss_factor, LocationParams, Settings, MAX_HUB_HEIGHT,
    MAX_ZOOM, MIN_HUB_HEIGHT, MIN_ZOOM,
};
use crate::units::{OutputUnit, Units, WindspeedUnit};
use crate::url_params::{serialize_settings, UrlParams};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

pub const SETTINGS_STORAGE_KEY: &str = "settings";
pub const UNITS_STORAGE_KEY: &str = "units";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
    #[error("failed to update the page URL: {0}")]
    Url(String),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable key/value storage (localStorage in the browser).
pub trait SettingsStorage {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// The page URL's query string.
pub trait UrlSync {
    fn query(&self) -> String;
    /// Replace the query string without adding a history entry.
    fn replace_query(&mut self, query: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }
}

impl SettingsStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// In-memory URL that records how many times it was replaced.
#[derive(Debug, Clone, Default)]
pub struct MemoryUrl {
    query: String,
    replacements: usize,
}

impl MemoryUrl {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.trim_start_matches('?').to_string(),
            replacements: 0,
        }
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl UrlSync for MemoryUrl {
    fn query(&self) -> String {
        self.query.clone()
    }

    fn replace_query(&mut self, query: &str) -> Result<(), StorageError> {
        self.query = query.to_string();
        self.replacements += 1;
        Ok(())
    }
}

pub struct SettingsStore<S, U> {
    settings: Settings,
    storage: S,
    url: U,
}

impl<S: SettingsStorage, U: UrlSync> SettingsStore<S, U> {
    /// Build the initial settings from the URL, storage and defaults.
    pub fn hydrate(storage: S, url: U) -> Self {
        let mut settings = storage
            .load(SETTINGS_STORAGE_KEY)
            .and_then(|raw| settings_from_snapshot(&raw))
            .unwrap_or_default();
        if let Some(units) = load_json::<Units>(&storage, UNITS_STORAGE_KEY) {
            settings.units = units;
        }
        let params = UrlParams::parse(&url.query());
        if !params.is_empty() {
            debug!("hydrating settings from URL parameters: {:?}", params);
        }
        let mut settings = params.apply(settings);
        settings.hub_height =
            snap_hub_height(settings.hub_height, settings.data_model.hub_heights());
        Self {
            settings,
            storage,
            url,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn url(&self) -> &U {
        &self.url
    }

    pub fn current_position(&self) -> Option<LocationParams> {
        self.settings.current_position
    }

    pub fn zoom(&self) -> u8 {
        self.settings.zoom
    }

    pub fn hub_height(&self) -> u32 {
        self.settings.hub_height
    }

    pub fn power_curve(&self) -> PowerCurve {
        self.settings.power_curve
    }

    pub fn data_model(&self) -> DataModel {
        self.settings.data_model
    }

    pub fn ensemble(&self) -> bool {
        self.settings.ensemble
    }

    pub fn loss_assumption_factor(&self) -> f64 {
        self.settings.loss_assumption_factor
    }

    pub fn loss_assumption_percent(&self) -> u8 {
        self.settings.loss_assumption_percent()
    }

    pub fn partner_id(&self) -> Option<&str> {
        self.settings.partner_id.as_deref()
    }

    pub fn units(&self) -> Units {
        self.settings.units
    }

    /// Invalid coordinates are rejected and leave the position unchanged.
    pub fn set_current_position(&mut self, position: Option<LocationParams>) {
        if let Some(p) = position {
            if !p.is_valid() {
                warn!("rejecting invalid position ({}, {})", p.lat, p.lng);
                return;
            }
        }
        self.settings.current_position = position;
        self.commit();
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.settings.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.commit();
    }

    /// Snaps to the nearest height the active model serves.
    pub fn set_hub_height(&mut self, hub_height: u32) {
        self.settings.hub_height =
            snap_hub_height(hub_height, self.settings.data_model.hub_heights());
        self.commit();
    }

    pub fn set_power_curve(&mut self, power_curve: PowerCurve) {
        self.settings.power_curve = power_curve;
        self.commit();
    }

    /// Also re-snaps the hub height to the new model's height set.
    pub fn set_data_model(&mut self, data_model: DataModel) {
        self.settings.data_model = data_model;
        self.settings.hub_height =
            snap_hub_height(self.settings.hub_height, data_model.hub_heights());
        self.commit();
    }

    pub fn set_ensemble(&mut self, ensemble: bool) {
        self.settings.ensemble = ensemble;
        self.commit();
    }

    /// Non-finite factors are ignored; others are clamped to [0, 1].
    pub fn set_loss_assumption_factor(&mut self, factor: f64) {
        if !factor.is_finite() {
            warn!("ignoring non-finite loss factor {}", factor);
            return;
        }
        self.settings.loss_assumption_factor = factor.clamp(0.0, 1.0);
        self.commit();
    }

    pub fn set_loss_assumption_percent(&mut self, percent: f64) {
        if !percent.is_finite() {
            warn!("ignoring non-finite loss percentage {}", percent);
            return;
        }
        self.settings.loss_assumption_factor = percent_to_loss_factor(percent);
        self.commit();
    }

    pub fn set_partner_id(&mut self, partner_id: Option<&str>) {
        self.settings.partner_id = normalize_partner_id(partner_id);
        self.commit();
    }

    pub fn set_units(&mut self, units: Units) {
        self.settings.units = units;
        self.commit();
    }

    pub fn set_windspeed_unit(&mut self, unit: WindspeedUnit) {
        self.settings.units.windspeed = unit;
        self.commit();
    }

    pub fn set_output_unit(&mut self, unit: OutputUnit) {
        self.settings.units.output = unit;
        self.commit();
    }

    fn commit(&mut self) {
        if let Err(e) = self.persist() {
            warn!("failed to persist settings: {}", e);
        }
        let query = serialize_settings(&self.settings);
        if let Err(e) = self.url.replace_query(&query) {
            warn!("failed to sync settings into the URL: {}", e);
        }
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let snapshot = serde_json::to_string(&self.settings)?;
        self.storage.save(SETTINGS_STORAGE_KEY, &snapshot)?;
        let units = serde_json::to_string(&self.settings.units)?;
        self.storage.save(UNITS_STORAGE_KEY, &units)
    }
}

/// Decode a stored settings snapshot one field at a time.
///
/// A field that is missing or fails to decode takes its default and the
/// remaining fields are kept. Numeric zoom and hub height values are rounded
/// before clamping. Returns `None` when the snapshot is not a JSON object.
pub fn settings_from_snapshot(raw: &str) -> Option<Settings> {
    let fields = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            warn!("discarding settings snapshot that is not an object: {}", other);
            return None;
        }
        Err(e) => {
            warn!("discarding unreadable settings snapshot: {}", e);
            return None;
        }
    };
    let defaults = Settings::default();
    let settings = Settings {
        current_position: snapshot_field(&fields, "currentPosition")
            .unwrap_or(defaults.current_position),
        zoom: snapshot_number(&fields, "zoom")
            .map(|z| z.clamp(f64::from(MIN_ZOOM), f64::from(MAX_ZOOM)) as u8)
            .unwrap_or(defaults.zoom),
        hub_height: snapshot_number(&fields, "hubHeight")
            .map(|h| h.clamp(f64::from(MIN_HUB_HEIGHT), f64::from(MAX_HUB_HEIGHT)) as u32)
            .unwrap_or(defaults.hub_height),
        power_curve: snapshot_field(&fields, "powerCurve").unwrap_or(defaults.power_curve),
        data_model: snapshot_field(&fields, "dataModel").unwrap_or(defaults.data_model),
        ensemble: snapshot_field(&fields, "ensemble").unwrap_or(defaults.ensemble),
        loss_assumption_factor: snapshot_field(&fields, "lossAssumptionFactor")
            .unwrap_or(defaults.loss_assumption_factor),
        partner_id: snapshot_field(&fields, "partnerId").unwrap_or(defaults.partner_id),
        units: snapshot_field(&fields, "units").unwrap_or(defaults.units),
    };
    Some(settings.sanitized())
}

fn snapshot_field<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("ignoring stored {} ({}), using default", key, e);
            None
        }
    }
}

fn snapshot_number(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    snapshot_field::<f64>(fields, key)
        .filter(|v| v.is_finite())
        .map(f64::round)
}

fn load_json<T: DeserializeOwned>(storage: &impl SettingsStorage, key: &str) -> Option<T> {
    let raw = storage.load(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("discarding unreadable {} snapshot: {}", key, e);
            None
        }
    }
}
