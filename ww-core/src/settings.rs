use crate::data_model::DataModel;
use crate::power_curve::PowerCurve;
use crate::units::Units;
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 22;
pub const DEFAULT_ZOOM: u8 = 4;

pub const MIN_HUB_HEIGHT: u32 = 10;
pub const MAX_HUB_HEIGHT: u32 = 200;
pub const DEFAULT_HUB_HEIGHT: u32 = 40;

pub const DEFAULT_ENSEMBLE: bool = false;

/// Default derating factor (17% losses).
pub const DEFAULT_LOSS_ASSUMPTION_FACTOR: f64 = 0.83;

/// A point of interest in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationParams {
    pub lat: f64,
    pub lng: f64,
}

impl LocationParams {
    /// Returns `None` unless both coordinates are finite and in range.
    pub fn new(lat: f64, lng: f64) -> Option<LocationParams> {
        let location = LocationParams { lat, lng };
        location.is_valid().then_some(location)
    }

    pub fn is_valid(&self) -> bool {
        is_valid_latitude(self.lat) && is_valid_longitude(self.lng)
    }

    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub fn is_valid_longitude(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

/// The session's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub current_position: Option<LocationParams>,
    pub zoom: u8,
    pub hub_height: u32,
    pub power_curve: PowerCurve,
    pub data_model: DataModel,
    pub ensemble: bool,
    /// 1.0 means no loss.
    pub loss_assumption_factor: f64,
    pub partner_id: Option<String>,
    pub units: Units,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            current_position: None,
            zoom: DEFAULT_ZOOM,
            hub_height: DEFAULT_HUB_HEIGHT,
            power_curve: PowerCurve::default(),
            data_model: DataModel::default(),
            ensemble: DEFAULT_ENSEMBLE,
            loss_assumption_factor: DEFAULT_LOSS_ASSUMPTION_FACTOR,
            partner_id: None,
            units: Units::default(),
        }
    }
}

impl Settings {
    pub fn loss_assumption_percent(&self) -> u8 {
        loss_factor_to_percent(self.loss_assumption_factor)
    }

    /// Clamp every field into its documented range.
    ///
    /// Used on snapshots read back from storage, which may have been written
    /// by an older build or edited by hand.
    pub fn sanitized(mut self) -> Settings {
        if !self.current_position.is_some_and(|p| p.is_valid()) {
            self.current_position = None;
        }
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.hub_height = self.hub_height.clamp(MIN_HUB_HEIGHT, MAX_HUB_HEIGHT);
        self.loss_assumption_factor = if self.loss_assumption_factor.is_finite() {
            self.loss_assumption_factor.clamp(0.0, 1.0)
        } else {
            DEFAULT_LOSS_ASSUMPTION_FACTOR
        };
        self.partner_id = normalize_partner_id(self.partner_id.as_deref());
        self
    }
}

/// `round((1 - factor) * 100)`, clamped to [0, 100].
pub fn loss_factor_to_percent(factor: f64) -> u8 {
    let percent = ((1.0 - factor) * 100.0).round();
    if percent.is_nan() {
        return loss_factor_to_percent(DEFAULT_LOSS_ASSUMPTION_FACTOR);
    }
    percent.clamp(0.0, 100.0) as u8
}

pub fn percent_to_loss_factor(percent: f64) -> f64 {
    1.0 - percent.clamp(0.0, 100.0) / 100.0
}

pub(crate) fn normalize_partner_id(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
