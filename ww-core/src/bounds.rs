//! Coverage rectangles for each data model.
//!
//! Lookups are keyed by the model token so that identifiers the client does
//! not know about never block an analysis: an unregistered model has no
//! bounds and nothing is out of them.

use crate::data_model::DataModel;
use serde::{Deserialize, Serialize};

/// A latitude/longitude rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// ERA5 coverage served by the API (continental US and nearby waters).
pub const ERA5_BOUNDS: ModelBounds = ModelBounds {
    min_lat: 23.402,
    max_lat: 51.403,
    min_lng: -137.725,
    max_lng: -44.224,
};

/// WIND Toolkit coverage (North America).
pub const WTK_BOUNDS: ModelBounds = ModelBounds {
    min_lat: 7.75,
    max_lat: 78.39,
    min_lng: -179.99,
    max_lng: -3.73,
};

impl ModelBounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        !(lat < self.min_lat || lat > self.max_lat || lng < self.min_lng || lng > self.max_lng)
    }
}

/// Registered bounds for a model token, if any.
pub fn bounds_for(model: &str) -> Option<ModelBounds> {
    DataModel::from_token(model).map(|m| m.bounds())
}

/// True when the point falls outside the model's coverage rectangle.
///
/// Models without registered bounds always return false.
pub fn is_out_of_bounds(lat: f64, lng: f64, model: &str) -> bool {
    match bounds_for(model) {
        Some(bounds) => !bounds.contains(lat, lng),
        None => false,
    }
}

/// Human-readable explanation of why a point cannot be analysed with `model`.
pub fn out_of_bounds_message(lat: f64, lng: f64, model: &str) -> String {
    let name = DataModel::from_token(model)
        .map(|m| m.display_name().to_string())
        .unwrap_or_else(|| model.trim().to_uppercase());
    match bounds_for(model) {
        Some(b) => format!(
            "The selected location ({:.3}, {:.3}) is outside the {} data coverage area. \
             Supported latitudes: {} to {}. Supported longitudes: {} to {}.",
            lat, lng, name, b.min_lat, b.max_lat, b.min_lng, b.max_lng
        ),
        None => format!(
            "The selected location ({:.3}, {:.3}) has no coverage information for the {} data model.",
            lat, lng, name
        ),
    }
}
