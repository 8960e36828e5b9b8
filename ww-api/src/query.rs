//! Typed API requests and their cache keys.
//!
//! A request can only be built for a complete, in-bounds selection, so a
//! missing position or an uncovered point never reaches the network.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use ww_core::bounds::is_out_of_bounds;
use ww_core::data_model::DataModel;
use ww_core::power_curve::PowerCurve;
use ww_core::settings::Settings;

/// Canonical serialization of the fields a request depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn new(raw: impl Into<String>) -> RequestKey {
        RequestKey(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Periods requested from the energy-production endpoint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePeriod {
    #[default]
    All,
    Summary,
    Monthly,
    Yearly,
}

impl TimePeriod {
    pub fn token(&self) -> &'static str {
        match self {
            TimePeriod::All => "all",
            TimePeriod::Summary => "summary",
            TimePeriod::Monthly => "monthly",
            TimePeriod::Yearly => "yearly",
        }
    }
}

/// Join `/api/{model}/{endpoint}` onto the configured base URL.
///
/// No `?` is appended when `params` is empty.
pub(crate) fn endpoint_url(
    base_url: &str,
    model: DataModel,
    endpoint: &str,
    params: &[(&str, String)],
) -> Result<Url, ApiError> {
    let raw = format!(
        "{}/api/{}/{}",
        base_url.trim_end_matches('/'),
        model.key(),
        endpoint
    );
    let mut url = Url::parse(&raw)?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindspeedQuery {
    pub model: DataModel,
    pub lat: f64,
    pub lng: f64,
    pub height: u32,
    pub ensemble: bool,
}

impl WindspeedQuery {
    pub fn from_settings(settings: &Settings) -> Option<WindspeedQuery> {
        let position = settings.current_position?;
        let model = settings.data_model;
        if is_out_of_bounds(position.lat, position.lng, model.key()) {
            return None;
        }
        Some(WindspeedQuery {
            model,
            lat: position.lat,
            lng: position.lng,
            height: settings.hub_height,
            ensemble: settings.ensemble && model.supports_ensemble(),
        })
    }

    pub fn cache_key(&self) -> RequestKey {
        RequestKey(format!(
            "windspeed|{}|{}|{}|{}|ensemble={}",
            self.model.key(),
            self.lat,
            self.lng,
            self.height,
            self.ensemble
        ))
    }

    pub fn url(&self, base_url: &str) -> Result<Url, ApiError> {
        let mut params = vec![
            ("lat", self.lat.to_string()),
            ("lng", self.lng.to_string()),
            ("height", self.height.to_string()),
        ];
        if self.ensemble {
            params.push(("ensemble", "true".to_string()));
        }
        endpoint_url(base_url, self.model, "windspeed", &params)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionQuery {
    pub model: DataModel,
    pub lat: f64,
    pub lng: f64,
    pub height: u32,
    pub power_curve: PowerCurve,
    pub time_period: TimePeriod,
}

impl ProductionQuery {
    pub fn from_settings(settings: &Settings, time_period: TimePeriod) -> Option<ProductionQuery> {
        let position = settings.current_position?;
        let model = settings.data_model;
        if is_out_of_bounds(position.lat, position.lng, model.key()) {
            return None;
        }
        Some(ProductionQuery {
            model,
            lat: position.lat,
            lng: position.lng,
            height: settings.hub_height,
            power_curve: settings.power_curve,
            time_period,
        })
    }

    pub fn cache_key(&self) -> RequestKey {
        RequestKey(format!(
            "energy-production|{}|{}|{}|{}|{}|{}",
            self.model.key(),
            self.lat,
            self.lng,
            self.height,
            self.power_curve.id(),
            self.time_period.token()
        ))
    }

    pub fn url(&self, base_url: &str) -> Result<Url, ApiError> {
        endpoint_url(
            base_url,
            self.model,
            "energy-production",
            &[
                ("lat", self.lat.to_string()),
                ("lng", self.lng.to_string()),
                ("height", self.height.to_string()),
                ("selected_powercurve", self.power_curve.id().to_string()),
                ("time_period", self.time_period.token().to_string()),
            ],
        )
    }
}

pub fn power_curves_url(base_url: &str, model: DataModel) -> Result<Url, ApiError> {
    endpoint_url(base_url, model, "available-powercurves", &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ww_core::settings::LocationParams;

    fn denver() -> Settings {
        Settings {
            current_position: LocationParams::new(39.7392, -104.9903),
            ..Settings::default()
        }
    }

    #[test]
    fn no_position_means_no_request() {
        assert!(WindspeedQuery::from_settings(&Settings::default()).is_none());
        assert!(ProductionQuery::from_settings(&Settings::default(), TimePeriod::All).is_none());
    }

    #[test]
    fn out_of_bounds_means_no_request() {
        let london = Settings {
            current_position: LocationParams::new(51.5074, -0.1278),
            ..Settings::default()
        };
        assert!(WindspeedQuery::from_settings(&london).is_none());
        assert!(ProductionQuery::from_settings(&london, TimePeriod::All).is_none());
    }

    #[test]
    fn keys_change_with_relevant_fields_only() {
        let base = denver();
        let key = WindspeedQuery::from_settings(&base).unwrap().cache_key();

        let other_curve = Settings {
            power_curve: PowerCurve::parse("nrel-reference-2.5kW").unwrap(),
            ..base.clone()
        };
        assert_eq!(WindspeedQuery::from_settings(&other_curve).unwrap().cache_key(), key);
        assert_ne!(
            ProductionQuery::from_settings(&other_curve, TimePeriod::All).unwrap().cache_key(),
            ProductionQuery::from_settings(&base, TimePeriod::All).unwrap().cache_key()
        );

        let taller = Settings {
            hub_height: 80,
            ..base.clone()
        };
        assert_ne!(WindspeedQuery::from_settings(&taller).unwrap().cache_key(), key);
    }

    #[test]
    fn ensemble_is_dropped_for_models_without_it() {
        let wtk = Settings {
            ensemble: true,
            data_model: DataModel::Wtk,
            ..denver()
        };
        let query = WindspeedQuery::from_settings(&wtk).unwrap();
        assert!(!query.ensemble);
        assert!(!query.url("https://example.org").unwrap().as_str().contains("ensemble"));
    }

    #[test]
    fn windspeed_url() {
        let query = WindspeedQuery::from_settings(&Settings {
            ensemble: true,
            ..denver()
        })
        .unwrap();
        let url = query.url("https://windwatts.example.org/").unwrap();
        assert_eq!(
            url.as_str(),
            "https://windwatts.example.org/api/era5/windspeed?lat=39.7392&lng=-104.9903&height=40&ensemble=true"
        );
    }

    #[test]
    fn production_url() {
        let query = ProductionQuery::from_settings(&denver(), TimePeriod::Summary).unwrap();
        let url = query.url("http://localhost:8000").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/era5/energy-production?lat=39.7392&lng=-104.9903&height=40&selected_powercurve=nrel-reference-100kW&time_period=summary"
        );
    }

    #[test]
    fn power_curves_url_has_no_query() {
        let url = power_curves_url("http://localhost:8000", DataModel::Wtk).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/wtk/available-powercurves");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn bad_base_url_is_an_error() {
        let query = WindspeedQuery::from_settings(&denver()).unwrap();
        assert!(matches!(query.url("not a base"), Err(ApiError::InvalidUrl(_))));
    }
}
