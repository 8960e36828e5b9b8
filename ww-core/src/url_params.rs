//! Query-string codec for shareable settings URLs.
//!
//! Parsing is per-field and fail-soft: a malformed field is dropped with a
//! warning and the caller's default applies. Serialization emits the position
//! and every field that differs from its default, nothing else.

use crate::data_model::DataModel;
use crate::power_curve::PowerCurve;
use crate::settings::{
    is_valid_latitude, is_valid_longitude, loss_factor_to_percent, normalize_partner_id,
    percent_to_loss_factor, LocationParams, Settings, DEFAULT_ENSEMBLE, DEFAULT_HUB_HEIGHT,
    DEFAULT_LOSS_ASSUMPTION_FACTOR, DEFAULT_ZOOM, MAX_HUB_HEIGHT, MAX_ZOOM, MIN_HUB_HEIGHT,
    MIN_ZOOM,
};
use crate::units::{OutputUnit, WindspeedUnit};
use log::warn;
use std::collections::HashMap;
use url::form_urlencoded;

pub const PARAM_LAT: &str = "lat";
pub const PARAM_LNG: &str = "lng";
pub const PARAM_ZOOM: &str = "zoom";
pub const PARAM_HUB_HEIGHT: &str = "hubHeight";
pub const PARAM_POWER_CURVE: &str = "powerCurve";
pub const PARAM_DATA_MODEL: &str = "dataModel";
pub const PARAM_MODEL: &str = "model";
pub const PARAM_ENSEMBLE: &str = "ensemble";
pub const PARAM_LOSS_ASSUMPTION: &str = "lossAssumption";
pub const PARAM_PARTNER_ID: &str = "partnerId";
pub const PARAM_WINDSPEED_UNIT: &str = "windspeedUnit";
pub const PARAM_OUTPUT_UNIT: &str = "outputUnit";

/// Settings fields recovered from a query string. `None` means absent or invalid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlParams {
    pub position: Option<LocationParams>,
    pub zoom: Option<u8>,
    pub hub_height: Option<u32>,
    pub power_curve: Option<PowerCurve>,
    pub data_model: Option<DataModel>,
    pub ensemble: Option<bool>,
    pub loss_assumption_factor: Option<f64>,
    pub partner_id: Option<String>,
    pub windspeed_unit: Option<WindspeedUnit>,
    pub output_unit: Option<OutputUnit>,
}

impl UrlParams {
    /// Parse a query string, a `?`-prefixed search string or a full URL.
    pub fn parse(input: &str) -> UrlParams {
        let query = extract_query(input);
        let mut raw: HashMap<String, String> = HashMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            // first occurrence wins, like URLSearchParams.get
            raw.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        let get = |key: &str| raw.get(key).map(String::as_str);

        UrlParams {
            position: parse_position(get(PARAM_LAT), get(PARAM_LNG)),
            zoom: get(PARAM_ZOOM).and_then(parse_zoom),
            hub_height: get(PARAM_HUB_HEIGHT).and_then(parse_hub_height),
            power_curve: get(PARAM_POWER_CURVE).and_then(|value| {
                PowerCurve::parse(value).or_else(|| invalid(PARAM_POWER_CURVE, value))
            }),
            data_model: get(PARAM_DATA_MODEL)
                .or_else(|| get(PARAM_MODEL))
                .and_then(|value| {
                    DataModel::from_token(value).or_else(|| invalid(PARAM_DATA_MODEL, value))
                }),
            ensemble: get(PARAM_ENSEMBLE).and_then(parse_ensemble),
            loss_assumption_factor: get(PARAM_LOSS_ASSUMPTION).and_then(parse_loss_assumption),
            partner_id: normalize_partner_id(get(PARAM_PARTNER_ID)),
            windspeed_unit: get(PARAM_WINDSPEED_UNIT).and_then(|value| {
                WindspeedUnit::from_token(value).or_else(|| invalid(PARAM_WINDSPEED_UNIT, value))
            }),
            output_unit: get(PARAM_OUTPUT_UNIT).and_then(|value| {
                OutputUnit::from_token(value).or_else(|| invalid(PARAM_OUTPUT_UNIT, value))
            }),
        }
    }

    /// Overlay the parsed fields onto `base`.
    pub fn apply(&self, mut base: Settings) -> Settings {
        if let Some(position) = self.position {
            base.current_position = Some(position);
        }
        if let Some(zoom) = self.zoom {
            base.zoom = zoom;
        }
        if let Some(hub_height) = self.hub_height {
            base.hub_height = hub_height;
        }
        if let Some(power_curve) = self.power_curve {
            base.power_curve = power_curve;
        }
        if let Some(data_model) = self.data_model {
            base.data_model = data_model;
        }
        if let Some(ensemble) = self.ensemble {
            base.ensemble = ensemble;
        }
        if let Some(factor) = self.loss_assumption_factor {
            base.loss_assumption_factor = factor;
        }
        if let Some(partner_id) = &self.partner_id {
            base.partner_id = Some(partner_id.clone());
        }
        if let Some(unit) = self.windspeed_unit {
            base.units.windspeed = unit;
        }
        if let Some(unit) = self.output_unit {
            base.units.output = unit;
        }
        base
    }

    /// The parsed fields on top of the hard defaults.
    pub fn into_settings(self) -> Settings {
        self.apply(Settings::default())
    }

    pub fn is_empty(&self) -> bool {
        *self == UrlParams::default()
    }
}

/// Canonical query string (without the leading `?`) for `settings`.
pub fn serialize_settings(settings: &Settings) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(position) = settings.current_position {
        query.append_pair(PARAM_LAT, &format!("{:.4}", position.lat));
        query.append_pair(PARAM_LNG, &format!("{:.4}", position.lng));
    }
    if settings.zoom != DEFAULT_ZOOM {
        query.append_pair(PARAM_ZOOM, &settings.zoom.to_string());
    }
    if settings.hub_height != DEFAULT_HUB_HEIGHT {
        query.append_pair(PARAM_HUB_HEIGHT, &settings.hub_height.to_string());
    }
    if settings.power_curve != PowerCurve::default() {
        query.append_pair(PARAM_POWER_CURVE, settings.power_curve.id());
    }
    if settings.data_model != DataModel::default() {
        query.append_pair(PARAM_DATA_MODEL, settings.data_model.key());
    }
    if settings.ensemble != DEFAULT_ENSEMBLE {
        query.append_pair(PARAM_ENSEMBLE, &settings.ensemble.to_string());
    }
    let loss_percent = settings.loss_assumption_percent();
    if loss_percent != loss_factor_to_percent(DEFAULT_LOSS_ASSUMPTION_FACTOR) {
        query.append_pair(PARAM_LOSS_ASSUMPTION, &loss_percent.to_string());
    }
    if let Some(partner_id) = &settings.partner_id {
        query.append_pair(PARAM_PARTNER_ID, partner_id);
    }
    if settings.units.windspeed != WindspeedUnit::default() {
        query.append_pair(PARAM_WINDSPEED_UNIT, settings.units.windspeed.token());
    }
    if settings.units.output != OutputUnit::default() {
        query.append_pair(PARAM_OUTPUT_UNIT, settings.units.output.token());
    }
    query.finish()
}

fn extract_query(input: &str) -> &str {
    let without_fragment = input.split('#').next().unwrap_or("");
    match without_fragment.split_once('?') {
        Some((_, query)) => query,
        None => without_fragment,
    }
}

fn invalid<T>(param: &str, value: &str) -> Option<T> {
    warn!("ignoring invalid URL parameter {}={:?}, using default", param, value);
    None
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_position(lat: Option<&str>, lng: Option<&str>) -> Option<LocationParams> {
    let (lat_raw, lng_raw) = match (lat, lng) {
        (None, None) => return None,
        (Some(lat), Some(lng)) => (lat, lng),
        (Some(lat), None) => return invalid(PARAM_LAT, lat),
        (None, Some(lng)) => return invalid(PARAM_LNG, lng),
    };
    let lat = match parse_number(lat_raw).filter(|v| is_valid_latitude(*v)) {
        Some(lat) => lat,
        None => return invalid(PARAM_LAT, lat_raw),
    };
    let lng = match parse_number(lng_raw).filter(|v| is_valid_longitude(*v)) {
        Some(lng) => lng,
        None => return invalid(PARAM_LNG, lng_raw),
    };
    LocationParams::new(lat, lng)
}

fn parse_zoom(value: &str) -> Option<u8> {
    parse_number(value)
        .filter(|z| (f64::from(MIN_ZOOM)..=f64::from(MAX_ZOOM)).contains(z))
        .map(|z| z.round() as u8)
        .or_else(|| invalid(PARAM_ZOOM, value))
}

fn parse_hub_height(value: &str) -> Option<u32> {
    parse_number(value)
        .filter(|h| h.fract() == 0.0)
        .filter(|h| (f64::from(MIN_HUB_HEIGHT)..=f64::from(MAX_HUB_HEIGHT)).contains(h))
        .map(|h| h as u32)
        .or_else(|| invalid(PARAM_HUB_HEIGHT, value))
}

fn parse_ensemble(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        other => invalid(PARAM_ENSEMBLE, other),
    }
}

fn parse_loss_assumption(value: &str) -> Option<f64> {
    parse_number(value)
        .filter(|p| (0.0..=100.0).contains(p))
        .map(|p| percent_to_loss_factor(p.round()))
        .or_else(|| invalid(PARAM_LOSS_ASSUMPTION, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Units;
    use approx::assert_relative_eq;

    #[test]
    fn parses_the_denver_scenario() {
        let params = UrlParams::parse("?lat=39.7392&lng=-104.9903&hubHeight=40");
        assert_eq!(
            params,
            UrlParams {
                position: Some(LocationParams {
                    lat: 39.7392,
                    lng: -104.9903
                }),
                hub_height: Some(40),
                ..UrlParams::default()
            }
        );
        let settings = params.into_settings();
        assert_eq!(settings.zoom, DEFAULT_ZOOM);
        assert_eq!(settings.data_model, DataModel::Era5);
        assert_eq!(settings.power_curve, PowerCurve::default());
        assert!(!settings.ensemble);
    }

    #[test]
    fn accepts_full_urls_and_fragments() {
        let params = UrlParams::parse("https://example.org/app?zoom=9&model=wtk#results");
        assert_eq!(params.zoom, Some(9));
        assert_eq!(params.data_model, Some(DataModel::Wtk));
    }

    #[test]
    fn empty_query_yields_nothing() {
        assert!(UrlParams::parse("").is_empty());
        assert!(UrlParams::parse("?").is_empty());
        assert_eq!(UrlParams::parse("").into_settings(), Settings::default());
    }

    #[test]
    fn invalid_fields_are_dropped_individually() {
        let params = UrlParams::parse(
            "lat=91&lng=10&zoom=0&hubHeight=250&powerCurve=nope&dataModel=merra2\
             &ensemble=yes&lossAssumption=101&partnerId=%20%20&windspeedUnit=knots&outputUnit=GWh",
        );
        assert!(params.is_empty(), "{:?}", params);
    }

    #[test]
    fn one_bad_field_does_not_reject_the_rest() {
        let params =
            UrlParams::parse("lat=abc&lng=-104.99&hubHeight=80&powerCurve=nrel-reference-250kW");
        assert_eq!(params.position, None);
        assert_eq!(params.hub_height, Some(80));
        assert_eq!(params.power_curve.map(|p| p.id()), Some("nrel-reference-250kW"));
    }

    #[test]
    fn zoom_rounds_and_hub_height_requires_integers() {
        let params = UrlParams::parse("zoom=7.6&hubHeight=45.5");
        assert_eq!(params.zoom, Some(8));
        assert_eq!(params.hub_height, None);
        assert_eq!(UrlParams::parse("hubHeight=10").hub_height, Some(10));
        assert_eq!(UrlParams::parse("hubHeight=200").hub_height, Some(200));
    }

    #[test]
    fn data_model_token_must_match_exactly() {
        assert_eq!(UrlParams::parse("dataModel=ERA5").data_model, None);
        assert_eq!(UrlParams::parse("dataModel=%20wtk").data_model, None);
        assert_eq!(UrlParams::parse("dataModel=wtk").data_model, Some(DataModel::Wtk));
    }

    #[test]
    fn data_model_takes_precedence_over_model_alias() {
        let params = UrlParams::parse("model=era5&dataModel=wtk");
        assert_eq!(params.data_model, Some(DataModel::Wtk));
    }

    #[test]
    fn ensemble_is_tri_state() {
        assert_eq!(UrlParams::parse("ensemble=true").ensemble, Some(true));
        assert_eq!(UrlParams::parse("ensemble=false").ensemble, Some(false));
        assert_eq!(UrlParams::parse("ensemble=TRUE").ensemble, None);
        assert_eq!(UrlParams::parse("ensemble=1").ensemble, None);
    }

    #[test]
    fn loss_assumption_becomes_a_factor() {
        let factor = UrlParams::parse("lossAssumption=10").loss_assumption_factor.unwrap();
        assert_relative_eq!(factor, 0.9, epsilon = 1e-12);
        let factor = UrlParams::parse("lossAssumption=0").loss_assumption_factor.unwrap();
        assert_relative_eq!(factor, 1.0);
        assert_eq!(UrlParams::parse("lossAssumption=-1").loss_assumption_factor, None);
    }

    #[test]
    fn partner_id_is_trimmed() {
        assert_eq!(
            UrlParams::parse("partnerId=%20acme%20").partner_id.as_deref(),
            Some("acme")
        );
    }

    #[test]
    fn unit_tokens() {
        let params = UrlParams::parse("windspeedUnit=mph&outputUnit=MWh");
        assert_eq!(params.windspeed_unit, Some(WindspeedUnit::Imperial));
        assert_eq!(params.output_unit, Some(OutputUnit::MWh));
        assert_eq!(
            UrlParams::parse("windspeedUnit=ms").windspeed_unit,
            Some(WindspeedUnit::Metric)
        );
    }

    #[test]
    fn defaults_serialize_to_an_empty_query() {
        assert_eq!(serialize_settings(&Settings::default()), "");
    }

    #[test]
    fn position_always_uses_four_decimals() {
        let settings = Settings {
            current_position: LocationParams::new(39.73921234, -104.99),
            ..Settings::default()
        };
        assert_eq!(serialize_settings(&settings), "lat=39.7392&lng=-104.9900");
    }

    #[test]
    fn non_default_fields_round_trip() {
        let settings = Settings {
            current_position: LocationParams::new(44.9778, -93.265),
            zoom: 11,
            hub_height: 120,
            power_curve: PowerCurve::parse("nrel-reference-2000kW").unwrap(),
            data_model: DataModel::Wtk,
            ensemble: true,
            loss_assumption_factor: 0.75,
            partner_id: Some("acme-wind".to_string()),
            units: Units {
                windspeed: WindspeedUnit::Imperial,
                output: OutputUnit::MWh,
            },
        };
        let query = serialize_settings(&settings);
        assert!(query.contains("lossAssumption=25"));
        assert!(query.contains("dataModel=wtk"));
        let parsed = UrlParams::parse(&query).into_settings();
        assert_eq!(parsed.current_position, settings.current_position);
        assert_eq!(parsed.zoom, 11);
        assert_eq!(parsed.hub_height, 120);
        assert_eq!(parsed.power_curve, settings.power_curve);
        assert_eq!(parsed.data_model, DataModel::Wtk);
        assert!(parsed.ensemble);
        assert_relative_eq!(parsed.loss_assumption_factor, 0.75, epsilon = 1e-12);
        assert_eq!(parsed.partner_id.as_deref(), Some("acme-wind"));
        assert_eq!(parsed.units, settings.units);
    }

    #[test]
    fn default_valued_fields_are_omitted_but_reappear_on_parse() {
        let settings = Settings {
            current_position: LocationParams::new(39.7392, -104.9903),
            hub_height: 80,
            ..Settings::default()
        };
        let query = serialize_settings(&settings);
        assert_eq!(query, "lat=39.7392&lng=-104.9903&hubHeight=80");
        for omitted in [
            PARAM_ZOOM,
            PARAM_POWER_CURVE,
            PARAM_DATA_MODEL,
            PARAM_ENSEMBLE,
            PARAM_LOSS_ASSUMPTION,
        ] {
            assert!(!query.contains(omitted), "{} should be omitted", omitted);
        }
        assert_eq!(UrlParams::parse(&query).into_settings(), settings);
    }
}
