//! Display units and conversions.
//!
//! The API reports wind speed in m/s and energy in kWh; everything here
//! converts from those base units for display only.

use serde::{Deserialize, Serialize};

pub const MPH_PER_MS: f64 = 2.236_936_292_054_402;
pub const KWH_PER_MWH: f64 = 1000.0;

/// Upper edge (m/s, exclusive) of the "Low" resource class.
pub const LOW_RESOURCE_MAX_MS: f64 = 4.0;
/// Upper edge (m/s, exclusive) of the "Moderate" resource class.
pub const MODERATE_RESOURCE_MAX_MS: f64 = 6.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindspeedUnit {
    /// m/s
    #[default]
    Metric,
    /// mph
    Imperial,
}

impl WindspeedUnit {
    /// Accepts `m/s`, `ms`, `metric`, `mph` and `imperial`.
    pub fn from_token(token: &str) -> Option<WindspeedUnit> {
        match token.trim().to_ascii_lowercase().as_str() {
            "m/s" | "ms" | "metric" => Some(WindspeedUnit::Metric),
            "mph" | "imperial" => Some(WindspeedUnit::Imperial),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            WindspeedUnit::Metric => "m/s",
            WindspeedUnit::Imperial => "mph",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputUnit {
    #[default]
    #[serde(rename = "kWh")]
    KWh,
    #[serde(rename = "MWh")]
    MWh,
}

impl OutputUnit {
    pub fn from_token(token: &str) -> Option<OutputUnit> {
        match token.trim().to_ascii_lowercase().as_str() {
            "kwh" => Some(OutputUnit::KWh),
            "mwh" => Some(OutputUnit::MWh),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            OutputUnit::KWh => "kWh",
            OutputUnit::MWh => "MWh",
        }
    }
}

/// Preferred display units, persisted under the `units` storage key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units {
    pub windspeed: WindspeedUnit,
    pub output: OutputUnit,
}

pub fn ms_to_mph(ms: f64) -> f64 {
    ms * MPH_PER_MS
}

pub fn mph_to_ms(mph: f64) -> f64 {
    mph / MPH_PER_MS
}

pub fn kwh_to_mwh(kwh: f64) -> f64 {
    kwh / KWH_PER_MWH
}

pub fn mwh_to_kwh(mwh: f64) -> f64 {
    mwh * KWH_PER_MWH
}

/// Convert a wind speed in m/s into `unit`.
pub fn convert_windspeed(ms: f64, unit: WindspeedUnit) -> f64 {
    match unit {
        WindspeedUnit::Metric => ms,
        WindspeedUnit::Imperial => ms_to_mph(ms),
    }
}

/// Convert an energy value in kWh into `unit`.
pub fn convert_energy(kwh: f64, unit: OutputUnit) -> f64 {
    match unit {
        OutputUnit::KWh => kwh,
        OutputUnit::MWh => kwh_to_mwh(kwh),
    }
}

pub fn format_windspeed(ms: f64, unit: WindspeedUnit) -> String {
    format!("{:.2} {}", convert_windspeed(ms, unit), unit.token())
}

/// kWh are shown as whole numbers with thousands separators, MWh with two decimals.
pub fn format_energy(kwh: f64, unit: OutputUnit) -> String {
    match unit {
        OutputUnit::KWh => format!("{} kWh", group_thousands(kwh.round() as i64)),
        OutputUnit::MWh => format!("{:.2} MWh", kwh_to_mwh(kwh)),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Coarse wind resource category for a mean wind speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindResource {
    Low,
    Moderate,
    High,
}

impl WindResource {
    pub fn classify(ms: f64) -> WindResource {
        if ms < LOW_RESOURCE_MAX_MS {
            WindResource::Low
        } else if ms < MODERATE_RESOURCE_MAX_MS {
            WindResource::Moderate
        } else {
            WindResource::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindResource::Low => "Low",
            WindResource::Moderate => "Moderate",
            WindResource::High => "High",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn windspeed_conversions_invert() {
        assert_relative_eq!(ms_to_mph(10.0), 22.369_362_920_544_02, epsilon = 1e-9);
        assert_relative_eq!(mph_to_ms(ms_to_mph(7.3)), 7.3, epsilon = 1e-12);
    }

    #[test]
    fn energy_conversions_invert() {
        assert_relative_eq!(kwh_to_mwh(39_165.0), 39.165);
        assert_relative_eq!(mwh_to_kwh(kwh_to_mwh(1234.5)), 1234.5, epsilon = 1e-9);
    }

    #[test]
    fn unit_tokens_accept_alternate_spellings() {
        assert_eq!(WindspeedUnit::from_token("ms"), Some(WindspeedUnit::Metric));
        assert_eq!(WindspeedUnit::from_token("m/s"), Some(WindspeedUnit::Metric));
        assert_eq!(WindspeedUnit::from_token("MPH"), Some(WindspeedUnit::Imperial));
        assert_eq!(WindspeedUnit::from_token("knots"), None);
        assert_eq!(OutputUnit::from_token("mwh"), Some(OutputUnit::MWh));
        assert_eq!(OutputUnit::from_token("GWh"), None);
    }

    #[test]
    fn formatting() {
        assert_eq!(format_windspeed(5.0, WindspeedUnit::Metric), "5.00 m/s");
        assert_eq!(format_windspeed(5.0, WindspeedUnit::Imperial), "11.18 mph");
        assert_eq!(format_energy(39_165.0, OutputUnit::KWh), "39,165 kWh");
        assert_eq!(format_energy(830.0, OutputUnit::KWh), "830 kWh");
        assert_eq!(format_energy(1_234_567.0, OutputUnit::KWh), "1,234,567 kWh");
        assert_eq!(format_energy(47_187.0, OutputUnit::MWh), "47.19 MWh");
    }

    #[test]
    fn resource_classes() {
        assert_eq!(WindResource::classify(3.99), WindResource::Low);
        assert_eq!(WindResource::classify(4.0), WindResource::Moderate);
        assert_eq!(WindResource::classify(5.99), WindResource::Moderate);
        assert_eq!(WindResource::classify(6.0), WindResource::High);
        assert_eq!(WindResource::High.label(), "High");
    }

    #[test]
    fn units_serialize_for_storage() {
        let units = Units {
            windspeed: WindspeedUnit::Imperial,
            output: OutputUnit::MWh,
        };
        let json = serde_json::to_string(&units).unwrap();
        assert_eq!(json, r#"{"windspeed":"imperial","output":"MWh"}"#);
    }
}
