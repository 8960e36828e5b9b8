//! Typed API payloads and the loss adjustment transform.
//!
//! Production estimates are modeled with explicit optional sections rather
//! than loosely-typed JSON. The yearly section arrives either as a map keyed
//! by year or as an array of rows carrying a `year` field; both normalize to
//! [`YearlyProduction`] when deserialized.

use log::warn;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const KWH_PRODUCED: &str = "kWh produced";
pub const AVERAGE_WIND_SPEED: &str = "Average wind speed (m/s)";

pub const AVERAGE_YEAR: &str = "Average year";
pub const LOWEST_YEAR: &str = "Lowest year";
pub const HIGHEST_YEAR: &str = "Highest year";

/// Response of the windspeed endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindEstimate {
    /// Long-term mean wind speed in m/s.
    pub global_avg: f64,
    /// Periodized breakdowns, passed through untouched.
    #[serde(flatten)]
    pub breakdowns: BTreeMap<String, Value>,
}

/// One row of a production table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionRow {
    #[serde(
        rename = "kWh produced",
        alias = "kWh",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub kwh_produced: Option<f64>,
    #[serde(
        rename = "Average wind speed (m/s)",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub average_wind_speed: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The three summary periods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryProduction {
    #[serde(rename = "Average year", default, skip_serializing_if = "Option::is_none")]
    pub average_year: Option<ProductionRow>,
    #[serde(rename = "Lowest year", default, skip_serializing_if = "Option::is_none")]
    pub lowest_year: Option<ProductionRow>,
    #[serde(rename = "Highest year", default, skip_serializing_if = "Option::is_none")]
    pub highest_year: Option<ProductionRow>,
}

impl SummaryProduction {
    pub fn rows(&self) -> impl Iterator<Item = (&'static str, &ProductionRow)> {
        [
            (AVERAGE_YEAR, self.average_year.as_ref()),
            (LOWEST_YEAR, self.lowest_year.as_ref()),
            (HIGHEST_YEAR, self.highest_year.as_ref()),
        ]
        .into_iter()
        .filter_map(|(label, row)| row.map(|r| (label, r)))
    }
}

/// Monthly rows in the order the API sent them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyProduction {
    pub rows: Vec<(String, ProductionRow)>,
}

impl Serialize for MonthlyProduction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (month, row) in &self.rows {
            map.serialize_entry(month, row)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MonthlyProduction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedRows;

        impl<'de> Visitor<'de> for OrderedRows {
            type Value = MonthlyProduction;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of month name to production row")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut rows = Vec::with_capacity(access.size_hint().unwrap_or(12));
                while let Some((month, row)) = access.next_entry::<String, ProductionRow>()? {
                    rows.push((month, row));
                }
                Ok(MonthlyProduction { rows })
            }
        }

        deserializer.deserialize_map(OrderedRows)
    }
}

/// A yearly production row.
#[derive(Debug, Clone, PartialEq)]
pub struct YearRow {
    pub year: i32,
    pub row: ProductionRow,
}

/// Yearly rows in ascending year order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawYearly")]
pub struct YearlyProduction {
    pub rows: Vec<YearRow>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawYearly {
    Indexed(Vec<IndexedYearRow>),
    ByYear(BTreeMap<String, ProductionRow>),
}

#[derive(Deserialize)]
struct IndexedYearRow {
    #[serde(alias = "Year")]
    year: Value,
    #[serde(flatten)]
    row: ProductionRow,
}

fn year_from_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<RawYearly> for YearlyProduction {
    fn from(raw: RawYearly) -> Self {
        let mut rows: Vec<YearRow> = match raw {
            RawYearly::ByYear(map) => map
                .into_iter()
                .filter_map(|(key, row)| match key.trim().parse() {
                    Ok(year) => Some(YearRow { year, row }),
                    Err(_) => {
                        warn!("dropping yearly production row with key {:?}", key);
                        None
                    }
                })
                .collect(),
            RawYearly::Indexed(items) => items
                .into_iter()
                .filter_map(|item| match year_from_value(&item.year) {
                    Some(year) => Some(YearRow {
                        year,
                        row: item.row,
                    }),
                    None => {
                        warn!("dropping yearly production row with year {}", item.year);
                        None
                    }
                })
                .collect(),
        };
        rows.sort_by_key(|r| r.year);
        YearlyProduction { rows }
    }
}

impl Serialize for YearlyProduction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for r in &self.rows {
            map.serialize_entry(&r.year.to_string(), &r.row)?;
        }
        map.end()
    }
}

/// Response of the energy-production endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_avg_energy_production: Option<SummaryProduction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_avg_energy_production: Option<MonthlyProduction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearly_avg_energy_production: Option<YearlyProduction>,
}

impl ProductionEstimate {
    /// kWh of the "Average year" summary row, if present.
    pub fn average_year_kwh(&self) -> Option<f64> {
        self.summary_avg_energy_production
            .as_ref()
            .and_then(|s| s.average_year.as_ref())
            .and_then(|r| r.kwh_produced)
    }

    fn rows_mut(&mut self) -> impl Iterator<Item = &mut ProductionRow> {
        let summary = self.summary_avg_energy_production.iter_mut().flat_map(|s| {
            [
                s.average_year.as_mut(),
                s.lowest_year.as_mut(),
                s.highest_year.as_mut(),
            ]
            .into_iter()
            .flatten()
        });
        let monthly = self
            .monthly_avg_energy_production
            .iter_mut()
            .flat_map(|m| m.rows.iter_mut().map(|(_, row)| row));
        let yearly = self
            .yearly_avg_energy_production
            .iter_mut()
            .flat_map(|y| y.rows.iter_mut().map(|r| &mut r.row));
        summary.chain(monthly).chain(yearly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMode {
    Floor,
    Round,
}

#[derive(Debug, Error, PartialEq)]
pub enum LossError {
    #[error("loss factor {0} is outside [0, 1]")]
    InvalidFactor(f64),
    #[error("production value {0} is not a non-negative number")]
    InvalidValue(f64),
}

/// `value * factor`, floored or rounded.
pub fn apply_loss(value: f64, factor: f64, mode: RoundingMode) -> f64 {
    let adjusted = value * factor;
    match mode {
        RoundingMode::Floor => adjusted.floor(),
        RoundingMode::Round => adjusted.round(),
    }
}

/// Adjusted copy of `production` with every kWh leaf derated by `factor`.
///
/// Wind speeds and unknown leaves pass through; absent sections stay absent.
/// If the walk fails, the original data is returned unchanged. Applying the
/// transform twice compounds the reduction.
pub fn apply_loss_to_production_data(
    production: &ProductionEstimate,
    factor: f64,
) -> ProductionEstimate {
    match try_apply_loss_to_production_data(production, factor) {
        Ok(adjusted) => adjusted,
        Err(e) => {
            warn!("loss adjustment skipped: {}", e);
            production.clone()
        }
    }
}

pub fn try_apply_loss_to_production_data(
    production: &ProductionEstimate,
    factor: f64,
) -> Result<ProductionEstimate, LossError> {
    if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
        return Err(LossError::InvalidFactor(factor));
    }
    let mut adjusted = production.clone();
    for row in adjusted.rows_mut() {
        if let Some(kwh) = row.kwh_produced {
            if !kwh.is_finite() || kwh < 0.0 {
                return Err(LossError::InvalidValue(kwh));
            }
            row.kwh_produced = Some(apply_loss(kwh, factor, RoundingMode::Floor));
        }
    }
    Ok(adjusted)
}
