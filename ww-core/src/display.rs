//! Display-ready production tables.
//!
//! Production data is derated by the loss assumption first and converted to
//! the preferred units second; both the web cards and the command line
//! render from these rows.

use crate::production::{apply_loss_to_production_data, ProductionEstimate, ProductionRow};
use crate::settings::Settings;
use crate::units::{format_energy, format_windspeed};

/// One rendered table row.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub label: String,
    pub energy: String,
    pub windspeed: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionTables {
    pub summary: Vec<DisplayRow>,
    pub monthly: Vec<DisplayRow>,
    pub yearly: Vec<DisplayRow>,
}

fn display_row(label: String, row: &ProductionRow, settings: &Settings) -> DisplayRow {
    DisplayRow {
        label,
        energy: row
            .kwh_produced
            .map(|kwh| format_energy(kwh, settings.units.output))
            .unwrap_or_else(|| "-".to_string()),
        windspeed: row
            .average_wind_speed
            .map(|ms| format_windspeed(ms, settings.units.windspeed))
            .unwrap_or_else(|| "-".to_string()),
    }
}

/// Loss adjustment first, then unit conversion.
pub fn production_tables(estimate: &ProductionEstimate, settings: &Settings) -> ProductionTables {
    let adjusted = apply_loss_to_production_data(estimate, settings.loss_assumption_factor);
    let mut tables = ProductionTables::default();

    if let Some(summary) = &adjusted.summary_avg_energy_production {
        tables.summary = summary
            .rows()
            .map(|(label, row)| display_row(label.to_string(), row, settings))
            .collect();
    }
    if let Some(monthly) = &adjusted.monthly_avg_energy_production {
        tables.monthly = monthly
            .rows
            .iter()
            .map(|(month, row)| display_row(month.clone(), row, settings))
            .collect();
    }
    if let Some(yearly) = &adjusted.yearly_avg_energy_production {
        tables.yearly = yearly
            .rows
            .iter()
            .map(|r| display_row(r.year.to_string(), &r.row, settings))
            .collect();
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{OutputUnit, Units, WindspeedUnit};

    fn estimate() -> ProductionEstimate {
        serde_json::from_str(
            r#"{
                "summary_avg_energy_production": {
                    "Average year": {"kWh produced": 47187, "Average wind speed (m/s)": 5.2}
                },
                "monthly_avg_energy_production": {
                    "Jan": {"kWh produced": 5000},
                    "Feb": {"kWh produced": 4000}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn applies_loss_before_formatting() {
        let tables = production_tables(&estimate(), &Settings::default());
        assert_eq!(
            tables.summary,
            vec![DisplayRow {
                label: "Average year".to_string(),
                energy: "39,165 kWh".to_string(),
                windspeed: "5.20 m/s".to_string(),
            }]
        );
        assert_eq!(tables.monthly[0].label, "Jan");
        assert_eq!(tables.monthly[1].energy, "3,320 kWh");
        assert!(tables.yearly.is_empty());
    }

    #[test]
    fn converts_to_display_units() {
        let settings = Settings {
            loss_assumption_factor: 1.0,
            units: Units {
                windspeed: WindspeedUnit::Imperial,
                output: OutputUnit::MWh,
            },
            ..Settings::default()
        };
        let tables = production_tables(&estimate(), &settings);
        assert_eq!(tables.summary[0].energy, "47.19 MWh");
        assert_eq!(tables.summary[0].windspeed, "11.63 mph");
    }
}
