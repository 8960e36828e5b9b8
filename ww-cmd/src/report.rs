//! Share-URL report: windspeed and production fetched concurrently.
//!
//! Each panel renders on its own, so a failed production request still
//! prints the wind speed and vice versa.

use log::info;
use std::fmt::Write;
use ww_api::{ApiError, ProductionQuery, TimePeriod, WindApi, WindspeedQuery};
use ww_core::bounds::out_of_bounds_message;
use ww_core::display::{production_tables, DisplayRow, ProductionTables};
use ww_core::production::{ProductionEstimate, WindEstimate};
use ww_core::settings::Settings;
use ww_core::units::{format_windspeed, WindResource};
use ww_core::url_params::serialize_settings;

use crate::share::settings_from_share_url;

/// Why no request can be made for `settings`.
pub(crate) fn no_request_reason(settings: &Settings) -> String {
    match settings.current_position {
        Some(p) => out_of_bounds_message(p.lat, p.lng, settings.data_model.key()),
        None => "No location selected: provide lat and lng.".to_string(),
    }
}

fn write_rows(out: &mut String, title: &str, rows: &[DisplayRow]) {
    if rows.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "  {:<16}{:>18}{:>18}", "Period", "Energy", "Avg. wind speed");
    for row in rows {
        let _ = writeln!(out, "  {:<16}{:>18}{:>18}", row.label, row.energy, row.windspeed);
    }
}

pub fn render_tables(tables: &ProductionTables) -> String {
    let mut out = String::new();
    write_rows(&mut out, "Summary", &tables.summary);
    write_rows(&mut out, "Monthly averages", &tables.monthly);
    write_rows(&mut out, "By year", &tables.yearly);
    if out.is_empty() {
        out.push_str("  (no production data)\n");
    }
    out
}

pub fn render_report(
    settings: &Settings,
    windspeed: &Result<WindEstimate, ApiError>,
    production: &Result<ProductionEstimate, ApiError>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "WindWatts report");
    if let Some(position) = settings.current_position {
        let _ = writeln!(out, "Location: {}", position.format_coordinates());
    }
    let _ = writeln!(
        out,
        "Model: {}, hub height {} m, {}, {}% losses",
        settings.data_model.display_name(),
        settings.hub_height,
        settings.power_curve.display_name(),
        settings.loss_assumption_percent()
    );

    let _ = writeln!(out, "\nWind speed");
    match windspeed {
        Ok(estimate) => {
            let _ = writeln!(
                out,
                "  {} ({} wind resource)",
                format_windspeed(estimate.global_avg, settings.units.windspeed),
                WindResource::classify(estimate.global_avg).label()
            );
        }
        Err(e) => {
            let _ = writeln!(out, "  Error: {}", e.user_message());
        }
    }

    let _ = writeln!(out, "\nEnergy production");
    match production {
        Ok(estimate) => out.push_str(&render_tables(&production_tables(estimate, settings))),
        Err(e) => {
            let _ = writeln!(out, "  Error: {}", e.user_message());
        }
    }
    out
}

/// Resolve `share_url` and fetch both panels concurrently.
pub async fn build_report<A: WindApi>(api: &A, share_url: &str) -> anyhow::Result<String> {
    let settings = settings_from_share_url(share_url);
    if settings.current_position.is_none() {
        anyhow::bail!(no_request_reason(&settings));
    }
    let (Some(windspeed_query), Some(production_query)) = (
        WindspeedQuery::from_settings(&settings),
        ProductionQuery::from_settings(&settings, TimePeriod::All),
    ) else {
        return Ok(format!("{}\n", no_request_reason(&settings)));
    };

    info!("Building report for ?{}", serialize_settings(&settings));
    let (windspeed, production) = tokio::join!(
        api.windspeed(&windspeed_query),
        api.energy_production(&production_query)
    );
    Ok(render_report(&settings, &windspeed, &production))
}

pub async fn run_report<A: WindApi>(api: &A, share_url: &str) -> anyhow::Result<()> {
    print!("{}", build_report(api, share_url).await?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use ww_api::download::{GridLocation, GridQuery};
    use ww_core::data_model::DataModel;
    use ww_core::production::{ProductionRow, SummaryProduction};

    #[derive(Default)]
    struct FakeApi {
        calls: Cell<usize>,
        fail_production: bool,
    }

    impl WindApi for FakeApi {
        async fn windspeed(&self, _query: &WindspeedQuery) -> Result<WindEstimate, ApiError> {
            self.calls.set(self.calls.get() + 1);
            Ok(WindEstimate {
                global_avg: 6.5,
                breakdowns: Default::default(),
            })
        }

        async fn energy_production(
            &self,
            _query: &ProductionQuery,
        ) -> Result<ProductionEstimate, ApiError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_production {
                return Err(ApiError::Timeout);
            }
            Ok(average_year_estimate())
        }

        async fn available_power_curves(&self, _model: DataModel) -> Result<Vec<String>, ApiError> {
            Ok(vec![])
        }

        async fn nearest_grid_location(
            &self,
            _query: &GridQuery,
        ) -> Result<Vec<GridLocation>, ApiError> {
            Ok(vec![])
        }

        async fn download_csv(
            &self,
            _model: DataModel,
            _location: &GridLocation,
        ) -> Result<Vec<u8>, ApiError> {
            Ok(vec![])
        }
    }

    fn average_year_estimate() -> ProductionEstimate {
        ProductionEstimate {
            summary_avg_energy_production: Some(SummaryProduction {
                average_year: Some(ProductionRow {
                    kwh_produced: Some(47187.0),
                    ..ProductionRow::default()
                }),
                ..SummaryProduction::default()
            }),
            ..ProductionEstimate::default()
        }
    }

    #[tokio::test]
    async fn report_renders_both_panels() {
        let api = FakeApi::default();
        let report = build_report(&api, "?lat=39.7392&lng=-104.9903&hubHeight=40")
            .await
            .unwrap();
        assert_eq!(api.calls.get(), 2);
        assert!(report.contains("Location: 39.7392, -104.9903"));
        assert!(report.contains("6.50 m/s (High wind resource)"));
        assert!(report.contains("39,165 kWh"));
    }

    #[tokio::test]
    async fn failed_panel_does_not_hide_the_other() {
        let api = FakeApi {
            fail_production: true,
            ..FakeApi::default()
        };
        let report = build_report(&api, "lat=39.7392&lng=-104.9903").await.unwrap();
        assert!(report.contains("6.50 m/s"));
        assert!(report.contains("Error: The wind data service took too long to respond."));
    }

    #[tokio::test]
    async fn out_of_bounds_is_informational() {
        let api = FakeApi::default();
        let report = build_report(&api, "lat=51.5074&lng=-0.1278").await.unwrap();
        assert!(report.contains("outside the ERA5 data coverage area"));
        assert_eq!(api.calls.get(), 0);
    }

    #[tokio::test]
    async fn missing_location_is_an_error() {
        let api = FakeApi::default();
        assert!(build_report(&api, "hubHeight=80").await.is_err());
    }

    #[test]
    fn empty_tables_say_so() {
        assert_eq!(
            render_tables(&ProductionTables::default()),
            "  (no production data)\n"
        );
    }
}
