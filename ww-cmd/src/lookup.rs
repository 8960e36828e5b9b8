//! Single-point lookups.

use log::info;
use ww_api::{ProductionQuery, TimePeriod, WindApi, WindspeedQuery};
use ww_core::data_model::DataModel;
use ww_core::display::production_tables;
use ww_core::settings::Settings;
use ww_core::units::{format_windspeed, WindResource, WindspeedUnit};

use crate::report::{no_request_reason, render_tables};
use crate::PointArgs;

pub async fn run_windspeed<A: WindApi>(
    api: &A,
    point: &PointArgs,
    ensemble: bool,
    unit: WindspeedUnit,
) -> anyhow::Result<()> {
    let settings = Settings {
        ensemble,
        ..point.settings()?
    };
    let Some(query) = WindspeedQuery::from_settings(&settings) else {
        anyhow::bail!(no_request_reason(&settings));
    };
    if ensemble && !query.ensemble {
        info!(
            "{} does not publish ensemble estimates; using the single-model value",
            point.model.display_name()
        );
    }

    let estimate = api.windspeed(&query).await?;
    println!(
        "{} at {} m: {} ({} wind resource)",
        settings
            .current_position
            .map(|p| p.format_coordinates())
            .unwrap_or_default(),
        query.height,
        format_windspeed(estimate.global_avg, unit),
        WindResource::classify(estimate.global_avg).label()
    );
    Ok(())
}

pub async fn run_production<A: WindApi>(
    api: &A,
    settings: &Settings,
    period: TimePeriod,
) -> anyhow::Result<()> {
    let Some(query) = ProductionQuery::from_settings(settings, period) else {
        anyhow::bail!(no_request_reason(settings));
    };

    let estimate = api.energy_production(&query).await?;
    print!("{}", render_tables(&production_tables(&estimate, settings)));
    Ok(())
}

pub async fn run_power_curves<A: WindApi>(api: &A, model: DataModel) -> anyhow::Result<()> {
    let curves = api.available_power_curves(model).await?;
    info!("{} power curves available for {}", curves.len(), model);
    for curve in curves {
        println!("{}", curve);
    }
    Ok(())
}
