//! Command implementations for the WindWatts CLI.
//!
//! Point lookups against the API, the share-URL report (windspeed and
//! production fetched concurrently), CSV export and share-URL normalization.

use clap::{Args, Subcommand};
use std::path::PathBuf;
use ww_api::{ClientConfig, TimePeriod, WindwattsClient};
use ww_core::data_model::{snap_hub_height, DataModel};
use ww_core::power_curve::PowerCurve;
use ww_core::settings::{percent_to_loss_factor, LocationParams, Settings, DEFAULT_HUB_HEIGHT};
use ww_core::units::{OutputUnit, WindspeedUnit};

pub mod download;
pub mod lookup;
pub mod report;
pub mod share;

/// A point and the model/height to evaluate it with.
#[derive(Args, Debug, Clone)]
pub struct PointArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Data model (era5 or wtk)
    #[arg(short, long, default_value_t = DataModel::Era5)]
    pub model: DataModel,

    /// Hub height in meters (snapped to the nearest height the model serves)
    #[arg(long, default_value_t = DEFAULT_HUB_HEIGHT)]
    pub height: u32,
}

impl PointArgs {
    pub fn position(&self) -> anyhow::Result<LocationParams> {
        LocationParams::new(self.lat, self.lng)
            .ok_or_else(|| anyhow::anyhow!("invalid coordinates ({}, {})", self.lat, self.lng))
    }

    /// Settings for this point on top of the defaults.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        Ok(Settings {
            current_position: Some(self.position()?),
            data_model: self.model,
            hub_height: snap_hub_height(self.height, self.model.hub_heights()),
            ..Settings::default()
        })
    }
}

fn parse_power_curve(s: &str) -> Result<PowerCurve, String> {
    PowerCurve::parse(s).ok_or_else(|| {
        let known: Vec<&str> = PowerCurve::all().map(|c| c.id()).collect();
        format!("unknown power curve {} (expected one of {})", s, known.join(", "))
    })
}

fn parse_time_period(s: &str) -> Result<TimePeriod, String> {
    [
        TimePeriod::All,
        TimePeriod::Summary,
        TimePeriod::Monthly,
        TimePeriod::Yearly,
    ]
    .into_iter()
    .find(|p| p.token() == s.trim().to_ascii_lowercase())
    .ok_or_else(|| format!("unknown time period {} (expected all, summary, monthly or yearly)", s))
}

fn parse_windspeed_unit(s: &str) -> Result<WindspeedUnit, String> {
    WindspeedUnit::from_token(s).ok_or_else(|| format!("unknown wind speed unit {}", s))
}

fn parse_output_unit(s: &str) -> Result<OutputUnit, String> {
    OutputUnit::from_token(s).ok_or_else(|| format!("unknown energy unit {}", s))
}

#[derive(Subcommand)]
pub enum Command {
    /// Mean wind speed at a point
    Windspeed {
        #[command(flatten)]
        point: PointArgs,

        /// Request the ensemble estimate (ERA5 only)
        #[arg(long)]
        ensemble: bool,

        /// Display unit (m/s or mph)
        #[arg(long, default_value = "m/s", value_parser = parse_windspeed_unit)]
        unit: WindspeedUnit,
    },

    /// Energy production estimate at a point
    Production {
        #[command(flatten)]
        point: PointArgs,

        /// Power curve identifier
        #[arg(
            short,
            long,
            default_value = "nrel-reference-100kW",
            value_parser = parse_power_curve
        )]
        power_curve: PowerCurve,

        /// Period breakdown to request (all, summary, monthly, yearly)
        #[arg(long, default_value = "all", value_parser = parse_time_period)]
        period: TimePeriod,

        /// Loss assumption in percent
        #[arg(long, default_value_t = 17.0)]
        loss: f64,

        /// Energy display unit (kWh or MWh)
        #[arg(long, default_value = "kWh", value_parser = parse_output_unit)]
        unit: OutputUnit,
    },

    /// List power curves available for a model
    PowerCurves {
        /// Data model (era5 or wtk)
        #[arg(short, long, default_value_t = DataModel::Era5)]
        model: DataModel,
    },

    /// Download the raw time series CSV for the grid point nearest to a location
    DownloadCsv {
        #[command(flatten)]
        point: PointArgs,

        /// Output path (defaults to wind_data_{lat}_{lng}.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Wind speed and production report for a share URL
    Report {
        /// Share URL or query string, e.g. "?lat=39.7392&lng=-104.9903&hubHeight=40"
        share_url: String,
    },

    /// Print the canonical share query for a share URL
    Url {
        /// Share URL or query string
        share_url: String,
    },
}

pub async fn run(command: Command, config: ClientConfig) -> anyhow::Result<()> {
    match command {
        Command::Windspeed {
            point,
            ensemble,
            unit,
        } => {
            let client = WindwattsClient::new(config)?;
            lookup::run_windspeed(&client, &point, ensemble, unit).await
        }
        Command::Production {
            point,
            power_curve,
            period,
            loss,
            unit,
        } => {
            let mut settings = point.settings()?;
            settings.power_curve = power_curve;
            settings.loss_assumption_factor = percent_to_loss_factor(loss);
            settings.units.output = unit;
            let client = WindwattsClient::new(config)?;
            lookup::run_production(&client, &settings, period).await
        }
        Command::PowerCurves { model } => {
            let client = WindwattsClient::new(config)?;
            lookup::run_power_curves(&client, model).await
        }
        Command::DownloadCsv { point, output } => {
            let client = WindwattsClient::new(config)?;
            download::run_download(&client, point.model, point.position()?, output).await
        }
        Command::Report { share_url } => {
            let client = WindwattsClient::new(config)?;
            report::run_report(&client, &share_url).await
        }
        Command::Url { share_url } => {
            println!("{}", share::canonical_query(&share_url));
            Ok(())
        }
    }
}
