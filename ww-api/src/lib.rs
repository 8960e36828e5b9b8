//! Talking to the WindWatts API.
//!
//! - `query`: typed requests derived from [`ww_core::settings::Settings`] and their cache keys
//! - `cache`: per-key request deduplication and memoization
//! - `hook`: per-view fetch state that ignores superseded responses
//! - `download`: nearest grid point lookup types and CSV file naming
//! - `client` (feature `api`): the reqwest-backed client

pub mod cache;
#[cfg(feature = "api")]
pub mod client;
pub mod download;
pub mod error;
pub mod hook;
pub mod query;

pub use cache::RequestCache;
#[cfg(feature = "api")]
pub use client::{ClientConfig, WindwattsClient};
pub use error::ApiError;
pub use hook::{FetchState, Query};
pub use query::{ProductionQuery, RequestKey, TimePeriod, WindspeedQuery};

use download::{GridLocation, GridQuery};
use ww_core::data_model::DataModel;
use ww_core::production::{ProductionEstimate, WindEstimate};

/// Operations offered by the remote API.
///
/// Implemented by the HTTP client; tests and commands can substitute fakes.
#[allow(async_fn_in_trait)]
pub trait WindApi {
    async fn windspeed(&self, query: &WindspeedQuery) -> Result<WindEstimate, ApiError>;

    async fn energy_production(
        &self,
        query: &ProductionQuery,
    ) -> Result<ProductionEstimate, ApiError>;

    async fn available_power_curves(&self, model: DataModel) -> Result<Vec<String>, ApiError>;

    async fn nearest_grid_location(&self, query: &GridQuery)
        -> Result<Vec<GridLocation>, ApiError>;

    async fn download_csv(
        &self,
        model: DataModel,
        location: &GridLocation,
    ) -> Result<Vec<u8>, ApiError>;
}
