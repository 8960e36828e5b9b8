use crate::download::{download_url, GridLocation, GridQuery, NearestGridResponse};
use crate::error::ApiError;
use crate::query::{power_curves_url, ProductionQuery, WindspeedQuery};
use crate::WindApi;
use log::{info, warn};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;
use ww_core::data_model::DataModel;
use ww_core::production::{ProductionEstimate, WindEstimate};

pub const DEFAULT_BASE_URL: &str = "https://windwatts.nrel.gov";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Scheme and host, without the `/api` prefix.
    pub base_url: String,
    /// Applied to every request, wasm32 included.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PowerCurvesResponse {
    available_power_curves: Vec<String>,
}

/// reqwest-backed [`WindApi`].
#[derive(Debug, Clone)]
pub struct WindwattsClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl WindwattsClient {
    pub fn new(config: ClientConfig) -> Result<WindwattsClient, ApiError> {
        Url::parse(&config.base_url)?;
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(WindwattsClient {
            client,
            base_url: config.base_url,
            timeout: config.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request(&self, url: Url) -> RequestBuilder {
        self.client.get(url).timeout(self.timeout)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, ApiError> {
        info!("GET {}", url);
        let response = self.request(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Bad response status for {}: {}", url, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.get(url).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl WindApi for WindwattsClient {
    async fn windspeed(&self, query: &WindspeedQuery) -> Result<WindEstimate, ApiError> {
        self.get_json(query.url(&self.base_url)?).await
    }

    async fn energy_production(
        &self,
        query: &ProductionQuery,
    ) -> Result<ProductionEstimate, ApiError> {
        self.get_json(query.url(&self.base_url)?).await
    }

    async fn available_power_curves(&self, model: DataModel) -> Result<Vec<String>, ApiError> {
        let response: PowerCurvesResponse =
            self.get_json(power_curves_url(&self.base_url, model)?).await?;
        Ok(response.available_power_curves)
    }

    async fn nearest_grid_location(
        &self,
        query: &GridQuery,
    ) -> Result<Vec<GridLocation>, ApiError> {
        let response: NearestGridResponse = self.get_json(query.url(&self.base_url)?).await?;
        Ok(response.locations)
    }

    async fn download_csv(
        &self,
        model: DataModel,
        location: &GridLocation,
    ) -> Result<Vec<u8>, ApiError> {
        let response = self.get(download_url(&self.base_url, model, location)?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
