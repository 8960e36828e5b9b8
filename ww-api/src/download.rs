//! Raw data download: nearest grid point lookup and the CSV export.

use crate::error::ApiError;
use crate::query::endpoint_url;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;
use ww_core::data_model::DataModel;
use ww_core::settings::LocationParams;

#[derive(Debug, Clone, PartialEq)]
pub struct GridQuery {
    pub model: DataModel,
    pub lat: f64,
    pub lng: f64,
    pub n_neighbors: u32,
}

impl GridQuery {
    pub fn new(model: DataModel, position: LocationParams) -> GridQuery {
        GridQuery {
            model,
            lat: position.lat,
            lng: position.lng,
            n_neighbors: 1,
        }
    }

    pub fn url(&self, base_url: &str) -> Result<Url, ApiError> {
        endpoint_url(
            base_url,
            self.model,
            "nearest-grid-location",
            &[
                ("lat", self.lat.to_string()),
                ("lng", self.lng.to_string()),
                ("n_neighbors", self.n_neighbors.to_string()),
            ],
        )
    }
}

/// A model grid cell center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLocation {
    #[serde(deserialize_with = "index_as_string")]
    pub index: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NearestGridResponse {
    #[serde(default)]
    pub locations: Vec<GridLocation>,
}

fn index_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "grid index must be a string or number, got {}",
            other
        ))),
    }
}

pub fn download_url(
    base_url: &str,
    model: DataModel,
    location: &GridLocation,
) -> Result<Url, ApiError> {
    endpoint_url(
        base_url,
        model,
        "download-csv",
        &[("gridIndex", location.index.clone())],
    )
}

/// `wind_data_{lat}_{lng}.csv` with three decimals.
pub fn csv_filename(location: &GridLocation) -> String {
    format!(
        "wind_data_{:.3}_{:.3}.csv",
        location.latitude, location.longitude
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_query_url() {
        let query = GridQuery::new(
            DataModel::Era5,
            LocationParams::new(39.7392, -104.9903).unwrap(),
        );
        assert_eq!(
            query.url("https://windwatts.example.org").unwrap().as_str(),
            "https://windwatts.example.org/api/era5/nearest-grid-location?lat=39.7392&lng=-104.9903&n_neighbors=1"
        );
    }

    #[test]
    fn parse_nearest_response_with_numeric_or_string_index() {
        let numeric: NearestGridResponse = serde_json::from_str(
            r#"{"locations":[{"index":31245,"latitude":39.75,"longitude":-105.0}]}"#,
        )
        .unwrap();
        assert_eq!(numeric.locations[0].index, "31245");

        let aliased: NearestGridResponse =
            serde_json::from_str(r#"{"locations":[{"index":"031245","lat":39.75,"lng":-105.0}]}"#)
                .unwrap();
        assert_eq!(aliased.locations[0].index, "031245");
        assert_eq!(aliased.locations[0].longitude, -105.0);

        let empty: NearestGridResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.locations.is_empty());
    }

    #[test]
    fn rejects_unusable_index() {
        let result: Result<GridLocation, _> =
            serde_json::from_str(r#"{"index":null,"latitude":1.0,"longitude":2.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn download_url_and_filename() {
        let location = GridLocation {
            index: "31245".to_string(),
            latitude: 39.7512,
            longitude: -104.99876,
        };
        assert_eq!(
            download_url("http://localhost:8000", DataModel::Wtk, &location)
                .unwrap()
                .as_str(),
            "http://localhost:8000/api/wtk/download-csv?gridIndex=31245"
        );
        assert_eq!(csv_filename(&location), "wind_data_39.751_-104.999.csv");
    }
}
