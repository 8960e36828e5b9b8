//! Share URL resolution.
//!
//! Resolves a share URL exactly like the web app does on load: URL
//! parameters over defaults, then the hub height snapped to the model.

use ww_core::settings::Settings;
use ww_core::store::{MemoryStorage, MemoryUrl, SettingsStore};
use ww_core::url_params::serialize_settings;

pub fn settings_from_share_url(share_url: &str) -> Settings {
    let store = SettingsStore::hydrate(MemoryStorage::default(), MemoryUrl::new(share_url));
    store.settings().clone()
}

/// Query string with invalid values dropped and defaults omitted.
pub fn canonical_query(share_url: &str) -> String {
    serialize_settings(&settings_from_share_url(share_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ww_core::data_model::DataModel;

    #[test]
    fn defaults_are_dropped() {
        assert_eq!(
            canonical_query("?lat=39.7392&lng=-104.9903&hubHeight=40"),
            "lat=39.7392&lng=-104.9903"
        );
    }

    #[test]
    fn full_urls_and_invalid_values() {
        let query = canonical_query(
            "https://windwatts.nrel.gov/?lat=39.73921&lng=-104.99034&hubHeight=abc&dataModel=wtk&lossAssumption=10#map",
        );
        assert_eq!(query, "lat=39.7392&lng=-104.9903&dataModel=wtk&lossAssumption=10");
    }

    #[test]
    fn hub_height_is_snapped_to_the_model() {
        let settings = settings_from_share_url("lat=40&lng=-105&hubHeight=45");
        assert_eq!(settings.data_model, DataModel::Era5);
        assert_eq!(settings.hub_height, 40);
    }
}
