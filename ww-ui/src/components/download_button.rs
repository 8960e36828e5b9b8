//! Export of the raw time series for the nearest model grid point.

use super::ErrorDisplay;
use crate::browser::save_blob;
use crate::state::{ApiContext, AppState};
use dioxus::prelude::*;
use ww_api::download::{csv_filename, GridQuery};
use ww_api::{ApiError, WindApi, WindwattsClient};
use ww_core::data_model::DataModel;
use ww_core::settings::LocationParams;

/// Resolve the nearest grid point and fetch its CSV.
async fn fetch_csv(
    client: &WindwattsClient,
    model: DataModel,
    position: LocationParams,
) -> Result<(String, Vec<u8>), ApiError> {
    let locations = client
        .nearest_grid_location(&GridQuery::new(model, position))
        .await?;
    let nearest = locations
        .first()
        .ok_or_else(|| ApiError::Decode("no grid location near the selected point".to_string()))?;
    let bytes = client.download_csv(model, nearest).await?;
    Ok((csv_filename(nearest), bytes))
}

#[component]
pub fn DownloadButton() -> Element {
    let mut state = use_context::<AppState>();
    let api = use_context::<ApiContext>();
    let position = state.store.read().current_position();
    let model = state.store.read().data_model();

    let start_download = use_callback(move |_: ()| {
        let Some(position) = position else {
            return;
        };
        let client = match api.client.clone() {
            Ok(client) => client,
            Err(e) => {
                state.download_error.set(Some(e.user_message()));
                return;
            }
        };
        state.downloading.set(true);
        state.download_error.set(None);
        spawn(async move {
            match fetch_csv(&client, model, position).await {
                Ok((filename, bytes)) => {
                    log::info!("Saving {} ({} bytes)", filename, bytes.len());
                    if let Err(e) = save_blob(&bytes, &filename, "text/csv") {
                        log::error!("Failed to save {}: {}", filename, e);
                        state.download_error.set(Some(format!("Could not save the file: {}", e)));
                    }
                }
                Err(e) => {
                    log::warn!("CSV download failed: {}", e);
                    state.download_error.set(Some(e.user_message()));
                }
            }
            state.downloading.set(false);
        });
    });

    let downloading = (state.downloading)();
    let download_error = (state.download_error)();

    rsx! {
        div {
            style: "margin: 12px 0;",
            button {
                disabled: position.is_none() || downloading,
                onclick: move |_| start_download.call(()),
                if downloading { "Preparing download..." } else { "Download CSV" }
            }
            if let Some(message) = download_error {
                ErrorDisplay {
                    message,
                    on_retry: move |_| start_download.call(()),
                }
            }
        }
    }
}
