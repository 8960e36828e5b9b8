//! WindWatts
//!
//! Pick a point, choose turbine settings and view wind speed and energy
//! production estimates from the WindWatts API.
//!
//! Data flow:
//! 1. On mount, settings are hydrated from the page URL and localStorage.
//! 2. The fetch hooks derive request keys from the settings and query the API.
//! 3. Production figures are derated by the loss assumption, then converted
//!    to the preferred display units.
//! 4. Every settings change is written back to localStorage and the URL.

use dioxus::prelude::*;
use ww_ui::components::{
    DownloadButton, LocationForm, OutOfBoundsNotice, ProductionCard, SettingsPanel, WindSpeedCard,
};
use ww_ui::hooks::{use_production_data, use_windspeed_data};
use ww_ui::state::{client_config, ApiContext, AppState};

fn main() {
    dioxus_logger::init(dioxus_logger::tracing::Level::INFO).expect("failed to init logger");
    dioxus::LaunchBuilder::new()
        .with_cfg(dioxus::web::Config::new().rootname("windwatts-root"))
        .launch(App);
}

#[component]
fn App() -> Element {
    let state = use_context_provider(AppState::new);
    use_context_provider(|| ApiContext::new(client_config()));

    use_windspeed_data();
    use_production_data();

    use_effect(move || {
        let store = state.store.read();
        let settings = store.settings();
        log::info!(
            "Settings: model={} height={} curve={} position={:?}",
            settings.data_model,
            settings.hub_height,
            settings.power_curve,
            settings.current_position.map(|p| p.format_coordinates())
        );
    });

    rsx! {
        div {
            style: "max-width: 960px; margin: 0 auto; padding: 16px; font-family: sans-serif;",
            h1 { style: "margin-bottom: 4px;", "WindWatts" }
            p {
                style: "color: #555; margin-top: 0;",
                "Wind resource and energy production estimates for distributed wind."
            }
            LocationForm {}
            OutOfBoundsNotice {}
            SettingsPanel {}
            WindSpeedCard {}
            ProductionCard {}
            DownloadButton {}
        }
    }
}
