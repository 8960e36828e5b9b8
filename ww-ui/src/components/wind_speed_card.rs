//! Mean wind speed at the selected hub height.

use super::{ErrorDisplay, LoadingSpinner, CARD_STYLE};
use crate::state::AppState;
use dioxus::prelude::*;
use ww_core::units::{format_windspeed, WindResource};

#[component]
pub fn WindSpeedCard() -> Element {
    let state = use_context::<AppState>();
    let windspeed = state.windspeed.read().clone();
    let settings = state.store.read().settings().clone();
    let unit = settings.units.windspeed;

    let body = if windspeed.is_loading {
        rsx! { LoadingSpinner { label: "Fetching wind speed..." } }
    } else if let Some(error) = &windspeed.error {
        rsx! { ErrorDisplay { message: error.user_message() } }
    } else if let Some(estimate) = &windspeed.data {
        let speed = format_windspeed(estimate.global_avg, unit);
        let resource = WindResource::classify(estimate.global_avg).label();
        rsx! {
            div {
                style: "font-size: 28px; font-weight: bold; color: #1565C0;",
                "{speed}"
            }
            div {
                style: "color: #555;",
                "{resource} wind resource ({settings.data_model.display_name()})"
            }
        }
    } else {
        rsx! {
            p { style: "color: #666;", "Select a location to see its wind resource." }
        }
    };

    rsx! {
        div {
            style: CARD_STYLE,
            h3 { style: "margin-top: 0;", "Wind speed at {settings.hub_height} m" }
            {body}
        }
    }
}
