//! Informational notice for points outside the active model's coverage.

use crate::state::AppState;
use dioxus::prelude::*;
use ww_core::bounds::{is_out_of_bounds, out_of_bounds_message};

#[component]
pub fn OutOfBoundsNotice() -> Element {
    let state = use_context::<AppState>();
    let store = state.store.read();
    let model = store.data_model();

    let Some(position) = store.current_position() else {
        return rsx! {};
    };
    if !is_out_of_bounds(position.lat, position.lng, model.key()) {
        return rsx! {};
    }
    let message = out_of_bounds_message(position.lat, position.lng, model.key());

    rsx! {
        div {
            style: "padding: 12px 16px; margin: 8px 0; background: #FFF8E1; color: #6D4C00; border-radius: 4px; border: 1px solid #FFE082;",
            "{message}"
        }
    }
}
