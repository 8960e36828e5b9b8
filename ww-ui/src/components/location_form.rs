//! Latitude/longitude entry for the point of interest.

use crate::state::AppState;
use dioxus::prelude::*;
use ww_core::settings::LocationParams;

fn parse_location(lat: &str, lng: &str) -> Option<LocationParams> {
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    LocationParams::new(lat, lng)
}

#[component]
pub fn LocationForm() -> Element {
    let mut state = use_context::<AppState>();
    let current = state.store.read().current_position();

    let mut lat_input = use_signal(|| current.map(|p| p.lat.to_string()).unwrap_or_default());
    let mut lng_input = use_signal(|| current.map(|p| p.lng.to_string()).unwrap_or_default());
    let mut invalid = use_signal(|| false);

    let on_submit = move |evt: Event<FormData>| {
        evt.prevent_default();
        match parse_location(&lat_input(), &lng_input()) {
            Some(position) => {
                invalid.set(false);
                state.store.write().set_current_position(Some(position));
            }
            None => invalid.set(true),
        }
    };

    let on_clear = move |_: Event<MouseData>| {
        lat_input.set(String::new());
        lng_input.set(String::new());
        invalid.set(false);
        state.store.write().set_current_position(None);
    };

    rsx! {
        form {
            style: "margin: 8px 0; display: flex; gap: 12px; align-items: center; flex-wrap: wrap;",
            onsubmit: on_submit,
            label {
                style: "font-weight: bold;",
                "Latitude: "
                input {
                    r#type: "number",
                    step: "any",
                    value: "{lat_input}",
                    oninput: move |evt: Event<FormData>| lat_input.set(evt.value()),
                }
            }
            label {
                style: "font-weight: bold;",
                "Longitude: "
                input {
                    r#type: "number",
                    step: "any",
                    value: "{lng_input}",
                    oninput: move |evt: Event<FormData>| lng_input.set(evt.value()),
                }
            }
            button { r#type: "submit", "Analyze" }
            button { r#type: "button", onclick: on_clear, "Clear" }
        }
        if invalid() {
            div {
                style: "color: #C62828; margin-bottom: 8px;",
                "Enter a latitude between -90 and 90 and a longitude between -180 and 180."
            }
        }
        if let Some(position) = current {
            div {
                style: "color: #555; margin-bottom: 8px;",
                "Selected location: {position.format_coordinates()}"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_location;

    #[test]
    fn parses_trimmed_coordinates() {
        let position = parse_location(" 39.7392 ", "-104.9903").unwrap();
        assert_eq!(position.lat, 39.7392);
        assert_eq!(position.lng, -104.9903);
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        assert!(parse_location("", "-104.99").is_none());
        assert!(parse_location("north", "-104.99").is_none());
        assert!(parse_location("91", "0").is_none());
    }
}
