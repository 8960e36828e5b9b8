//! Turbine, model, loss and unit settings.
//!
//! Every control writes straight through the settings store, which persists
//! the snapshot and rewrites the share URL.

use crate::state::AppState;
use dioxus::prelude::*;
use ww_core::data_model::DataModel;
use ww_core::power_curve::PowerCurve;
use ww_core::units::{OutputUnit, WindspeedUnit};

const ROW_STYLE: &str = "margin: 8px 0; display: flex; gap: 8px; align-items: center;";
const LABEL_STYLE: &str = "font-weight: bold; min-width: 160px;";

#[component]
pub fn SettingsPanel() -> Element {
    let mut state = use_context::<AppState>();
    let settings = state.store.read().settings().clone();
    let model = settings.data_model;
    let loss_percent = settings.loss_assumption_percent();

    let on_model_change = move |evt: Event<FormData>| match DataModel::from_token(&evt.value()) {
        Some(model) => state.store.write().set_data_model(model),
        None => log::warn!("Unknown data model {}", evt.value()),
    };

    let on_height_change = move |evt: Event<FormData>| {
        if let Ok(height) = evt.value().parse::<u32>() {
            state.store.write().set_hub_height(height);
        }
    };

    let on_curve_change = move |evt: Event<FormData>| {
        if let Some(curve) = PowerCurve::parse(&evt.value()) {
            state.store.write().set_power_curve(curve);
        }
    };

    let on_ensemble_change = move |evt: Event<FormData>| {
        state.store.write().set_ensemble(evt.checked());
    };

    let on_loss_change = move |evt: Event<FormData>| {
        if let Ok(percent) = evt.value().trim().parse::<f64>() {
            state.store.write().set_loss_assumption_percent(percent);
        }
    };

    let on_windspeed_unit_change = move |evt: Event<FormData>| {
        if let Some(unit) = WindspeedUnit::from_token(&evt.value()) {
            state.store.write().set_windspeed_unit(unit);
        }
    };

    let on_output_unit_change = move |evt: Event<FormData>| {
        if let Some(unit) = OutputUnit::from_token(&evt.value()) {
            state.store.write().set_output_unit(unit);
        }
    };

    rsx! {
        fieldset {
            style: "margin: 12px 0; padding: 12px 16px; border: 1px solid #ddd; border-radius: 6px;",
            legend { "Settings" }

            div {
                style: ROW_STYLE,
                label { r#for: "data-model-select", style: LABEL_STYLE, "Data model: " }
                select {
                    id: "data-model-select",
                    onchange: on_model_change,
                    for candidate in DataModel::ALL {
                        option {
                            value: "{candidate.key()}",
                            selected: candidate == model,
                            "{candidate.display_name()}"
                        }
                    }
                }
            }

            div {
                style: ROW_STYLE,
                label { r#for: "hub-height-select", style: LABEL_STYLE, "Hub height: " }
                select {
                    id: "hub-height-select",
                    onchange: on_height_change,
                    for height in model.hub_heights().iter().copied() {
                        option {
                            value: "{height}",
                            selected: height == settings.hub_height,
                            "{height} m"
                        }
                    }
                }
            }

            div {
                style: ROW_STYLE,
                label { r#for: "power-curve-select", style: LABEL_STYLE, "Power curve: " }
                select {
                    id: "power-curve-select",
                    onchange: on_curve_change,
                    for curve in PowerCurve::all() {
                        option {
                            value: "{curve.id()}",
                            selected: curve == settings.power_curve,
                            "{curve.display_name()}"
                        }
                    }
                }
            }

            div {
                style: ROW_STYLE,
                label { r#for: "ensemble-toggle", style: LABEL_STYLE, "Ensemble: " }
                input {
                    id: "ensemble-toggle",
                    r#type: "checkbox",
                    checked: settings.ensemble && model.supports_ensemble(),
                    disabled: !model.supports_ensemble(),
                    onchange: on_ensemble_change,
                }
            }

            div {
                style: ROW_STYLE,
                label { r#for: "loss-input", style: LABEL_STYLE, "Losses (%): " }
                input {
                    id: "loss-input",
                    r#type: "number",
                    min: "0",
                    max: "100",
                    step: "1",
                    value: "{loss_percent}",
                    onchange: on_loss_change,
                }
            }

            div {
                style: ROW_STYLE,
                label { r#for: "windspeed-unit-select", style: LABEL_STYLE, "Wind speed unit: " }
                select {
                    id: "windspeed-unit-select",
                    onchange: on_windspeed_unit_change,
                    for unit in [WindspeedUnit::Metric, WindspeedUnit::Imperial] {
                        option {
                            value: "{unit.token()}",
                            selected: unit == settings.units.windspeed,
                            "{unit.token()}"
                        }
                    }
                }
            }

            div {
                style: ROW_STYLE,
                label { r#for: "output-unit-select", style: LABEL_STYLE, "Energy unit: " }
                select {
                    id: "output-unit-select",
                    onchange: on_output_unit_change,
                    for unit in [OutputUnit::KWh, OutputUnit::MWh] {
                        option {
                            value: "{unit.token()}",
                            selected: unit == settings.units.output,
                            "{unit.token()}"
                        }
                    }
                }
            }
        }
    }
}
