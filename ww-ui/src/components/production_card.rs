//! Energy production estimate, derated by the loss assumption.

use super::{ErrorDisplay, LoadingSpinner, CARD_STYLE};
use crate::state::AppState;
use dioxus::prelude::*;
use ww_core::display::{production_tables, DisplayRow};

#[component]
fn ProductionTable(title: String, rows: Vec<DisplayRow>) -> Element {
    if rows.is_empty() {
        return rsx! {};
    }
    rsx! {
        h4 { style: "margin-bottom: 4px;", "{title}" }
        table {
            style: "border-collapse: collapse; width: 100%;",
            thead {
                tr {
                    th { style: "text-align: left;", "Period" }
                    th { style: "text-align: right;", "Energy" }
                    th { style: "text-align: right;", "Avg. wind speed" }
                }
            }
            tbody {
                for row in rows.iter() {
                    tr {
                        td { "{row.label}" }
                        td { style: "text-align: right;", "{row.energy}" }
                        td { style: "text-align: right;", "{row.windspeed}" }
                    }
                }
            }
        }
    }
}

#[component]
pub fn ProductionCard() -> Element {
    let state = use_context::<AppState>();
    let production = state.production.read().clone();
    let settings = state.store.read().settings().clone();

    let body = if production.is_loading {
        rsx! { LoadingSpinner { label: "Fetching production estimate..." } }
    } else if let Some(error) = &production.error {
        rsx! { ErrorDisplay { message: error.user_message() } }
    } else if let Some(estimate) = &production.data {
        let tables = production_tables(estimate, &settings);
        rsx! {
            p {
                style: "color: #555; margin: 0;",
                "{settings.power_curve.display_name()}, {settings.loss_assumption_percent()}% losses"
            }
            ProductionTable { title: "Summary", rows: tables.summary }
            ProductionTable { title: "Monthly averages", rows: tables.monthly }
            ProductionTable { title: "By year", rows: tables.yearly }
        }
    } else {
        rsx! {
            p { style: "color: #666;", "Select a location to estimate energy production." }
        }
    };

    rsx! {
        div {
            style: CARD_STYLE,
            h3 { style: "margin-top: 0;", "Energy production" }
            {body}
        }
    }
}
