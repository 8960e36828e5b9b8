//! Data-fetch hooks keyed by the current settings.
//!
//! Each hook owns a [`Query`] whose state is mirrored into an `AppState`
//! signal. The effect re-runs whenever the settings change; requests are
//! only issued when the derived request key changes.

use dioxus::prelude::*;
use ww_api::hook::{fetch_production, fetch_windspeed};
use ww_api::{FetchState, Query, TimePeriod};

use crate::state::{ApiContext, AppState};

fn use_mirrored_query<T: Clone + 'static>(target: Signal<FetchState<T>>) -> Query<T> {
    use_hook(move || {
        let query = Query::new();
        query.subscribe(move |state: &FetchState<T>| {
            let mut target = target;
            target.set(state.clone());
        });
        query
    })
}

/// Keep `AppState::windspeed` in sync with the selected location and height.
pub fn use_windspeed_data() {
    let mut state = use_context::<AppState>();
    let api = use_context::<ApiContext>();
    let query = use_mirrored_query(state.windspeed);

    use_effect(move || {
        let settings = state.store.read().settings().clone();
        match api.client.clone() {
            Ok(client) => {
                let query = query.clone();
                let cache = api.windspeed.clone();
                spawn(async move {
                    fetch_windspeed(&query, &cache, &client, &settings).await;
                });
            }
            Err(e) => state.windspeed.set(FetchState::failed(e)),
        }
    });
}

/// Keep `AppState::production` in sync with location, height, curve and model.
pub fn use_production_data() {
    let mut state = use_context::<AppState>();
    let api = use_context::<ApiContext>();
    let query = use_mirrored_query(state.production);

    use_effect(move || {
        let settings = state.store.read().settings().clone();
        match api.client.clone() {
            Ok(client) => {
                let query = query.clone();
                let cache = api.production.clone();
                spawn(async move {
                    fetch_production(&query, &cache, &client, &settings, TimePeriod::All).await;
                });
            }
            Err(e) => state.production.set(FetchState::failed(e)),
        }
    });
}
