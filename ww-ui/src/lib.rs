//! Shared Dioxus components and browser bindings for the WindWatts app.
//!
//! This crate provides:
//! - `browser`: localStorage, `history.replaceState` and blob downloads
//! - `state`: reactive `AppState` and the shared `ApiContext`
//! - `hooks`: data-fetch hooks keyed by the current settings
//! - `components`: RSX components (location form, settings, result cards)

pub mod browser;
pub mod components;
pub mod hooks;
pub mod state;
