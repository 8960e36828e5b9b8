//! Core types and pure logic shared by the WindWatts crates.
//!
//! - `data_model` / `power_curve`: the catalogs the remote API understands
//! - `bounds`: per-model coverage rectangles and out-of-bounds messages
//! - `units`: display unit conversion and wind resource classes
//! - `settings` / `url_params`: the session settings and their query-string codec
//! - `production`: typed API payloads and the loss adjustment transform
//! - `display`: loss-adjusted, unit-converted production tables
//! - `store`: the storage- and URL-backed settings store

pub mod bounds;
pub mod data_model;
pub mod display;
pub mod power_curve;
pub mod production;
pub mod settings;
pub mod store;
pub mod units;
pub mod url_params;
