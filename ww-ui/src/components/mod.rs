//! Dioxus RSX components for the WindWatts app.

mod download_button;
mod error_display;
mod loading_spinner;
mod location_form;
mod out_of_bounds_notice;
mod production_card;
mod settings_panel;
mod wind_speed_card;

pub use download_button::DownloadButton;
pub use error_display::ErrorDisplay;
pub use loading_spinner::LoadingSpinner;
pub use location_form::LocationForm;
pub use out_of_bounds_notice::OutOfBoundsNotice;
pub use production_card::ProductionCard;
pub use settings_panel::SettingsPanel;
pub use wind_speed_card::WindSpeedCard;

/// Card frame shared by the result panels.
pub(crate) const CARD_STYLE: &str = "padding: 16px; margin: 12px 0; border: 1px solid #ddd; border-radius: 6px; background: #fff;";
