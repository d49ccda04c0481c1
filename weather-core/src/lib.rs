//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Location resolution (device geolocation, IP fallback, city search)
//! - OpenWeatherMap fetching and HERE autocomplete suggestions
//! - Formatting of raw payloads into a render-ready view model
//! - Configuration & credentials handling
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod alert;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod forecast;
pub mod format;
pub mod location;
pub mod model;
pub mod suggest;

pub use alert::{Alert, GENERIC_ALERT, alert_text};
pub use config::{Config, ServiceId};
pub use dashboard::{Dashboard, Outcome};
pub use error::{GeolocationError, WeatherError};
pub use fetch::WeatherFetcher;
pub use location::{DeviceLocator, FixedLocator, LocationResolver, LocationSource};
pub use model::{
    Coordinates, CurrentView, ForecastView, LocationQuery, PlaceQuery, Temperature, WeatherView,
};
pub use suggest::{SuggestClient, should_fetch};
