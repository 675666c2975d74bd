//! Core library for the `weatherboard` dashboard.
//!
//! This crate defines:
//! - The static country/city catalog
//! - Configuration & credentials handling
//! - The WeatherAPI.com fetcher and its error taxonomy
//! - Normalized weather records handed to the render surface
//!
//! It is used by `weatherboard-cli`, but can also back other front-ends.

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;

pub use catalog::{Location, cities_for, countries, country_of};
pub use config::{Config, Theme};
pub use error::FetchError;
pub use model::{AirQuality, CurrentConditions, ForecastDay, WeatherReport};
pub use provider::{WeatherProvider, provider_from_config, provider_from_key};
