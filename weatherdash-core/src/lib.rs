//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The OpenWeather fetch-and-normalize pipeline
//! - Shared domain records (observations, forecast series)
//!
//! It is used by `weatherdash-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod openweather;

pub use config::Config;
pub use dashboard::{CityWeather, DashboardSnapshot, fetch_city, refresh};
pub use error::FetchError;
pub use model::{
    CurrentObservation, DashboardRequest, ForecastRecord, ForecastSeries, ForecastSummary,
    TemperatureUnit,
};
pub use openweather::OpenWeatherClient;
