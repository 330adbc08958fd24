//! OpenWeather 2.5 client: the shared query path plus the two fetchers
//! that normalize raw payloads into domain records.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::model::{CurrentObservation, ForecastRecord, ForecastSeries, TemperatureUnit};

const API_BASE: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// In-band success sentinel, shared by both endpoints once the `cod`
/// field is read numerically.
const SUCCESS_COD: i64 = 200;

/// Client for the two OpenWeather endpoints the dashboard consumes.
///
/// Holds the API credential injected at construction; there is no
/// process-wide credential state. One outbound call per query, no retry,
/// no caching.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Result<Self, FetchError> {
        Self::with_base_url(api_key, API_BASE.to_string())
    }

    pub(crate) fn with_base_url(api_key: String, base_url: String) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key,
            http,
            base_url,
        })
    }

    /// Fetch the point-in-time observation for a location.
    pub async fn current(
        &self,
        location: &str,
        unit: TemperatureUnit,
    ) -> Result<CurrentObservation, FetchError> {
        let parsed: CurrentResponse = self.query("weather", location).await?;

        let condition = parsed.weather.first().ok_or_else(|| {
            FetchError::MalformedResponse(
                "current weather payload has an empty `weather` list".to_string(),
            )
        })?;

        Ok(CurrentObservation {
            location: location.to_string(),
            temperature: unit.from_celsius(parsed.main.temp),
            unit,
            humidity_pct: parsed.main.humidity,
            condition: condition.description.clone(),
            icon: condition.icon.clone(),
            observed_at: unix_to_utc(parsed.dt)?,
            latitude: parsed.coord.lat,
            longitude: parsed.coord.lon,
        })
    }

    /// Fetch the multi-day forecast for a location and normalize it into a
    /// uniform series. Entries arrive chronologically and their order is
    /// kept as-is, never re-sorted.
    pub async fn forecast(
        &self,
        location: &str,
        unit: TemperatureUnit,
    ) -> Result<ForecastSeries, FetchError> {
        let parsed: ForecastResponse = self.query("forecast", location).await?;

        let mut records = Vec::with_capacity(parsed.list.len());
        for entry in parsed.list {
            let condition = entry.weather.first().ok_or_else(|| {
                FetchError::MalformedResponse(
                    "forecast entry has an empty `weather` list".to_string(),
                )
            })?;

            records.push(ForecastRecord {
                location: location.to_string(),
                timestamp: unix_to_utc(entry.dt)?,
                temperature: unit.from_celsius(entry.main.temp),
                humidity_pct: entry.main.humidity,
                condition: condition.description.clone(),
                wind_speed_mps: entry.wind.speed,
                precip_prob_pct: entry.pop.unwrap_or(0.0) * 100.0,
            });
        }

        Ok(ForecastSeries::new(records))
    }

    /// Shared GET + decode path for both endpoints.
    ///
    /// Transport failures map to `Network`, a non-JSON body to
    /// `MalformedResponse`, an in-band failure sentinel to
    /// `InvalidLocation`, and a success envelope that fails typed
    /// deserialization to `MalformedResponse`.
    async fn query<T>(&self, endpoint: &str, location: &str) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        debug!(endpoint, location, "querying OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        // The API signals failure through the payload's own `cod` field,
        // not the transport status, so the body is decoded either way.
        let body = res.text().await?;

        let raw: Value = serde_json::from_str(&body).map_err(|e| {
            FetchError::MalformedResponse(format!("response body is not JSON: {e}"))
        })?;

        if in_band_cod(&raw) != Some(SUCCESS_COD) {
            let message = raw
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("API reported failure")
                .to_string();
            warn!(endpoint, location, %message, "OpenWeather reported in-band failure");
            return Err(FetchError::InvalidLocation {
                location: location.to_string(),
                message,
            });
        }

        serde_json::from_value(raw).map_err(|e| {
            FetchError::MalformedResponse(format!("unexpected `{endpoint}` payload: {e}"))
        })
    }
}

/// Read the in-band status. The current-weather endpoint serializes `cod`
/// as a number, the forecast endpoint (and error payloads from both) as a
/// string; either form is accepted and compared numerically. Absent or
/// unparseable values count as failure.
fn in_band_cod(raw: &Value) -> Option<i64> {
    match raw.get("cod")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct CoordBlock {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    dt: i64,
    main: MainBlock,
    weather: Vec<ConditionEntry>,
    coord: CoordBlock,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: MainBlock,
    weather: Vec<ConditionEntry>,
    wind: WindBlock,
    pop: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::MalformedResponse(format!("epoch timestamp {ts} is out of range")))
}
