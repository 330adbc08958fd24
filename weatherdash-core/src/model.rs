use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Presentation unit for temperatures.
///
/// Everything upstream of record construction works in Celsius; the
/// conversion to the requested unit happens exactly once, when a record is
/// built. A single render cycle never mixes unit systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Rescale a Celsius temperature into this unit.
    pub fn from_celsius(self, temp_c: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => temp_c,
            TemperatureUnit::Fahrenheit => temp_c * 9.0 / 5.0 + 32.0,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: celsius, fahrenheit."
            )),
        }
    }
}

/// What the display layer asks the pipeline for on each render cycle.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    /// Place name, optionally qualified ("London,GB", "Bhubaneswar,OD,IN").
    pub location: String,
    pub unit: TemperatureUnit,
    /// Second location for comparison views, if enabled.
    pub compare: Option<String>,
}

/// Point-in-time weather for one location. Immutable once constructed;
/// lives for a single render cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentObservation {
    pub location: String,
    /// Temperature in `unit`, already converted.
    pub temperature: f64,
    pub unit: TemperatureUnit,
    pub humidity_pct: u8,
    pub condition: String,
    /// Opaque icon id resolved against the OpenWeather CDN.
    pub icon: String,
    pub observed_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CurrentObservation {
    /// CDN URL of the condition icon, sized for display.
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// One fixed-width interval within a multi-day forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub location: String,
    pub timestamp: DateTime<Utc>,
    /// Temperature in the unit the series was fetched with.
    pub temperature: f64,
    pub humidity_pct: u8,
    pub condition: String,
    pub wind_speed_mps: f64,
    /// Probability of precipitation, 0–100.
    pub precip_prob_pct: f64,
}

/// Chronologically ordered forecast records. For a single location the
/// timestamps are strictly increasing; combined series interleave
/// locations and keep each source's order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub records: Vec<ForecastRecord>,
}

impl ForecastSeries {
    pub fn new(records: Vec<ForecastRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Concatenate several series for comparison views. Per-series order is
    /// kept; each record keeps its originating location as the
    /// discriminating field.
    pub fn combine(series: impl IntoIterator<Item = ForecastSeries>) -> Self {
        let records = series.into_iter().flat_map(|s| s.records).collect();
        Self { records }
    }

    /// Aggregate insights over the series. `None` for an empty series.
    pub fn summary(&self) -> Option<ForecastSummary> {
        if self.records.is_empty() {
            return None;
        }

        let n = self.records.len() as f64;
        let mut sum_temp = 0.0;
        let mut max_temp = f64::MIN;
        let mut min_temp = f64::MAX;
        let mut sum_wind = 0.0;
        let mut rainy_periods = 0;

        for record in &self.records {
            sum_temp += record.temperature;
            max_temp = max_temp.max(record.temperature);
            min_temp = min_temp.min(record.temperature);
            sum_wind += record.wind_speed_mps;
            if record.precip_prob_pct > 50.0 {
                rainy_periods += 1;
            }
        }

        Some(ForecastSummary {
            avg_temperature: sum_temp / n,
            max_temperature: max_temp,
            min_temperature: min_temp,
            avg_wind_speed_mps: sum_wind / n,
            rainy_periods,
        })
    }
}

/// Headline numbers for one location's forecast horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub avg_temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub avg_wind_speed_mps: f64,
    /// Intervals with precipitation probability above 50%.
    pub rainy_periods: usize,
}
