//! Per-cycle orchestration: fetch everything a render needs, or fail the
//! whole cycle.

use tracing::debug;

use crate::error::FetchError;
use crate::model::{CurrentObservation, DashboardRequest, ForecastSeries, TemperatureUnit};
use crate::openweather::OpenWeatherClient;

/// Both views for one location, fetched within the same cycle and sharing
/// one unit system.
#[derive(Debug, Clone)]
pub struct CityWeather {
    pub current: CurrentObservation,
    pub forecast: ForecastSeries,
}

/// Everything a single render consumes. `combined` concatenates the
/// forecast series of both locations in comparison mode, or mirrors the
/// primary series otherwise.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub primary: CityWeather,
    pub comparison: Option<CityWeather>,
    pub combined: ForecastSeries,
}

/// Fetch current weather and forecast for one location. The two requests
/// are independent and run concurrently; the render needs both, so either
/// failure fails the pair.
pub async fn fetch_city(
    client: &OpenWeatherClient,
    location: &str,
    unit: TemperatureUnit,
) -> Result<CityWeather, FetchError> {
    let (current, forecast) = tokio::join!(
        client.current(location, unit),
        client.forecast(location, unit),
    );

    Ok(CityWeather {
        current: current?,
        forecast: forecast?,
    })
}

/// Run one full render cycle. Any failed fetch aborts the cycle; partial
/// results are never handed to the display layer.
pub async fn refresh(
    client: &OpenWeatherClient,
    request: &DashboardRequest,
) -> Result<DashboardSnapshot, FetchError> {
    debug!(location = %request.location, compare = ?request.compare, "starting render cycle");

    let location = non_empty(&request.location)?;
    let primary = fetch_city(client, location, request.unit).await?;

    let comparison = match request.compare.as_deref() {
        Some(second) => {
            let second = non_empty(second)?;
            Some(fetch_city(client, second, request.unit).await?)
        }
        None => None,
    };

    let combined = match &comparison {
        Some(second) => {
            ForecastSeries::combine([primary.forecast.clone(), second.forecast.clone()])
        }
        None => primary.forecast.clone(),
    };

    Ok(DashboardSnapshot {
        primary,
        comparison,
        combined,
    })
}

/// Locations carry no schema beyond being non-empty text; reject blank
/// input before it turns into a network call.
fn non_empty(location: &str) -> Result<&str, FetchError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidLocation {
            location: location.to_string(),
            message: "location must be non-empty".to_string(),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenWeatherClient {
        OpenWeatherClient::with_base_url("test-key".to_string(), server.uri())
            .expect("client builds")
    }

    fn current_body(lat: f64, lon: f64) -> serde_json::Value {
        json!({
            "cod": 200,
            "dt": 1_700_000_000_i64,
            "main": { "temp": 18.0, "humidity": 62 },
            "weather": [{ "description": "broken clouds", "icon": "04d" }],
            "coord": { "lat": lat, "lon": lon }
        })
    }

    fn forecast_body(entries: usize) -> serde_json::Value {
        let list: Vec<serde_json::Value> = (0..entries)
            .map(|i| {
                json!({
                    "dt": 1_700_000_000_i64 + (i as i64) * 10_800,
                    "main": { "temp": 14.0, "humidity": 58 },
                    "weather": [{ "description": "few clouds", "icon": "02d" }],
                    "wind": { "speed": 2.4 },
                    "pop": 0.1
                })
            })
            .collect();
        json!({ "cod": "200", "list": list })
    }

    async fn mount_city(server: &MockServer, city: &str, entries: usize) {
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", city))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(51.5, -0.1)))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("q", city))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(entries)))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn refresh_returns_single_city_snapshot() {
        let server = MockServer::start().await;
        mount_city(&server, "London,GB", 4).await;

        let request = DashboardRequest {
            location: "London,GB".to_string(),
            unit: TemperatureUnit::Celsius,
            compare: None,
        };

        let snapshot = refresh(&client_for(&server), &request).await.unwrap();

        assert_eq!(snapshot.primary.current.location, "London,GB");
        assert_eq!(snapshot.primary.forecast.len(), 4);
        assert!(snapshot.comparison.is_none());
        assert_eq!(snapshot.combined.len(), 4);
    }

    #[tokio::test]
    async fn refresh_combines_comparison_series() {
        let server = MockServer::start().await;
        mount_city(&server, "London,GB", 3).await;
        mount_city(&server, "Delhi,IN", 5).await;

        let request = DashboardRequest {
            location: "London,GB".to_string(),
            unit: TemperatureUnit::Celsius,
            compare: Some("Delhi,IN".to_string()),
        };

        let snapshot = refresh(&client_for(&server), &request).await.unwrap();

        assert_eq!(snapshot.combined.len(), 8);
        let from_london = snapshot
            .combined
            .records
            .iter()
            .filter(|r| r.location == "London,GB")
            .count();
        let from_delhi = snapshot
            .combined
            .records
            .iter()
            .filter(|r| r.location == "Delhi,IN")
            .count();
        assert_eq!(from_london, 3);
        assert_eq!(from_delhi, 5);
    }

    #[tokio::test]
    async fn refresh_aborts_when_forecast_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_body(51.5, -0.1)))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&server)
            .await;

        let request = DashboardRequest {
            location: "London,GB".to_string(),
            unit: TemperatureUnit::Celsius,
            compare: None,
        };

        let err = refresh(&client_for(&server), &request).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidLocation { .. }));
    }

    #[tokio::test]
    async fn refresh_aborts_when_comparison_city_fails() {
        let server = MockServer::start().await;
        mount_city(&server, "London,GB", 3).await;

        Mock::given(method("GET"))
            .and(query_param("q", "Atlantis"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&server)
            .await;

        let request = DashboardRequest {
            location: "London,GB".to_string(),
            unit: TemperatureUnit::Celsius,
            compare: Some("Atlantis".to_string()),
        };

        let err = refresh(&client_for(&server), &request).await.unwrap_err();
        match err {
            FetchError::InvalidLocation { location, .. } => assert_eq!(location, "Atlantis"),
            other => panic!("expected InvalidLocation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_location_is_rejected_without_a_request() {
        // Nothing mounted: a network call would fail loudly anyway, but the
        // rejection happens before dispatch.
        let client = OpenWeatherClient::with_base_url(
            "test-key".to_string(),
            "http://127.0.0.1:9".to_string(),
        )
        .expect("client builds");

        let request = DashboardRequest {
            location: "   ".to_string(),
            unit: TemperatureUnit::Celsius,
            compare: None,
        };

        let err = refresh(&client, &request).await.unwrap_err();
        match err {
            FetchError::InvalidLocation { message, .. } => {
                assert!(message.contains("non-empty"));
            }
            other => panic!("expected InvalidLocation, got {other:?}"),
        }
    }
}
