use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::NetworkError,
    model::{CurrentConditions, Place, UnitSystem},
};

use super::{ConditionsProvider, PlaceLookup};

pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Upper bound on candidates requested from the geocoder.
pub const RESULT_COUNT: &str = "10";
pub const LANGUAGE: &str = "en";

const GEOCODING: &str = "geocoding";
const FORECAST: &str = "forecast";

/// Keyless client for the Open-Meteo geocoding and forecast APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
}

impl OpenMeteoClient {
    pub fn with_client(http: Client, geocoding_url: String, forecast_url: String) -> Self {
        Self {
            http,
            geocoding_url,
            forecast_url,
        }
    }

    pub fn geocoding_url(&self) -> &str {
        &self.geocoding_url
    }

    pub fn forecast_url(&self) -> &str {
        &self.forecast_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, NetworkError> {
        debug!(service, url, ?query, "sending request");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| NetworkError::transport(service, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| NetworkError::transport(service, e))?;

        if !status.is_success() {
            return Err(NetworkError::status(service, status, &body));
        }

        serde_json::from_str(&body).map_err(|e| NetworkError::malformed(service, e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    results: Vec<GeoResult>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    #[serde(default)]
    country: String,
    country_code: Option<String>,
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
    feature_code: Option<String>,
}

impl From<GeoResult> for Place {
    fn from(raw: GeoResult) -> Self {
        Place {
            name: raw.name,
            country: raw.country,
            admin1: raw.admin1,
            country_code: raw.country_code,
            latitude: raw.latitude,
            longitude: raw.longitude,
            feature_code: raw.feature_code,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    timezone: String,
    current_weather: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    winddirection: f64,
    weathercode: i32,
    time: i64,
}

#[async_trait]
impl PlaceLookup for OpenMeteoClient {
    async fn search(&self, name: &str) -> Result<Vec<Place>, NetworkError> {
        let query = [
            ("name", name.to_string()),
            ("count", RESULT_COUNT.to_string()),
            ("language", LANGUAGE.to_string()),
            ("format", "json".to_string()),
        ];

        let parsed: GeoResponse = self.get_json(GEOCODING, &self.geocoding_url, &query).await?;

        Ok(parsed.results.into_iter().map(Place::from).collect())
    }
}

#[async_trait]
impl ConditionsProvider for OpenMeteoClient {
    async fn current(
        &self,
        place: &Place,
        units: UnitSystem,
    ) -> Result<CurrentConditions, NetworkError> {
        let query = [
            ("latitude", place.latitude.to_string()),
            ("longitude", place.longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("timezone", "auto".to_string()),
            ("timeformat", "unixtime".to_string()),
            ("temperature_unit", units.temperature_param().to_string()),
            ("windspeed_unit", units.windspeed_param().to_string()),
        ];

        let parsed: ForecastResponse = self.get_json(FORECAST, &self.forecast_url, &query).await?;
        let current = parsed.current_weather;

        let observed_at = unix_to_utc(current.time).ok_or_else(|| {
            NetworkError::malformed(FORECAST, format!("timestamp {} out of range", current.time))
        })?;

        Ok(CurrentConditions {
            temperature: current.temperature,
            wind_speed: current.windspeed,
            wind_direction: current.winddirection,
            weather_code: current.weathercode,
            observed_at,
            timezone: parsed.timezone,
            units,
        })
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        OpenMeteoClient::with_client(
            Client::new(),
            format!("{}/v1/search", server.uri()),
            format!("{}/v1/forecast", server.uri()),
        )
    }

    fn delhi() -> Place {
        Place {
            name: "Delhi".into(),
            country: "India".into(),
            admin1: Some("Delhi".into()),
            country_code: Some("IN".into()),
            latitude: 28.65195,
            longitude: 77.23149,
            feature_code: Some("PPLA".into()),
        }
    }

    #[tokio::test]
    async fn search_sends_expected_parameters_and_normalizes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Delhi"))
            .and(query_param("count", "10"))
            .and(query_param("language", "en"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {
                        "id": 1273294,
                        "name": "Delhi",
                        "latitude": 28.65195,
                        "longitude": 77.23149,
                        "feature_code": "PPLA",
                        "country_code": "IN",
                        "country": "India",
                        "admin1": "Delhi"
                    },
                    {
                        "name": "Delhi",
                        "latitude": 42.42,
                        "longitude": -74.91
                    }
                ],
                "generationtime_ms": 0.5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let places = client_for(&server).search("Delhi").await.unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0], delhi());
        assert_eq!(places[0].country_code.as_deref(), Some("IN"));
        assert_eq!(places[1].country, "");
        assert_eq!(places[1].admin1, None);
        assert_eq!(places[1].country_code, None);
        assert_eq!(places[1].feature_code, None);
    }

    #[tokio::test]
    async fn search_without_results_field_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "generationtime_ms": 0.3
            })))
            .mount(&server)
            .await;

        let places = client_for(&server).search("Xyzzy").await.unwrap();
        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn search_non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("Delhi").await.unwrap_err();
        assert!(matches!(err, NetworkError::Status { .. }));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn current_sends_unit_parameters_and_copies_values() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "28.65195"))
            .and(query_param("longitude", "77.23149"))
            .and(query_param("current_weather", "true"))
            .and(query_param("timezone", "auto"))
            .and(query_param("timeformat", "unixtime"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .and(query_param("windspeed_unit", "mph"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 28.625,
                "longitude": 77.25,
                "timezone": "Asia/Kolkata",
                "current_weather": {
                    "temperature": 88.3,
                    "windspeed": 6.2,
                    "winddirection": 290,
                    "weathercode": 2,
                    "time": 1_760_870_400
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let conditions = client_for(&server)
            .current(&delhi(), UnitSystem::Imperial)
            .await
            .unwrap();

        assert_eq!(conditions.temperature, 88.3);
        assert_eq!(conditions.wind_speed, 6.2);
        assert_eq!(conditions.wind_direction, 290.0);
        assert_eq!(conditions.weather_code, 2);
        assert_eq!(conditions.observed_at.timestamp(), 1_760_870_400);
        assert_eq!(conditions.timezone, "Asia/Kolkata");
        assert_eq!(conditions.units, UnitSystem::Imperial);
    }

    #[tokio::test]
    async fn current_without_nested_payload_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timezone": "Asia/Kolkata"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .current(&delhi(), UnitSystem::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Malformed { .. }));
    }

    #[tokio::test]
    async fn current_non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .current(&delhi(), UnitSystem::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Status { .. }));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Latitude must be in range"));
    }

    #[tokio::test]
    async fn current_with_unrepresentable_time_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timezone": "Asia/Kolkata",
                "current_weather": {
                    "temperature": 31.0,
                    "windspeed": 5.0,
                    "winddirection": 180.0,
                    "weathercode": 0,
                    "time": i64::MAX
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .current(&delhi(), UnitSystem::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::Malformed { .. }));
        assert!(err.to_string().contains("out of range"));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let client = OpenMeteoClient::with_client(
            Client::new(),
            "http://127.0.0.1:9/v1/search".into(),
            "http://127.0.0.1:9/v1/forecast".into(),
        );

        let err = client.search("Delhi").await.unwrap_err();
        assert!(matches!(err, NetworkError::Transport { .. }));
    }
}
