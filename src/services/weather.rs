use super::{endpoint, fetch_json, UpstreamError};
use crate::model::Coordinate;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_with::{serde_as, DefaultOnNull};
use std::fmt;
use thiserror::Error;
use url::Url;

const LABEL: &str = "weather";
const ONE_CALL_PATH: [&str; 3] = ["data", "3.0", "onecall"];
const EXCLUDED_PARTS: &str = "minutely,hourly,daily,alert";

/// Resolves a coordinate to current weather conditions.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn current_weather(&self, coordinate: Coordinate) -> Result<WeatherReading, WeatherError>;
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("supplied weather API url is not a base url to query: {0}")]
    NotABaseUrl(Url),

    #[error("{0}")]
    Upstream(#[from] UpstreamError),
}

/// Current conditions as reported by the one-call API. Only `current.temp` is required; any
/// other field may be missing or null.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct WeatherReading {
    #[serde(default)]
    pub lat: Option<f64>,

    #[serde(default)]
    pub lon: Option<f64>,

    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub timezone_offset: Option<i64>,

    pub current: CurrentConditions,
}

impl WeatherReading {
    pub const fn kelvin(&self) -> f64 {
        self.current.temp
    }
}

#[serde_as]
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    /// Temperature in Kelvin.
    pub temp: f64,

    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub dew_point: Option<f64>,
    #[serde(default)]
    pub uvi: Option<f64>,
    #[serde(default)]
    pub clouds: Option<f64>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub wind_deg: Option<f64>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub id: Option<f64>,
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Current weather from the OpenWeather one-call API.
#[derive(Clone)]
pub struct OpenWeatherApi {
    client: ClientWithMiddleware,
    base_url: Url,
    api_key: Secret<String>,
}

impl fmt::Debug for OpenWeatherApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherApi")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenWeatherApi {
    pub fn new(
        base_url: Url, api_key: Secret<String>, client: ClientWithMiddleware,
    ) -> Result<Self, WeatherError> {
        if base_url.cannot_be_a_base() {
            return Err(WeatherError::NotABaseUrl(base_url));
        }

        Ok(Self { client, base_url, api_key })
    }
}

#[async_trait]
impl WeatherApi for OpenWeatherApi {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn current_weather(&self, coordinate: Coordinate) -> Result<WeatherReading, WeatherError> {
        let url = endpoint(&self.base_url, &ONE_CALL_PATH);
        let query = [
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("exclude", EXCLUDED_PARTS.to_string()),
            ("appid", self.api_key.expose_secret().clone()),
        ];

        let reading = fetch_json(&self.client, LABEL, url, &query).await?;
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{quick_client, unreachable_url};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CAJOBI: &str = r#"{
        "lat": -20.8806,
        "lon": -48.8103,
        "timezone": "America/Sao_Paulo",
        "timezone_offset": -10800,
        "current": {
            "dt": 1684929490,
            "sunrise": 1684917669,
            "sunset": 1684957499,
            "temp": 297.8,
            "feels_like": 297.92,
            "pressure": 1014,
            "humidity": 67,
            "dew_point": 291.21,
            "uvi": 4.6,
            "clouds": 20,
            "visibility": 10000,
            "wind_speed": 3.13,
            "wind_deg": 110,
            "weather": [
                {"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}
            ]
        }
    }"#;

    fn api_for(server: &MockServer) -> OpenWeatherApi {
        OpenWeatherApi::new(
            Url::parse(&server.uri()).unwrap(),
            Secret::new("test-key".to_string()),
            quick_client(0),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_current_weather_queries_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .and(query_param("lat", "-20.8806453"))
            .and(query_param("lon", "-48.8103486"))
            .and(query_param("exclude", "minutely,hourly,daily,alert"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(CAJOBI))
            .expect(1)
            .mount(&server)
            .await;

        let reading = api_for(&server)
            .current_weather(Coordinate::new(-20.8806453, -48.8103486))
            .await
            .unwrap();

        assert_relative_eq!(reading.kelvin(), 297.8);
        assert_eq!(reading.timezone.as_deref(), Some("America/Sao_Paulo"));
        assert_eq!(reading.timezone_offset, Some(-10800));
        assert_eq!(reading.current.weather[0].description.as_deref(), Some("few clouds"));
    }

    #[tokio::test]
    async fn test_only_current_temp_is_required() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"current": {"temp": 280.5}}"#))
            .mount(&server)
            .await;

        let reading = api_for(&server).current_weather(Coordinate::default()).await.unwrap();
        assert_relative_eq!(reading.kelvin(), 280.5);
        assert!(reading.current.weather.is_empty());
    }

    #[tokio::test]
    async fn test_null_or_loosely_typed_metadata_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{
                    "lat": null,
                    "timezone": null,
                    "timezone_offset": null,
                    "current": {
                        "temp": 280.5,
                        "humidity": null,
                        "weather": [{"id": 801.0, "main": null, "description": "few clouds"}]
                    }
                }"#,
            ))
            .mount(&server)
            .await;

        let reading = api_for(&server).current_weather(Coordinate::default()).await.unwrap();
        assert_relative_eq!(reading.kelvin(), 280.5);
        assert_eq!(reading.timezone, None);
        assert_eq!(reading.current.weather[0].id, Some(801.0));
        assert_eq!(reading.current.weather[0].main, None);
    }

    #[tokio::test]
    async fn test_null_conditions_list_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"current": {"temp": 280.5, "weather": null}}"#),
            )
            .mount(&server)
            .await;

        let reading = api_for(&server).current_weather(Coordinate::default()).await.unwrap();
        assert!(reading.current.weather.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let api = OpenWeatherApi::new(
            unreachable_url(),
            Secret::new("super-secret-key".to_string()),
            quick_client(0),
        )
        .unwrap();

        let error = api.current_weather(Coordinate::default()).await.unwrap_err();
        let rendered = format!("{error} {error:?}");
        assert!(!rendered.contains("super-secret-key"), "{rendered}");
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal server error"))
            .mount(&server)
            .await;

        let error = api_for(&server).current_weather(Coordinate::default()).await.unwrap_err();
        match error {
            WeatherError::Upstream(UpstreamError::Status { status, body, .. }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "internal server error");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_xml_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<current><temperature value="297.8" unit="kelvin"/></current>"#),
            )
            .mount(&server)
            .await;

        let error = api_for(&server).current_weather(Coordinate::default()).await.unwrap_err();
        assert!(
            matches!(error, WeatherError::Upstream(UpstreamError::Decode { .. })),
            "{error:?}"
        );
    }

    #[tokio::test]
    async fn test_missing_current_temp_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"current": {"feels_like": 280.5}}"#))
            .mount(&server)
            .await;

        let error = api_for(&server).current_weather(Coordinate::default()).await.unwrap_err();
        assert!(
            matches!(error, WeatherError::Upstream(UpstreamError::Decode { .. })),
            "{error:?}"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let api = OpenWeatherApi::new(
            unreachable_url(),
            Secret::new("test-key".to_string()),
            quick_client(0),
        )
        .unwrap();

        let error = api.current_weather(Coordinate::default()).await.unwrap_err();
        match error {
            WeatherError::Upstream(upstream) => assert!(upstream.is_transport(), "{upstream:?}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
