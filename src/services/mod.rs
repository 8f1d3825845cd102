pub mod geolocation;
pub mod temperature;
pub mod weather;

pub use geolocation::{
    CityTableGeolocation, GeolocationApi, GeolocationError, GeolocationServices,
    OpenWeatherGeolocation,
};
pub use temperature::{TemperatureApi, TemperatureApiRef, TemperatureError, TemperatureService};
pub use weather::{OpenWeatherApi, WeatherApi, WeatherError, WeatherReading};

use crate::settings::HttpClientSettings;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{label} API call failed: {source}")]
    HttpRequest {
        label: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("error occurred in HTTP middleware calling {label} API: {source}")]
    HttpMiddleware {
        label: &'static str,
        #[source]
        source: reqwest_middleware::Error,
    },

    #[error("{label} API responded with {status}: {body}")]
    Status {
        label: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode {label} API response: {source}")]
    Decode {
        label: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamError {
    /// True when the upstream could not be reached at all.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::HttpRequest { .. } | Self::HttpMiddleware { .. })
    }
}

/// Builds the single outbound client shared by every provider. Transient failures are retried
/// with exponential backoff by the middleware, so providers never retry on their own.
pub fn make_http_client(
    settings: &HttpClientSettings,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(user_agent) = HeaderValue::from_str(&settings.user_agent) {
        headers.insert(USER_AGENT, user_agent);
    } else {
        tracing::warn!(user_agent=%settings.user_agent, "invalid User-Agent setting -- omitted");
    }

    let client = reqwest::Client::builder()
        .timeout(settings.timeout)
        .pool_idle_timeout(settings.pool_idle_timeout)
        .pool_max_idle_per_host(settings.pool_max_idle_per_host)
        .default_headers(headers)
        .build()?;

    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(settings.min_retry_backoff, settings.max_retry_backoff)
        .build_with_max_retries(settings.max_retries);

    Ok(reqwest_middleware::ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Appends `segments` to the base url's path.
pub(crate) fn endpoint(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Issues a GET and decodes a successful JSON body into `T`.
///
/// The query is passed separately from `url` so that credentials never show up in logged urls.
#[tracing::instrument(level = "debug", skip(client, query))]
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &ClientWithMiddleware, label: &'static str, url: Url, query: &[(&str, String)],
) -> Result<T, UpstreamError> {
    let response = client
        .get(url.clone())
        .query(query)
        .send()
        .await
        .map_err(|source| UpstreamError::HttpMiddleware { label, source: without_url(source) })?;
    log_response(label, &url, &response);

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| UpstreamError::HttpRequest { label, source: source.without_url() })?;
    tracing::debug!(%body, ?status, %url, "{label} response body");

    if !status.is_success() {
        return Err(UpstreamError::Status { label, status, body });
    }

    serde_json::from_str(&body).map_err(|source| UpstreamError::Decode { label, source })
}

/// Request urls carry API keys in their query, so they are stripped from transport errors.
fn without_url(error: reqwest_middleware::Error) -> reqwest_middleware::Error {
    match error {
        reqwest_middleware::Error::Reqwest(error) => {
            reqwest_middleware::Error::Reqwest(error.without_url())
        },
        other => other,
    }
}

fn log_response(label: &str, endpoint: &Url, response: &reqwest::Response) {
    const MESSAGE: &str = "response recd from upstream";
    let status = response.status();
    if status.is_success() || status.is_informational() {
        tracing::debug!(%endpoint, %status, "{label}: {MESSAGE}");
    } else if status.is_client_error() {
        tracing::warn!(%endpoint, %status, "{label}: {MESSAGE}");
    } else {
        tracing::error!(%endpoint, %status, "{label}: {MESSAGE}");
    }
}
