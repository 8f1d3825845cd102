use super::{GeolocationApi, GeolocationError};
use crate::model::Coordinate;
use crate::services::{endpoint, fetch_json};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use url::Url;

const LABEL: &str = "geolocation";
const DIRECT_PATH: [&str; 3] = ["geo", "1.0", "direct"];
const RESULT_LIMIT: &str = "1";

#[derive(Debug, Deserialize)]
struct DirectMatch {
    #[allow(dead_code)]
    name: Option<String>,

    #[allow(dead_code)]
    #[serde(default)]
    local_names: HashMap<String, String>,

    lat: f64,
    lon: f64,

    #[allow(dead_code)]
    country: Option<String>,

    #[allow(dead_code)]
    state: Option<String>,
}

/// Geolocation through the OpenWeather direct geocoding API.
///
/// Only the city is sent; the first match is trusted and its country is not compared with the
/// requested one.
#[derive(Clone)]
pub struct OpenWeatherGeolocation {
    client: ClientWithMiddleware,
    base_url: Url,
    api_key: Secret<String>,
}

impl fmt::Debug for OpenWeatherGeolocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherGeolocation")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl OpenWeatherGeolocation {
    pub fn new(
        base_url: Url, api_key: Secret<String>, client: ClientWithMiddleware,
    ) -> Result<Self, GeolocationError> {
        if base_url.cannot_be_a_base() {
            return Err(GeolocationError::NotABaseUrl(base_url));
        }

        Ok(Self { client, base_url, api_key })
    }
}

#[async_trait]
impl GeolocationApi for OpenWeatherGeolocation {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_coordinate(
        &self, city: &str, country: &str,
    ) -> Result<Coordinate, GeolocationError> {
        let url = endpoint(&self.base_url, &DIRECT_PATH);
        let query = [
            ("q", city.to_string()),
            ("limit", RESULT_LIMIT.to_string()),
            ("appid", self.api_key.expose_secret().clone()),
        ];

        let matches: Vec<DirectMatch> = fetch_json(&self.client, LABEL, url, &query).await?;

        matches
            .into_iter()
            .next()
            .map(|first| Coordinate::new(first.lat, first.lon))
            .ok_or_else(|| GeolocationError::NotFound {
                city: city.to_string(),
                country: country.to_string(),
            })
    }
}
