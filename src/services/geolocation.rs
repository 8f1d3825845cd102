mod open_weather;
mod table;

pub use open_weather::OpenWeatherGeolocation;
pub use table::CityTableGeolocation;

use super::UpstreamError;
use crate::model::Coordinate;
use crate::settings::{ExternalApiSettings, GeolocationSettings, GeolocationSource};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Resolves a place name to its coordinate.
#[async_trait]
pub trait GeolocationApi: Send + Sync {
    async fn find_coordinate(
        &self, city: &str, country: &str,
    ) -> Result<Coordinate, GeolocationError>;
}

#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("failed to read city table from {path:?}: {source}")]
    LoadTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse city table: {0}")]
    ParseTable(#[source] serde_json::Error),

    #[error("could not find geolocation for the city [{city}] and country [{country}]")]
    NotFound { city: String, country: String },

    #[error("supplied geolocation API url is not a base url to query: {0}")]
    NotABaseUrl(Url),

    #[error("{0}")]
    Upstream(#[from] UpstreamError),
}

/// The geolocation backend chosen at startup.
#[derive(Debug, Clone)]
pub enum GeolocationServices {
    CityTable(CityTableGeolocation),
    OpenWeather(OpenWeatherGeolocation),
}

impl GeolocationServices {
    #[tracing::instrument(level = "debug", skip(remote, client))]
    pub fn from_settings(
        settings: &GeolocationSettings, remote: &ExternalApiSettings, client: ClientWithMiddleware,
    ) -> Result<Self, GeolocationError> {
        match settings.source {
            GeolocationSource::Table => {
                let table = CityTableGeolocation::from_path(&settings.table_path)?;
                tracing::info!(
                    cities = table.len(), path = ?settings.table_path,
                    "geolocation resolved from local city table"
                );
                Ok(Self::CityTable(table))
            },

            GeolocationSource::Remote => {
                let api = OpenWeatherGeolocation::new(
                    remote.base_url.clone(),
                    remote.api_key.clone(),
                    client,
                )?;
                tracing::info!(base_url = %remote.base_url, "geolocation resolved from remote API");
                Ok(Self::OpenWeather(api))
            },
        }
    }
}

#[async_trait]
impl GeolocationApi for GeolocationServices {
    async fn find_coordinate(
        &self, city: &str, country: &str,
    ) -> Result<Coordinate, GeolocationError> {
        match self {
            Self::CityTable(svc) => svc.find_coordinate(city, country).await,
            Self::OpenWeather(svc) => svc.find_coordinate(city, country).await,
        }
    }
}
