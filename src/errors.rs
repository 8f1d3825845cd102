use crate::server::ApiError;
use crate::services::{GeolocationError, WeatherError};
use thiserror::Error;

/// Startup and lifecycle failures of the service as a whole.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SunshineError {
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("failed to build outbound HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to set up geolocation: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("failed to set up weather: {0}")]
    Weather(#[from] WeatherError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    IO(#[from] std::io::Error),
}
