use super::{GeolocationApi, GeolocationError, WeatherApi, WeatherError};
use crate::model::{TemperatureTriple, WeatherResult};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub type TemperatureApiRef = Arc<dyn TemperatureApi>;

#[async_trait]
pub trait TemperatureApi: Send + Sync {
    async fn temperature_for_city(
        &self, city: &str, country: &str,
    ) -> Result<WeatherResult, TemperatureError>;
}

#[derive(Debug, Error)]
pub enum TemperatureError {
    #[error("failed to resolve location: {0}")]
    Location(#[source] GeolocationError),

    #[error("failed to retrieve weather: {0}")]
    Weather(#[source] WeatherError),
}

/// Composes a geolocation provider and a weather provider into a city temperature lookup.
///
/// Each call runs geolocation then weather strictly in sequence; a failure at either step ends
/// the call without a partial result.
#[derive(Debug, Clone)]
pub struct TemperatureService<G, W> {
    geolocation: G,
    weather: W,
}

impl<G, W> TemperatureService<G, W> {
    pub const fn new(geolocation: G, weather: W) -> Self {
        Self { geolocation, weather }
    }
}

#[async_trait]
impl<G, W> TemperatureApi for TemperatureService<G, W>
where
    G: GeolocationApi,
    W: WeatherApi,
{
    #[tracing::instrument(level = "debug", skip(self))]
    async fn temperature_for_city(
        &self, city: &str, country: &str,
    ) -> Result<WeatherResult, TemperatureError> {
        let coordinate = self
            .geolocation
            .find_coordinate(city, country)
            .await
            .map_err(TemperatureError::Location)?;

        let reading = self
            .weather
            .current_weather(coordinate)
            .await
            .map_err(TemperatureError::Weather)?;

        let temperature = TemperatureTriple::from_kelvin(reading.kelvin());
        tracing::debug!(%coordinate, ?temperature, "resolved temperature for {city}, {country}");

        Ok(WeatherResult::new(city, country, coordinate, temperature))
    }
}
