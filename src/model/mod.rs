mod temperature;

pub use temperature::{celsius_to_fahrenheit, kelvin_to_celsius, TemperatureTriple};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Latitude/longitude pair in decimal degrees. Range is not validated.
#[derive(Debug, Default, Copy, Clone, PartialEq, ToSchema, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// The complete response for one temperature query.
#[derive(Debug, Clone, PartialEq, ToSchema, Serialize, Deserialize)]
pub struct WeatherResult {
    #[schema(example = -20.8806453)]
    pub latitude: f64,

    #[schema(example = -48.8103486)]
    pub longitude: f64,

    #[schema(example = "Cajobi")]
    pub city: String,

    #[schema(example = "Brazil")]
    pub country: String,

    pub temperature: TemperatureTriple,
}

impl WeatherResult {
    pub fn new(
        city: impl Into<String>, country: impl Into<String>, coordinate: Coordinate,
        temperature: TemperatureTriple,
    ) -> Self {
        Self {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            city: city.into(),
            country: country.into(),
            temperature,
        }
    }

    pub const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
