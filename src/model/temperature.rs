use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const ZERO_CELSIUS_IN_KELVIN: f64 = 273.15;

/// Temperature in the three supported scales, each as a fixed two-decimal string.
///
/// Only built from a Kelvin reading; Celsius is derived from Kelvin and Fahrenheit from the
/// already-rounded Celsius value.
#[derive(Debug, Clone, PartialEq, Eq, ToSchema, Serialize, Deserialize)]
pub struct TemperatureTriple {
    #[schema(example = "297.80")]
    pub kelvin: String,

    #[schema(example = "24.65")]
    pub celsius: String,

    #[schema(example = "76.37")]
    #[serde(rename = "farenheit")]
    pub fahrenheit: String,
}

impl TemperatureTriple {
    pub fn from_kelvin(kelvin: f64) -> Self {
        let celsius = kelvin_to_celsius(kelvin);
        let fahrenheit = celsius_to_fahrenheit(celsius);

        Self {
            kelvin: format_hundredths(kelvin),
            celsius: format_hundredths(celsius),
            fahrenheit: format_hundredths(fahrenheit),
        }
    }
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    round_hundredths(kelvin - ZERO_CELSIUS_IN_KELVIN)
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    round_hundredths(celsius * 1.8 + 32.0)
}

/// Half-away-from-zero rounding to two decimal places. Adding `0.0` folds `-0.0` into `0.0`.
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

fn format_hundredths(value: f64) -> String {
    format!("{:.2}", value + 0.0)
}
