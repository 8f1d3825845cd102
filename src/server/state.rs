use crate::errors::SunshineError;
use crate::services::{
    self, GeolocationServices, OpenWeatherApi, TemperatureApiRef, TemperatureService,
};
use crate::Settings;
use axum::extract::FromRef;
use std::fmt;
use std::sync::Arc;

#[tracing::instrument(level = "trace", skip(settings))]
pub fn initialize_app_state(settings: &Settings) -> Result<AppState, SunshineError> {
    // -- shared outbound client --
    let client = services::make_http_client(&settings.http_client)?;

    // -- geolocation --
    let geolocation = GeolocationServices::from_settings(
        &settings.geolocation,
        &settings.external.geolocation,
        client.clone(),
    )?;

    // -- weather --
    let weather = OpenWeatherApi::new(
        settings.external.weather.base_url.clone(),
        settings.external.weather.api_key.clone(),
        client,
    )?;

    // -- assemble app state --
    Ok(AppState::new(Arc::new(TemperatureService::new(geolocation, weather))))
}

#[derive(Clone)]
pub struct AppState {
    pub temperature: TemperatureApiRef,
}

impl AppState {
    pub fn new(temperature: TemperatureApiRef) -> Self {
        Self { temperature }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl FromRef<AppState> for TemperatureApiRef {
    fn from_ref(app: &AppState) -> Self {
        app.temperature.clone()
    }
}
