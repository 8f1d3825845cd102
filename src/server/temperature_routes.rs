use super::errors::ApiError;
use super::result::{ErrorReport, HttpResult};
use super::state::AppState;
use crate::model::{TemperatureTriple, WeatherResult};
use crate::services::TemperatureApiRef;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{routing, Json, Router};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};
use validator::Validate;

#[derive(OpenApi)]
#[openapi(
    paths(serve_temperature),
    components(schemas(WeatherResult, TemperatureTriple, ErrorReport)),
    tags((name = "temperature", description = "Current temperature by city"))
)]
pub struct TemperatureApiDoc;

pub fn api() -> Router<AppState> {
    Router::new().route("/", routing::get(serve_temperature))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TemperatureQuery {
    /// City name, matched as given.
    #[serde(default)]
    #[validate(length(min = 1, message = "city must not be empty"))]
    #[param(example = "Cajobi")]
    pub city: String,

    /// Country name; optional.
    #[serde(default)]
    #[param(example = "Brazil")]
    pub country: String,
}

#[utoipa::path(
    get,
    path = "/api/temperature",
    tag = "temperature",
    params(TemperatureQuery),
    responses(
        (status = 200, description = "Current temperature for the city", body = WeatherResult),
        (status = 400, description = "Missing or empty city", body = ErrorReport),
        (status = 500, description = "Location or weather could not be resolved", body = ErrorReport),
    ),
)]
#[tracing::instrument(level = "debug", skip(temperature))]
async fn serve_temperature(
    query: Result<Query<TemperatureQuery>, QueryRejection>,
    State(temperature): State<TemperatureApiRef>,
) -> HttpResult {
    let Query(query) = query?;
    query.validate()?;

    let result = temperature
        .temperature_for_city(&query.city, &query.country)
        .await
        .map_err(ApiError::Temperature)?;

    Ok(Json(result).into_response())
}
