use super::state::AppState;
use axum::{routing, Json, Router};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "sunshine";

#[derive(OpenApi)]
#[openapi(paths(serve_health), tags((name = "health", description = "Liveness")))]
pub struct HealthApiDoc;

pub fn api() -> Router<AppState> {
    Router::new().route("/", routing::get(serve_health))
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = String, example = json!("sunshine")),
    ),
)]
#[tracing::instrument(level = "trace")]
async fn serve_health() -> Json<&'static str> {
    Json(SERVICE_NAME)
}
