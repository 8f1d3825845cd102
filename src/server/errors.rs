use crate::services::TemperatureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid query parameters: {0}")]
    Query(#[from] axum::extract::rejection::QueryRejection),

    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Temperature(#[from] TemperatureError),

    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("HTTP engine error: {0}")]
    HttpEngine(#[from] hyper::Error),

    #[error("failed joining with thread: {0}")]
    Join(#[from] tokio::task::JoinError),
}
