mod errors;
mod health_routes;
mod result;
mod state;
mod temperature_routes;

pub use errors::ApiError;
pub use result::HttpError;
pub use state::{initialize_app_state, AppState};

use crate::errors::SunshineError;
use crate::Settings;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Response, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{routing, BoxError, Json, Router};
use health_routes::HealthApiDoc;
use std::net::TcpListener;
use std::time::Duration;
use temperature_routes::TemperatureApiDoc;
use tokio::signal;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::request_id::MakeRequestUuid;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tower_http::ServiceBuilderExt;
use utoipa::OpenApi;

pub type HttpJoinHandle = JoinHandle<Result<(), ApiError>>;

pub struct Server {
    port: u16,
    server_handle: HttpJoinHandle,
}

impl Server {
    #[tracing::instrument(level = "debug", skip(settings))]
    pub async fn build(settings: &Settings) -> Result<Self, SunshineError> {
        let state = initialize_app_state(settings)?;

        let address = settings.api.server.address();
        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!(
            "{:?} API listening on {address}: {listener:?}",
            std::env::current_exe()
        );
        let std_listener = listener.into_std()?;
        let port = std_listener.local_addr()?.port();

        let server_handle =
            run_http_server(std_listener, state, &RunParameters::from_settings(settings));

        Ok(Self { port, server_handle })
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), ApiError> {
        self.server_handle.await?
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParameters {
    pub timeout: Duration,
    pub openapi_enabled: bool,
}

impl RunParameters {
    pub const fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: settings.api.timeout,
            openapi_enabled: settings.api.openapi_enabled,
        }
    }
}

/// The complete application: routes, fallback and middleware, ready to serve.
pub fn api_router(state: AppState, params: &RunParameters) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .propagate_x_request_id()
        .layer(HandleErrorLayer::new(handle_api_error))
        .timeout(params.timeout)
        .compression();

    let api_routes = Router::new()
        .nest("/health", health_routes::api())
        .nest("/temperature", temperature_routes::api())
        .with_state(state);

    let mut app = Router::new().nest("/api", api_routes);

    if params.openapi_enabled {
        app = app
            .route(
                "/api-doc/temperature-openapi.json",
                routing::get(|| async { Json(TemperatureApiDoc::openapi()) }),
            )
            .route(
                "/api-doc/health-openapi.json",
                routing::get(|| async { Json(HealthApiDoc::openapi()) }),
            );
    }

    app.fallback(fallback).layer(middleware_stack)
}

#[tracing::instrument(level = "trace", skip(state))]
pub fn run_http_server(
    listener: TcpListener, state: AppState, params: &RunParameters,
) -> HttpJoinHandle {
    let app = api_router(state, params);

    tokio::spawn(async move {
        tracing::debug!(app_routes=?app, "starting API server...");
        let builder = axum::Server::from_tcp(listener)?;
        let server = builder.serve(app.into_make_service());
        let graceful = server.with_graceful_shutdown(shutdown_signal());
        graceful.await?;
        tracing::info!("{:?} API shutting down", std::env::current_exe());
        Ok::<(), ApiError>(())
    })
}

async fn fallback(uri: Uri) -> impl IntoResponse {
    HttpError::NotFound { message: format!("no route found for {uri}").into() }
}

async fn handle_api_error(error: BoxError) -> Response<String> {
    let (status, message) = if error.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, format!("request timeout: {error}"))
    } else {
        tracing::error!(%error, "unhandled middleware error");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
    };

    let response = Response::new(message);
    let (mut parts, body) = response.into_parts();
    parts.status = status;
    Response::from_parts(parts, body)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for Ctrl+C; relying on other signals");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            },
            Err(error) => {
                tracing::error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}
