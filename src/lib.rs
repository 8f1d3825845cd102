#![forbid(unsafe_code)]
#![warn(clippy::cargo, clippy::suspicious, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions)]

mod errors;
pub mod model;
mod server;
pub mod services;
pub mod settings;
pub mod tracing;

pub use errors::SunshineError;
pub use server::{api_router, ApiError, AppState, RunParameters, Server};
pub use settings::{CliOptions, Settings};
