use crate::errors::SunshineError;
use clap::Parser;
use config::{Config, Environment, File};
use secrecy::Secret;
use serde::Deserialize;
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use std::path::PathBuf;
use std::time::Duration;
use strum_macros::{Display, EnumString, EnumVariantNames};
use url::Url;

const APPLICATION_CONFIG: &str = "application";
const ENV_APP_ENVIRONMENT: &str = "APP_ENVIRONMENT";
const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Serves current city temperatures in Kelvin, Celsius and Fahrenheit")]
pub struct CliOptions {
    /// Explicit configuration file, applied over the resources configuration.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Secrets configuration file (API keys), applied over all other configuration files.
    #[arg(short, long, value_name = "PATH")]
    pub secrets: Option<PathBuf>,

    /// Directory holding `application.yaml` and the environment-specific overrides.
    #[arg(short, long, value_name = "DIR", default_value = "resources")]
    pub resources: PathBuf,

    /// Overrides the HTTP API port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Default tracing directive; `RUST_LOG` takes precedence when set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl CliOptions {
    pub const fn env_app_environment() -> &'static str {
        ENV_APP_ENVIRONMENT
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api: HttpApiSettings,
    pub geolocation: GeolocationSettings,
    pub external: ExternalSettings,

    #[serde(default)]
    pub http_client: HttpClientSettings,
}

impl Settings {
    /// Layers, lowest precedence first: `application` resource, `<APP_ENVIRONMENT>` resource,
    /// `--config` file, `--secrets` file, `APP__*` environment variables, command line overrides.
    pub fn load(options: &CliOptions) -> Result<Self, SunshineError> {
        let mut builder = Config::builder()
            .add_source(File::from(options.resources.join(APPLICATION_CONFIG)).required(true));

        if let Ok(app_environment) = std::env::var(ENV_APP_ENVIRONMENT) {
            let environment_config = options.resources.join(app_environment.to_lowercase());
            tracing::info!(?environment_config, "applying {app_environment} environment configuration");
            builder = builder.add_source(File::from(environment_config).required(false));
        }

        if let Some(config) = &options.config {
            builder = builder.add_source(File::from(config.as_path()).required(true));
        }

        if let Some(secrets) = &options.secrets {
            builder = builder.add_source(File::from(secrets.as_path()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        if let Some(port) = options.port {
            builder = builder.set_override("api.server.port", i64::from(port))?;
        }

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct HttpApiSettings {
    pub server: HttpServerSettings,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "timeout_secs")]
    pub timeout: Duration,

    #[serde(default)]
    pub openapi_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpServerSettings {
    pub host: String,
    pub port: u16,
}

impl HttpServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumVariantNames, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum GeolocationSource {
    /// Local `"City, Country"` table loaded at startup.
    Table,

    /// Remote geocoding API.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeolocationSettings {
    pub source: GeolocationSource,
    pub table_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalSettings {
    pub geolocation: ExternalApiSettings,
    pub weather: ExternalApiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalApiSettings {
    pub base_url: Url,
    pub api_key: Secret<String>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpClientSettings {
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "timeout_secs")]
    pub timeout: Duration,

    pub max_retries: u32,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "min_retry_backoff_millis")]
    pub min_retry_backoff: Duration,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "max_retry_backoff_millis")]
    pub max_retry_backoff: Duration,

    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "pool_idle_timeout_secs")]
    pub pool_idle_timeout: Duration,

    pub pool_max_idle_per_host: usize,

    pub user_agent: String,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 3,
            min_retry_backoff: Duration::from_millis(100),
            max_retry_backoff: Duration::from_secs(5),
            pool_idle_timeout: Duration::from_secs(60),
            pool_max_idle_per_host: 5,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
