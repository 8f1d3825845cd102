use tracing::{subscriber::set_global_default, Subscriber};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Bunyan JSON subscriber writing to stdout. `RUST_LOG` directives win over `default_directives`.
pub fn get_tracing_subscriber(default_directives: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let formatting_layer = BunyanFormattingLayer::new(env!("CARGO_PKG_NAME").into(), std::io::stdout);

    Registry::default().with(env_filter).with(JsonStorageLayer).with(formatting_layer)
}

/// Installs `subscriber` as the process-wide default and routes `log` records into it.
/// May only succeed once per process.
pub fn init_subscriber<S>(subscriber: S) -> anyhow::Result<()>
where
    S: Subscriber + Send + Sync,
{
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}
