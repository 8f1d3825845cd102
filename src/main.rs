use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = sunshine::CliOptions::parse();

    let subscriber = sunshine::tracing::get_tracing_subscriber(&options.log_level);
    sunshine::tracing::init_subscriber(subscriber)?;

    let settings = load_settings(&options)?;

    let server = sunshine::Server::build(&settings).await?;
    tracing::info!(port = server.port(), "sunshine API started");
    server.run_until_stopped().await.map_err(|err| err.into())
}

fn load_settings(options: &sunshine::CliOptions) -> anyhow::Result<sunshine::Settings> {
    if options.secrets.is_none() {
        tracing::warn!(
            "No secrets configuration provided. API keys should be confined in a secrets \
             configuration or supplied through APP__EXTERNAL__*__API_KEY environment variables."
        );
    }

    let app_environment = std::env::var(sunshine::CliOptions::env_app_environment()).ok();
    if app_environment.is_none() {
        tracing::info!("No environment configuration override provided.");
    }

    let settings = sunshine::Settings::load(options)?;
    tracing::info!(?settings, ?app_environment, "loaded settings");
    Ok(settings)
}
