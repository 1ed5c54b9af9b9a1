use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xuav_api::Server;
use xuav_core::ConfigManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigManager::new().context("Failed to load configuration")?;
    let settings = config.settings().clone();
    settings.validate()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},xuav_api=debug,tower_http=debug", settings.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Loaded {} configuration from {}",
        config.env(),
        config.config_dir().display()
    );

    let server = Server::new(settings).await?;
    server.run().await
}
