use std::sync::Arc;

use soapbox::adapters::{ChatAdapter, SlackChat, SocialAdapter, XSocial};
use soapbox::config::{AppConfig, SlackConfig, XConfig};
use soapbox::dispatch::Dispatcher;
use soapbox::server;
use soapbox::store::PendingPostStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;
    let slack_config = SlackConfig::from_env()?;
    let x_config = XConfig::from_env()?;

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);

    let store = Arc::new(PendingPostStore::new());
    let chat: Arc<dyn ChatAdapter> = Arc::new(SlackChat::new(slack_config));
    let social: Arc<dyn SocialAdapter> = Arc::new(XSocial::new(x_config));
    let dispatcher = Arc::new(Dispatcher::new(&config, store, chat, social));

    let app = server::router(dispatcher);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(
        port,
        trigger = %config.trigger_token,
        threshold = config.reaction_threshold,
        "soapbox listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
