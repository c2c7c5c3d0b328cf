//! Plan Agent - HTTP Server Entry Point
//!
//! Loads `.env`, validates configuration and starts the HTTP server.

use plan_agent::api;
use plan_agent::config::{parse_bool, Config};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let default_filter = if debug_requested() {
        "plan_agent=debug,tower_http=info"
    } else {
        "plan_agent=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("GROQ_API_KEY is set");
    if config.tools.weather_api_key.is_none() {
        warn!("OPENWEATHER_API_KEY not set, weather features will be limited");
    }
    info!(
        "Loaded configuration: model={}, database={}, debug_mode={}",
        config.model,
        config.database_path.display(),
        config.debug_mode
    );
    info!("Starting server on {}", config.listen_addr());

    api::serve(config).await?;

    Ok(())
}

fn debug_requested() -> bool {
    std::env::var("DEBUG_MODE")
        .ok()
        .and_then(|v| parse_bool(&v).ok())
        .unwrap_or(false)
}
