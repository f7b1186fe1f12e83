use anyhow::{Context, Result};
use forkcms_core::{config::Config, i18n::Language, server};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when the variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("forkcms_core=info".parse()?)
                .add_directive("forkcms=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Starting Fork CMS core service (default language: {}, debug: {})",
        config.site_default_language, config.debug
    );

    let state = server::AppState::from_config(&config)?;

    // Make sure the fallback language can always be served
    let canonical = Language::canonical();
    for application in forkcms_core::i18n::Application::ALL {
        state
            .resolver
            .ensure_cache(canonical, application)
            .with_context(|| format!("Failed to prepare {} locale cache", application))?;
    }

    if state.api_key.is_none() {
        info!("API_KEY not set, write endpoints are disabled");
    }

    let app = server::create_router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
