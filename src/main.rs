//! docstore-filter HTTP server
//!
//! Configuration comes from `DOCSTORE_*` environment variables (see
//! [`StoreConfig::from_env`]); the listen address from `DOCSTORE_BIND`.

use std::sync::Arc;

use docstore_filter::{FilterService, PgConnector, StoreConfig, http};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Listener settings for the binary
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerConfig {
    bind: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind = lookup("DOCSTORE_BIND")
            .filter(|bind| !bind.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        Self { bind }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docstore_filter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env()?;
    let server = ServerConfig::from_env();

    let service = Arc::new(FilterService::new(PgConnector::new(config.clone()), config));
    let app = http::router(service);

    let listener = tokio::net::TcpListener::bind(&server.bind).await?;
    tracing::info!(address = %server.bind, "docstore-filter listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
