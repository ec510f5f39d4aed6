use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use estate_server::config::{AppConfig, StoreBackend};
use estate_server::database::init_db;
use estate_server::repository::{
    MemoryPropertyRepository, MongoPropertyRepository, PropertyRepository,
};
use estate_server::seed::seed_if_empty;
use estate_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::load().context("Failed to load config")?;
    info!(environment = ?config.environment, backend = ?config.database.backend, "Starting server");

    let properties: Arc<dyn PropertyRepository> = match config.database.backend {
        StoreBackend::Mongo => {
            let db = init_db(&config.database)
                .await
                .context("Failed to connect to MongoDB")?;
            Arc::new(MongoPropertyRepository::new(
                &db,
                &config.database.collection,
                Duration::from_millis(config.database.operation_timeout_ms),
            ))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory property store; data is lost on exit");
            Arc::new(MemoryPropertyRepository::new())
        }
    };

    if let Some(path) = &config.database.seed_file {
        seed_if_empty(properties.as_ref(), path)
            .await
            .with_context(|| format!("Failed to seed properties from {}", path.display()))?;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host or server.port")?;

    let state = AppState {
        properties,
        config,
    };
    let app = estate_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
