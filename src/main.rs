//! tenbyten-directory server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, and the
//! optional PostgreSQL persistence mirror.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tenbyten_directory::api;
use tenbyten_directory::app_state::AppState;
use tenbyten_directory::config::DirectoryConfig;
use tenbyten_directory::domain::{EventBus, ListingRegistry};
use tenbyten_directory::persistence::{self, ListingStore};
use tenbyten_directory::service::ListingService;
use tenbyten_directory::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = DirectoryConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting tenbyten-directory");

    // Build domain layer
    let registry = Arc::new(ListingRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Optional persistence: load stored listings, then mirror mutations.
    if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let store = ListingStore::new(pool);
        store.init_schema().await?;

        let stored = store.load_listings().await?;
        let loaded = stored.len();
        for listing in stored {
            if let Err(e) = registry.insert(listing).await {
                tracing::warn!(error = %e, "skipping stored listing");
            }
        }
        tracing::info!(loaded, "loaded listings from postgres");

        tokio::spawn(persistence::mirror::run_mirror(
            store.clone(),
            Arc::clone(&registry),
            event_bus.clone(),
            config.event_log_enabled,
        ));

        if config.cleanup_after_days > 0 {
            let cleanup_store = store;
            let days = config.cleanup_after_days;
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(24 * 60 * 60));
                loop {
                    interval.tick().await;
                    match cleanup_store.delete_old_events(days).await {
                        Ok(deleted) if deleted > 0 => {
                            tracing::info!(deleted, "event log cleanup");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "event log cleanup failed"),
                    }
                }
            });
        }
    }

    // Build service layer
    let listing_service = Arc::new(ListingService::new(
        Arc::clone(&registry),
        event_bus.clone(),
    ));

    // Build application state
    let app_state = AppState {
        listing_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
