use std::sync::Arc;

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod clients;
mod config;
mod db;
mod domain;
mod metrics;
mod persistence;
mod utils;

use api::AppState;
use clients::{HttpAuthClient, HttpCartClient, HttpNotificationClient};
use config::{Config, ConfigError, StorageBackend};
use domain::order::{OrderCommandHandler, OrderRepository, OrderStore};
use persistence::{InMemoryOrderStore, PgOrderStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_service=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order service");

    // === 1. Load configuration ===
    let config = Config::from_env()?;

    // === 2. Initialize Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // === 3. Open the order store ===
    let mut pool = None;
    let store: Arc<dyn OrderStore> = match config.storage {
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let pg_pool = db::connect(database).await?;
            pool = Some(pg_pool.clone());
            Arc::new(PgOrderStore::new(pg_pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory order store, orders are lost on restart");
            Arc::new(InMemoryOrderStore::new())
        }
    };
    let orders = OrderRepository::new(store);

    // === 4. Create collaborator clients (each with a circuit breaker) ===
    let http = clients::build_http_client(config.collaborator_timeout)?;

    let auth = Arc::new(HttpAuthClient::new(
        http.clone(),
        &config.auth_service_url,
        metrics.circuit_breaker_gauge("auth"),
    ));

    let mut commands = OrderCommandHandler::new(orders.clone(), metrics.clone());
    match &config.cart_service_url {
        Some(url) => {
            commands = commands.with_carts(Arc::new(HttpCartClient::new(
                http.clone(),
                url,
                metrics.circuit_breaker_gauge("cart"),
            )));
        }
        None => tracing::info!("CART_SERVICE_URL not set, cart clearing disabled"),
    }
    match &config.notification_service_url {
        Some(url) => {
            commands = commands.with_notifications(Arc::new(HttpNotificationClient::new(
                http.clone(),
                url,
                metrics.circuit_breaker_gauge("notification"),
            )));
        }
        None => tracing::info!("NOTIFICATION_SERVICE_URL not set, emails disabled"),
    }

    // === 5. Serve HTTP until SIGINT/SIGTERM ===
    let state = web::Data::new(AppState {
        orders,
        commands,
        auth,
        metrics: metrics.clone(),
    });
    let metrics_data = web::Data::from(metrics);

    let addr = config.socket_addr();
    let cors_origins = config.cors_allowed_origins.clone();
    if cors_origins.is_empty() {
        tracing::info!("CORS allows any origin");
    }
    tracing::info!("🌐 Listening on http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .wrap(api::cors(&cors_origins))
            .wrap(from_fn(api::request_logger))
            .app_data(state.clone())
            .app_data(metrics_data.clone())
            .configure(api::configure)
    })
    .shutdown_timeout(config.shutdown_timeout.as_secs())
    .bind(&addr)?
    .run()
    .await?;

    // === 6. Release the store ===
    if let Some(pool) = pool {
        pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }

    tracing::info!("🛑 Server stopped gracefully");
    Ok(())
}
