//! Products API - REST server for product CRUD over MongoDB

use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::connect_from_config_with_retry;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!(
        database = %config.mongodb.database(),
        "Connecting to MongoDB"
    );

    let mongo_client =
        connect_from_config_with_retry(&config.mongodb, Some(config.mongo_retry.clone())).await?;

    let state = AppState::new(config, mongo_client);

    api::init_indexes(&state).await?;

    let router = create_router::<openapi::ApiDoc>(api::routes(&state))?
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()));

    info!(
        name = state.config.app.name,
        version = state.config.app.version,
        port = state.config.server.port,
        "Starting Products API"
    );

    let server = state.config.server.clone();
    let shutdown_timeout = state.config.shutdown_timeout;
    let client = state.mongo_client.clone();

    create_production_app(router, &server, shutdown_timeout, async move {
        info!("Shutting down: closing MongoDB connections");
        client.shutdown().await;
        info!("MongoDB connections closed");
    })
    .await?;

    info!("Products API shutdown complete");
    Ok(())
}
