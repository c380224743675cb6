//! API routes module

pub mod health;

use axum::Router;
use domain_products::{MongoProductRepository, ProductService, handlers};

use crate::state::AppState;

/// Routes nested under `/api`
pub fn routes(state: &AppState) -> Router {
    let repository = MongoProductRepository::new(&state.db);
    Router::new().nest("/products", handlers::router(ProductService::new(repository)))
}

/// Initialize database indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    MongoProductRepository::new(&state.db).init_indexes().await?;
    Ok(())
}
