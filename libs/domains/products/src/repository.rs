use async_trait::async_trait;
use futures::stream::BoxStream;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};

/// Lazily fetched products; storage errors surface per item
pub type ProductStream = BoxStream<'static, ProductResult<Product>>;

/// Repository trait for Product persistence
///
/// Missing records are reported as `ProductError::NotFound(id)` by every
/// keyed operation, never as `Ok(None)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product with a fresh id and `created_at == updated_at`
    async fn insert(&self, input: CreateProduct) -> ProductResult<Product>;

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Product>;

    /// Products within the filter's price bounds, newest first
    async fn find_many(&self, filter: ProductFilter) -> ProductResult<ProductStream>;

    /// Apply `patch` and refresh `updated_at` in one write
    async fn update(&self, id: Uuid, patch: UpdateProduct) -> ProductResult<Product>;

    async fn delete(&self, id: Uuid) -> ProductResult<()>;
}
