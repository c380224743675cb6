//! Product Service - Business logic layer

use futures::TryStreamExt;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repository::{ProductRepository, ProductStream};

/// Product service providing business logic operations
///
/// Inputs are validated here as well as at the HTTP boundary, so callers
/// that bypass the handlers get the same guarantees.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input.validate()?;
        self.repository.insert(input).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository.find_by_id(id).await
    }

    /// Matching products as a lazy stream, newest first
    #[instrument(skip(self))]
    pub async fn stream_products(&self, filter: ProductFilter) -> ProductResult<ProductStream> {
        filter.check_bounds()?;
        self.repository.find_many(filter).await
    }

    /// [`stream_products`](Self::stream_products) collected into a `Vec`
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let products: Vec<Product> = self.stream_products(filter).await?.try_collect().await?;
        tracing::debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: Uuid, patch: UpdateProduct) -> ProductResult<Product> {
        patch.validate()?;
        self.repository.update(id, patch).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        self.repository.delete(id).await
    }
}
