//! In-memory repository for handler tests

#![allow(dead_code)]

use async_trait::async_trait;
use domain_products::*;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.products.read().unwrap().len()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(input);
        self.products
            .write()
            .unwrap()
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Product> {
        self.products
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(ProductError::NotFound(id))
    }

    async fn find_many(&self, filter: ProductFilter) -> ProductResult<ProductStream> {
        let mut matching: Vec<Product> = self
            .products
            .read()
            .unwrap()
            .values()
            .filter(|p| filter.matches(p.price))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(stream::iter(matching.into_iter().map(Ok)).boxed())
    }

    async fn update(&self, id: Uuid, patch: UpdateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().unwrap();
        let product = products.get_mut(&id).ok_or(ProductError::NotFound(id))?;
        product.apply_update(patch);
        Ok(product.clone())
    }

    async fn delete(&self, id: Uuid) -> ProductResult<()> {
        self.products
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(ProductError::NotFound(id))
    }
}

/// Router over a fresh in-memory store, plus a handle to inspect it
pub fn app() -> (axum::Router, InMemoryProductRepository) {
    let repo = InMemoryProductRepository::new();
    let router = handlers::router(ProductService::new(repo.clone()));
    (router, repo)
}
