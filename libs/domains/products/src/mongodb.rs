//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductFilter, ProductStatus, UpdateProduct, now_millis};
use crate::repository::{ProductRepository, ProductStream};

/// Default collection name
pub const COLLECTION_NAME: &str = "products";

/// Stored shape of a product
///
/// `_id` is written as BSON binary subtype 4 and the timestamps as BSON
/// datetimes, so ids are portable across drivers and range queries and
/// sorting run server side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    #[serde(rename = "_id", with = "bson::serde_helpers::uuid_1_as_binary")]
    pub id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    pub status: ProductStatus,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            quantity: product.quantity,
            price: product.price,
            status: product.status,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            quantity: doc.quantity,
            price: doc.price,
            status: doc.status,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<ProductDocument>(collection_name);
        Self { collection }
    }

    /// Create the indexes used by price-range listing
    ///
    /// Idempotent: MongoDB accepts re-creating an identical index.
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            // Price range queries
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(IndexOptions::builder().name("idx_price".to_string()).build())
                .build(),
            // Newest-first listing
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = %self.collection.name(), "Product indexes created");
        Ok(())
    }
}

/// Match a product by id, encoded the same way as `ProductDocument::id`
pub fn id_filter(id: Uuid) -> Document {
    doc! { "_id": bson::Uuid::from(id) }
}

/// Inclusive price bounds; no bounds matches every document
pub fn build_filter(filter: &ProductFilter) -> Document {
    let mut price = doc! {};
    if let Some(min) = filter.min_price {
        price.insert("$gte", min);
    }
    if let Some(max) = filter.max_price {
        price.insert("$lte", max);
    }

    if price.is_empty() {
        doc! {}
    } else {
        doc! { "price": price }
    }
}

/// `$set` body for a patch; `updated_at` is always included
pub fn build_update(patch: &UpdateProduct, now: DateTime<Utc>) -> Document {
    let mut set = doc! {};

    if let Some(ref name) = patch.name {
        set.insert("name", name.as_str());
    }
    if let Some(quantity) = patch.quantity {
        set.insert("quantity", quantity);
    }
    if let Some(price) = patch.price {
        set.insert("price", price);
    }
    if let Some(status) = patch.status {
        set.insert("status", status.to_string());
    }
    set.insert("updated_at", bson::DateTime::from_chrono(now));

    doc! { "$set": set }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    async fn insert(&self, input: CreateProduct) -> ProductResult<Product> {
        let product = Product::new(input);

        self.collection
            .insert_one(ProductDocument::from(&product))
            .await
            .map_err(|e| ProductError::Insertion(e.to_string()))?;

        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn find_by_id(&self, id: Uuid) -> ProductResult<Product> {
        self.collection
            .find_one(id_filter(id))
            .await?
            .map(Product::from)
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    async fn find_many(&self, filter: ProductFilter) -> ProductResult<ProductStream> {
        let cursor = self
            .collection
            .find(build_filter(&filter))
            .sort(doc! { "created_at": -1 })
            .await?;

        Ok(cursor
            .map_ok(Product::from)
            .map_err(ProductError::from)
            .boxed())
    }

    #[instrument(skip(self, patch), fields(product_id = %id))]
    async fn update(&self, id: Uuid, patch: UpdateProduct) -> ProductResult<Product> {
        let updated = self
            .collection
            .find_one_and_update(id_filter(id), build_update(&patch, now_millis()))
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(ProductError::NotFound(id))?;

        tracing::info!(product_id = %id, "Product updated successfully");
        Ok(updated.into())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete(&self, id: Uuid) -> ProductResult<()> {
        let result = self.collection.delete_one(id_filter(id)).await?;

        if result.deleted_count == 0 {
            return Err(ProductError::NotFound(id));
        }

        tracing::info!(product_id = %id, "Product deleted successfully");
        Ok(())
    }
}
