//! MongoDB integration tests for the Products repository
//!
//! Each test starts its own MongoDB container, so they need Docker:
//!
//! ```sh
//! cargo test -p domain_products --test integration_test -- --ignored
//! ```

use domain_products::*;
use futures::TryStreamExt;
use test_utils::assertions::{assert_price_eq, assert_uuid_eq};
use test_utils::{TestDataBuilder, TestMongo};
use uuid::Uuid;

async fn repository(mongo: &TestMongo, test_name: &str) -> MongoProductRepository {
    let builder = TestDataBuilder::from_test_name(test_name);
    let repo = MongoProductRepository::new(&mongo.database(&builder.database_name()));
    repo.init_indexes().await.unwrap();
    repo
}

fn input(name: &str, price: f64) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        quantity: 10,
        price,
        status: ProductStatus::Active,
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_insert_then_find_round_trip() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "round_trip").await;

    let created = repo.insert(input("Widget", 9.99)).await.unwrap();
    assert_eq!(created.created_at, created.updated_at);

    let fetched = repo.find_by_id(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_refreshes_updated_at_and_keeps_other_fields() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "update").await;
    let created = repo.insert(input("Widget", 9.99)).await.unwrap();

    let updated = repo
        .update(
            created.id,
            UpdateProduct {
                quantity: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_uuid_eq(updated.id, created.id, "id must not change");
    assert_eq!(updated.quantity, 3);
    assert_eq!(updated.name, created.name);
    assert_price_eq(updated.price, created.price, "price untouched");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    assert_eq!(repo.find_by_id(created.id).await.unwrap(), updated);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_missing_id_is_not_found_for_every_keyed_operation() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "not_found").await;
    let id = Uuid::now_v7();

    let errors = [
        repo.find_by_id(id).await.unwrap_err(),
        repo.update(id, UpdateProduct::default()).await.unwrap_err(),
        repo.delete(id).await.unwrap_err(),
    ];

    for err in errors {
        assert!(matches!(err, ProductError::NotFound(missing) if missing == id));
        assert_eq!(err.to_string(), format!("Product not found with id: {id}"));
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_find_many_price_range_inclusive_newest_first() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "price_range").await;

    for (name, price) in [("a", 5.0), ("b", 10.0), ("c", 15.0), ("d", 20.0), ("e", 25.0)] {
        repo.insert(input(name, price)).await.unwrap();
        // Distinct millisecond timestamps for a deterministic order
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let products: Vec<Product> = repo
        .find_many(ProductFilter::new(Some(10.0), Some(20.0)))
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["d", "c", "b"]);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_find_many_empty_collection() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "empty").await;

    let products: Vec<Product> = repo
        .find_many(ProductFilter::default())
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert!(products.is_empty());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_delete_removes_document() {
    let mongo = TestMongo::new().await;
    let repo = repository(&mongo, "delete").await;
    let created = repo.insert(input("Widget", 1.0)).await.unwrap();

    repo.delete(created.id).await.unwrap();

    assert!(matches!(
        repo.find_by_id(created.id).await,
        Err(ProductError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_with_collection_keeps_products_apart() {
    let mongo = TestMongo::new().await;
    let db = mongo.database(&TestDataBuilder::from_test_name("collections").database_name());
    let main = MongoProductRepository::new(&db);
    let archive = MongoProductRepository::with_collection(&db, "products_archive");

    let created = archive.insert(input("Old widget", 2.0)).await.unwrap();

    assert!(matches!(
        main.find_by_id(created.id).await,
        Err(ProductError::NotFound(_))
    ));
    assert_eq!(archive.find_by_id(created.id).await.unwrap(), created);
}
