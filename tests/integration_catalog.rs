mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{Method, StatusCode};
use common::{read_json, send, send_json};
use serde_json::json;
use stowage::modules::catalog::Catalog;
use stowage::router::init_router;
use stowage::state::AppState;
use stowage_cache::{CacheConfig, MemoryStore, ResponseCache};

fn setup() -> (Router, MemoryStore) {
    let store = MemoryStore::new();
    let config = CacheConfig::new(Duration::from_secs(60))
        .with_group("product", ["category"])
        .with_outdoors("session");
    let cache = ResponseCache::new(Arc::new(store.clone()), config);

    (init_router(AppState::new(Catalog::new(), cache), None), store)
}

async fn create(app: &Router, family: &str, name: &str) -> u64 {
    let (status, body) = read_json(
        send_json(app, Method::POST, &format!("/v1/{family}"), json!({ "name": name })).await,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_u64().unwrap()
}

#[tokio::test]
async fn test_health_is_never_cached() {
    let (app, store) = setup();

    let (status, body) = read_json(send(&app, Method::GET, "/health").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_list_is_cached_until_create() {
    let (app, store) = setup();
    create(&app, "product", "Laptop").await;

    let (_, first) = read_json(send(&app, Method::GET, "/v1/product").await).await;
    assert_eq!(first.as_array().unwrap().len(), 1);
    assert!(store.contains_key("/v1/product"));

    create(&app, "product", "Phone").await;
    assert!(!store.contains_key("/v1/product"));

    let (_, second) = read_json(send(&app, Method::GET, "/v1/product").await).await;
    assert_eq!(second.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_is_visible_on_next_read() {
    let (app, _store) = setup();
    let id = create(&app, "product", "Laptop").await;
    let path = format!("/v1/product/{id}");

    let (_, before) = read_json(send(&app, Method::GET, &path).await).await;
    assert_eq!(before["name"], "Laptop");

    let (status, _) =
        read_json(send_json(&app, Method::PUT, &path, json!({ "name": "Notebook" })).await).await;
    assert_eq!(status, StatusCode::OK);

    let (_, after) = read_json(send(&app, Method::GET, &path).await).await;
    assert_eq!(after["name"], "Notebook");
}

#[tokio::test]
async fn test_delete_is_visible_on_next_read() {
    let (app, _store) = setup();
    let id = create(&app, "product", "Laptop").await;
    let path = format!("/v1/product/{id}");

    let (status, _) = read_json(send(&app, Method::GET, &path).await).await;
    assert_eq!(status, StatusCode::OK);

    let response = send(&app, Method::DELETE, &path).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = read_json(send(&app, Method::GET, &path).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_mutation_refreshes_categories() {
    let (app, store) = setup();
    create(&app, "category", "Computers").await;
    create(&app, "brand", "Acme").await;

    send(&app, Method::GET, "/v1/category").await;
    send(&app, Method::GET, "/v1/brand").await;
    assert!(store.contains_key("/v1/category"));
    assert!(store.contains_key("/v1/brand"));

    create(&app, "product", "Laptop").await;

    assert!(!store.contains_key("/v1/category"));
    assert!(store.contains_key("/v1/brand"));
}

#[tokio::test]
async fn test_missing_item_is_not_cached() {
    let (app, store) = setup();

    let (status, body) = read_json(send(&app, Method::GET, "/v1/product/42").await).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
    assert!(!store.contains_key("/v1/product/42"));
}

#[tokio::test]
async fn test_invalid_body_rejected_and_still_invalidates() {
    let (app, store) = setup();
    create(&app, "product", "Laptop").await;
    send(&app, Method::GET, "/v1/product").await;
    assert!(store.contains_key("/v1/product"));

    let (status, _) =
        read_json(send_json(&app, Method::POST, "/v1/product", json!({ "name": "" })).await).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!store.contains_key("/v1/product"));
}

#[tokio::test]
async fn test_filtered_list_keyed_by_sorted_query() {
    let (app, store) = setup();
    create(&app, "product", "Laptop").await;
    create(&app, "product", "Lamp").await;

    let (status, body) =
        read_json(send(&app, Method::GET, "/v1/product?name=lap&limit=5").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert!(store.contains_key("/v1/product?limit=5&name=lap"));
}

#[tokio::test]
async fn test_outdoors_family_served_live() {
    let (app, store) = setup();
    create(&app, "session", "current").await;

    let (status, body) = read_json(send(&app, Method::GET, "/v1/session").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert!(store.is_empty());
}
