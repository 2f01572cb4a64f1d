//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use grabi::domain::{Category, Listing, Subcategory};
use grabi::{api, AppState, MemoryStore, ServiceSettings};

pub fn category(name: &str, sort_order: i32) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        icon: "tag".to_string(),
        description: None,
        is_active: true,
        sort_order,
    }
}

pub fn subcategory(parent: &Category, name: &str, sort_order: i32) -> Subcategory {
    Subcategory {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: None,
        is_active: true,
        sort_order,
        category_id: parent.id,
    }
}

pub fn listing(title: &str, category_id: Option<Uuid>, posted_at: DateTime<Utc>) -> Listing {
    Listing {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        price: dec!(12500),
        location: "Constantine".to_string(),
        image_url: "/uploads/listing.jpg".to_string(),
        posted_at,
        condition: "good".to_string(),
        seller_id: Uuid::new_v4(),
        category_id,
        subcategory_id: None,
    }
}

/// Store with two categories (Home before Vehicles), Home's subcategories
/// seeded out of order, and one listing per category
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();

    let vehicles = category("Vehicles", 2);
    let home = category("Home", 1);
    store.insert_category(vehicles.clone()).await;
    store.insert_category(home.clone()).await;

    store
        .insert_subcategory(subcategory(&home, "A", 1))
        .await
        .expect("seed subcategory A");
    store
        .insert_subcategory(subcategory(&home, "B", 0))
        .await
        .expect("seed subcategory B");
    store
        .insert_subcategory(subcategory(&vehicles, "Cars", 0))
        .await
        .expect("seed subcategory Cars");

    store.insert_listing(listing("Sofa 3 places", Some(home.id), now)).await;
    store
        .insert_listing(listing("Golf 7 TDI", Some(vehicles.id), now - chrono::Duration::hours(2)))
        .await;

    store
}

pub fn app(store: Arc<MemoryStore>, settings: ServiceSettings) -> Router {
    api::build_router(AppState::new(store, settings), None).expect("router")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
