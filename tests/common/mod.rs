#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use category_catalog::{
    AppConfig, Category, CategoryStore, CategoryUpdate, RemovalPolicy, SaveOptions, build_router,
    migration::Migrator,
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::ServiceExt;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Creates the table and seeds `master`
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub async fn setup_test_store(policy: RemovalPolicy) -> CategoryStore {
    let db = setup_test_db()
        .await
        .expect("Failed to setup test database");
    CategoryStore::new(db).with_removal_policy(policy)
}

pub fn setup_test_app(store: CategoryStore) -> Router {
    build_router(store, &AppConfig::default()).expect("Failed to build router")
}

/// Create, update and stage a category; nothing is committed until `flush`
pub async fn load_category(store: &CategoryStore, code: &str, parent: Option<&str>) -> Category {
    let mut category = CategoryStore::create();
    store
        .update(&mut category, CategoryUpdate::with_parent(code, parent))
        .await
        .expect("Failed to update category");
    store
        .save(&category, SaveOptions::DEFERRED)
        .await
        .expect("Failed to stage category");
    category
}

/// The forest used across list tests, committed in one flush:
///
/// ```text
/// master
/// tree1 ── parent1 ── leaf1
///       └─ parent2 ── leaf2
/// tree2 ── leaf3
/// ```
pub async fn load_fixture_tree(store: &CategoryStore) {
    for (code, parent) in [
        ("tree1", None),
        ("tree2", None),
        ("parent1", Some("tree1")),
        ("parent2", Some("tree1")),
        ("leaf1", Some("parent1")),
        ("leaf2", Some("parent2")),
        ("leaf3", Some("tree2")),
    ] {
        load_category(store, code, parent).await;
    }
    store.flush().await.expect("Failed to flush fixtures");
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Form-encode a search expression for a query string
pub fn encode_search(search: &str) -> String {
    url::form_urlencoded::byte_serialize(search.as_bytes()).collect()
}
