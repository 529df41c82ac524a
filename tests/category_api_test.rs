use axum::http::{StatusCode, header};
use category_catalog::RemovalPolicy;
use serde_json::json;

mod common;
use common::{
    body_json, get, json_request, load_fixture_tree, send, setup_test_app, setup_test_store,
};

#[tokio::test]
async fn test_create_and_get_category() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/rest/v1/categories",
            &json!({"code": "shoes", "parent": "master", "labels": {"en_US": "Shoes"}}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://localhost/api/rest/v1/categories/shoes"
    );

    let response = send(&app, get("/api/rest/v1/categories/shoes")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"code": "shoes", "parent": "master", "labels": {"en_US": "Shoes"}})
    );
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let response = send(
        &app,
        json_request("POST", "/api/rest/v1/categories", &json!({"code": "master"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "A category with code \"master\" already exists."
    );
}

#[tokio::test]
async fn test_create_invalid_category() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/rest/v1/categories",
            &json!({"code": "", "parent": "nowhere"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["details"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_bodies() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/rest/v1/categories")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{\"code\":"))
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/rest/v1/categories",
            &json!({"code": "shoes", "colour": "red"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_unknown_category() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let response = send(&app, get("/api/rest/v1/categories/ghost")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Category \"ghost\" does not exist."})
    );
}

#[tokio::test]
async fn test_patch_creates_then_updates() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let response = send(
        &app,
        json_request(
            "PATCH",
            "/api/rest/v1/categories/tree1",
            &json!({"labels": {"en_US": "Tree 1"}}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://localhost/api/rest/v1/categories/tree1"
    );

    let response = send(
        &app,
        json_request(
            "PATCH",
            "/api/rest/v1/categories/tree1",
            &json!({"parent": "master", "labels": {"fr_FR": "Arbre 1"}}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = body_json(send(&app, get("/api/rest/v1/categories/tree1")).await).await;
    assert_eq!(
        body,
        json!({
            "code": "tree1",
            "parent": "master",
            "labels": {"en_US": "Tree 1", "fr_FR": "Arbre 1"}
        })
    );

    let response = send(
        &app,
        json_request("PATCH", "/api/rest/v1/categories/tree1", &json!({"parent": null})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let body = body_json(send(&app, get("/api/rest/v1/categories/tree1")).await).await;
    assert_eq!(body["parent"], json!(null));
}

#[tokio::test]
async fn test_patch_code_mismatch() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let response = send(
        &app,
        json_request("PATCH", "/api/rest/v1/categories/tree1", &json!({"code": "tree2"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"],
        "The code \"tree2\" provided in the request body must match the code \"tree1\" provided in the url."
    );
}

#[tokio::test]
async fn test_patch_rejects_cycle() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    load_fixture_tree(&store).await;
    let app = setup_test_app(store);

    let response = send(
        &app,
        json_request("PATCH", "/api/rest/v1/categories/tree1", &json!({"parent": "leaf2"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_cascades() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    load_fixture_tree(&store).await;
    let app = setup_test_app(store);

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri("/api/rest/v1/categories/tree2")
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(send(&app, request).await.status(), StatusCode::NO_CONTENT);

    for code in ["tree2", "leaf3"] {
        let response = send(&app, get(&format!("/api/rest/v1/categories/{code}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{code}");
    }
}

#[tokio::test]
async fn test_delete_with_restrict_policy() {
    let store = setup_test_store(RemovalPolicy::Restrict).await;
    load_fixture_tree(&store).await;
    let app = setup_test_app(store);

    let delete = |code: &str| {
        axum::http::Request::builder()
            .method("DELETE")
            .uri(format!("/api/rest/v1/categories/{code}"))
            .body(axum::body::Body::empty())
            .unwrap()
    };

    let response = send(&app, delete("tree2")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Category \"tree2\" cannot be removed because it has children."
    );

    assert_eq!(send(&app, delete("leaf3")).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&app, delete("tree2")).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&app, delete("tree2")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_master_is_conflict() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let request = axum::http::Request::builder()
        .method("DELETE")
        .uri("/api/rest/v1/categories/master")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Category \"master\" cannot be removed."
    );

    let response = send(&app, get("/api/rest/v1/categories/master")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document() {
    let store = setup_test_store(RemovalPolicy::Cascade).await;
    let app = setup_test_app(store);

    let response = send(&app, get("/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/api/rest/v1/categories"]["get"].is_object());
    assert!(body["paths"]["/api/rest/v1/categories/{code}"]["patch"].is_object());
}
