use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use utoipa::OpenApi;

use crate::errors::ApiError;
use crate::filtering::{PaginationConfig, SearchFilter, parse_pagination};
use crate::hal::{CategoryRoutes, HalCollection, HalItem};
use crate::models::{Category, CategoryUpdate, ListQuery};
use crate::openapi::ApiDoc;
use crate::store::{CategoryStore, SaveOptions};

/// Prefix every catalog route is nested under
pub const API_PREFIX: &str = "/api/rest/v1";

/// Collection route below [`API_PREFIX`]
pub const CATEGORIES_PATH: &str = "/categories";

/// Shared state of the catalog handlers
#[derive(Clone)]
pub struct AppState {
    pub store: CategoryStore,
    pub routes: Arc<CategoryRoutes>,
    pub pagination: PaginationConfig,
}

/// Category routes nested under [`API_PREFIX`], plus `/openapi.json`.
pub fn category_router(state: AppState) -> Router {
    let api = Router::new()
        .route(CATEGORIES_PATH, get(list_categories).post(create_category))
        .route(
            &format!("{CATEGORIES_PATH}/{{code}}"),
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
}

fn json_body(body: Result<Json<CategoryUpdate>, JsonRejection>) -> Result<CategoryUpdate, ApiError> {
    match body {
        Ok(Json(update)) => Ok(update),
        Err(JsonRejection::JsonDataError(err)) => Err(ApiError::invalid(err.body_text())),
        Err(err) => Err(ApiError::bad_request(err.body_text())),
    }
}

fn location(state: &AppState, code: &str) -> Result<[(header::HeaderName, HeaderValue); 1], ApiError> {
    let href = state.routes.item_href(code);
    let value = HeaderValue::from_str(&href).map_err(|err| {
        ApiError::internal("Could not build the resource location", Some(err.to_string()))
    })?;
    Ok([(header::LOCATION, value)])
}

/// List categories, optionally filtered, as a HAL collection.
#[utoipa::path(
    get,
    path = "/api/rest/v1/categories",
    params(ListQuery),
    responses(
        (status = 200, description = "HAL collection: `_links` (self, first, previous, next), `current_page`, optional `items_count` and `_embedded.items`"),
        (status = 400, description = "Search is not valid JSON"),
        (status = 422, description = "Unsupported filter, or invalid page, limit or with_count")
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<HalCollection<HalItem<Category>>>, ApiError> {
    let Query(params) = query.map_err(|err| ApiError::bad_request(err.body_text()))?;

    let pagination = parse_pagination(&params, &state.pagination)?;
    let filter = SearchFilter::from_query(params.search.as_deref())?;
    let page = state.store.search(&filter, &pagination).await?;

    Ok(Json(state.routes.collection(page, &pagination, &filter)))
}

#[utoipa::path(
    get,
    path = "/api/rest/v1/categories/{code}",
    params(("code" = String, Path, description = "Category code")),
    responses(
        (status = 200, description = "The category", body = Category),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .store
        .find_one_by_identifier(&code)
        .await?
        .ok_or_else(|| ApiError::category_not_found(&code))?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/api/rest/v1/categories",
    request_body = CategoryUpdate,
    responses(
        (status = 201, description = "Category created, `Location` points to it"),
        (status = 400, description = "Malformed body"),
        (status = 409, description = "A category with this code already exists"),
        (status = 422, description = "Invalid category")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    body: Result<Json<CategoryUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let update = json_body(body)?;

    let mut category = CategoryStore::create();
    state.store.update(&mut category, update).await?;
    if state
        .store
        .find_one_by_identifier(&category.code)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(format!(
            "A category with code \"{}\" already exists.",
            category.code
        )));
    }
    state.store.save(&category, SaveOptions::default()).await?;

    Ok((StatusCode::CREATED, location(&state, &category.code)?))
}

/// Update a category, creating it when the code is unknown.
#[utoipa::path(
    patch,
    path = "/api/rest/v1/categories/{code}",
    params(("code" = String, Path, description = "Category code")),
    request_body = CategoryUpdate,
    responses(
        (status = 201, description = "Category created"),
        (status = 204, description = "Category updated"),
        (status = 400, description = "Malformed body"),
        (status = 422, description = "Invalid update, or body code differs from the URL")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(code): Path<String>,
    body: Result<Json<CategoryUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut update = json_body(body)?;
    if let Some(body_code) = &update.code
        && body_code != &code
    {
        return Err(ApiError::invalid(format!(
            "The code \"{body_code}\" provided in the request body must match the code \"{code}\" provided in the url."
        )));
    }
    update.code = Some(code.clone());

    let existing = state.store.find_one_by_identifier(&code).await?;
    let status = if existing.is_some() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CREATED
    };
    let mut category = existing.unwrap_or_else(CategoryStore::create);

    state.store.update(&mut category, update).await?;
    state.store.save(&category, SaveOptions::default()).await?;

    Ok((status, location(&state, &category.code)?))
}

/// Remove a category; children follow the configured removal policy.
#[utoipa::path(
    delete,
    path = "/api/rest/v1/categories/{code}",
    params(("code" = String, Path, description = "Category code")),
    responses(
        (status = 204, description = "Category removed"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category has children and removal is restricted")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    let category = state
        .store
        .find_one_by_identifier(&code)
        .await?
        .ok_or_else(|| ApiError::category_not_found(&code))?;
    state.store.remove(&category).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/openapi.json",
    responses((status = 200, description = "OpenAPI document of this API")),
    tag = "meta"
)]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
