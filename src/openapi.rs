use utoipa::OpenApi;

use crate::models::{Category, CategoryUpdate, ListQuery};
use crate::routes;

/// OpenAPI document served at `/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Category catalog API",
        description = "Hierarchical product categories with HAL pagination"
    ),
    paths(
        routes::list_categories,
        routes::get_category,
        routes::create_category,
        routes::update_category,
        routes::delete_category,
        routes::openapi_json,
    ),
    components(schemas(Category, CategoryUpdate, ListQuery)),
    tags(
        (name = "categories", description = "Category tree management"),
        (name = "meta", description = "API description")
    )
)]
pub struct ApiDoc;
