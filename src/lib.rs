//! # category-catalog
//!
//! A REST catalog of hierarchical product categories on Axum and Sea-ORM.
//!
//! - [`store::CategoryStore`] creates, updates, saves (optionally deferred),
//!   finds and removes categories while keeping the tree acyclic
//! - [`filtering`] parses `search` expressions and pagination parameters
//! - [`hal`] wraps list results in a HAL envelope with navigation links
//! - [`routes`] exposes everything under `/api/rest/v1/categories`
//!
//! ```rust,no_run
//! use category_catalog::{AppConfig, build_router, migration::Migrator, store::CategoryStore};
//! use sea_orm::Database;
//! use sea_orm_migration::MigratorTrait;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let db = Database::connect(&config.database_url).await?;
//! Migrator::up(&db, None).await?;
//!
//! let store = CategoryStore::new(db).with_removal_policy(config.removal_policy);
//! let app = build_router(store, &config)?;
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entity;
pub mod errors;
pub mod filtering;
pub mod hal;
pub mod migration;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use url::Url;

pub use config::{AppConfig, ConfigError};
pub use errors::ApiError;
pub use models::{Category, CategoryUpdate};
pub use routes::AppState;
pub use store::{CategoryStore, RemovalPolicy, SaveOptions};

/// Build the application router around `store`.
///
/// Links in responses are rooted at `config.public_base_url`.
///
/// # Errors
///
/// Fails when the public base URL cannot be parsed.
pub fn build_router(store: CategoryStore, config: &AppConfig) -> Result<Router, url::ParseError> {
    let base = Url::parse(&config.public_base_url)?;
    let routes = hal::CategoryRoutes::new(
        &base,
        &format!("{}{}", routes::API_PREFIX, routes::CATEGORIES_PATH),
    )?;

    Ok(routes::category_router(AppState {
        store,
        routes: Arc::new(routes),
        pagination: config.pagination,
    }))
}
