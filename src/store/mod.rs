//! The category store and its query engine.
//!
//! [`CategoryStore`] owns the create → update → save lifecycle, deferred
//! flushing and removal; [`list_categories`] runs a validated search against
//! committed rows.

pub mod category_store;
pub mod query;

pub use category_store::{CategoryStore, RemovalPolicy, SaveOptions};
pub use query::list_categories;
