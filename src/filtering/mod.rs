//! # Search & Pagination
//!
//! Turns the list endpoint's query string into something the store can run:
//!
//! - [`SearchFilter`] parses the JSON `search` parameter into typed criteria
//! - [`apply_filters`] converts those criteria into a sea-orm `Condition`
//! - [`parse_pagination`] validates `page`, `limit` and `with_count`
//!
//! ```text
//! GET /api/rest/v1/categories?search={"parent":[{"operator":"EMPTY"}]}&page=1&limit=10
//! ```
//!
//! | Field     | Operators                                   | Value              |
//! |-----------|---------------------------------------------|--------------------|
//! | `parent`  | `EMPTY`, `NOT EMPTY`                        | none               |
//! | `parent`  | `=`, `!=`                                   | category code      |
//! | `parent`  | `IN`, `NOT IN`                              | array of codes     |
//! | `code`    | `IN`, `NOT IN`                              | array of codes     |
//! | `is_root` | `=`                                         | boolean            |

pub mod conditions;
pub mod pagination;
pub mod search;

pub use conditions::apply_filters;
pub use pagination::{Pagination, PaginationConfig, parse_pagination};
pub use search::{Criterion, SearchFilter};
