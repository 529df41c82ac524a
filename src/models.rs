use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::entity::category;

/// A category as the API exposes it.
///
/// Two categories are equal when code, parent and labels match; storage
/// identity is not part of the value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Unique identifier
    #[schema(example = "tree1")]
    pub code: String,
    /// Code of the parent category, `null` for a tree root
    pub parent: Option<String>,
    /// Locale code to label
    #[schema(value_type = Object, example = json!({"en_US": "Master catalog"}))]
    pub labels: BTreeMap<String, String>,
}

impl Category {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl From<category::Model> for Category {
    fn from(model: category::Model) -> Self {
        // Rows are only ever written from a `BTreeMap<String, String>`
        let labels = serde_json::from_value(model.labels).unwrap_or_else(|err| {
            tracing::warn!(code = %model.code, error = %err, "Ignoring unreadable labels");
            BTreeMap::new()
        });
        Self {
            code: model.code,
            parent: model.parent,
            labels,
        }
    }
}

/// Field changes applied by the category updater.
///
/// Absent fields are left untouched. `"parent": null` turns the category into
/// a root, and a `null` or empty label removes that locale.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub parent: Option<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub labels: Option<BTreeMap<String, Option<String>>>,
}

impl CategoryUpdate {
    /// Update setting only the code and parent, the shape fixtures load with
    #[must_use]
    pub fn with_parent(code: &str, parent: Option<&str>) -> Self {
        Self {
            code: Some(code.to_string()),
            parent: Some(parent.map(ToString::to_string)),
            labels: None,
        }
    }

    #[must_use]
    pub fn label(mut self, locale: &str, label: &str) -> Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(locale.to_string(), Some(label.to_string()));
        self
    }
}

/// Query parameters of the category list endpoint.
///
/// All values arrive as raw strings so that invalid input becomes a
/// descriptive 422 instead of a generic extractor rejection.
///
/// # Search
/// `search` is a JSON object mapping a field to a list of conditions:
/// ```json
/// {"parent":[{"operator":"EMPTY"}]}
/// ```
///
/// # Pagination
/// `page` is 1-based, `limit` is the page size, and `with_count=true` adds
/// `items_count` to the response at the cost of a count query.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// JSON-encoded search filter.
    #[param(example = json!({"parent": [{"operator": "EMPTY"}]}))]
    pub search: Option<String>,
    /// Page number (1-based).
    #[param(example = "1")]
    pub page: Option<String>,
    /// Number of items per page.
    #[param(example = "10")]
    pub limit: Option<String>,
    /// `true` to compute the total number of matching categories.
    #[param(example = "false")]
    pub with_count: Option<String>,
}
