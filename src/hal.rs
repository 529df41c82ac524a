//! # HAL Responses
//!
//! Wraps list results in the hypermedia envelope the catalog API returns:
//!
//! ```json
//! {
//!   "_links": {
//!     "self":  {"href": "http://localhost/api/rest/v1/categories?page=1&limit=10&with_count=false"},
//!     "first": {"href": "http://localhost/api/rest/v1/categories?page=1&limit=10&with_count=false"}
//!   },
//!   "current_page": 1,
//!   "_embedded": {"items": [{"_links": {"self": {"href": "..."}}, "code": "master", "parent": null, "labels": {}}]}
//! }
//! ```
//!
//! `previous` appears after page 1, `next` only when more items exist, and
//! `items_count` only when the client asked for it.

use serde::Serialize;
use url::Url;

use crate::filtering::{Pagination, SearchFilter};
use crate::models::Category;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
}

/// Links of a single embedded item
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
}

/// Navigation links of a collection page
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub first: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
}

/// A resource decorated with its own `_links`
#[derive(Clone, Debug, Serialize)]
pub struct HalItem<T> {
    #[serde(rename = "_links")]
    pub links: ItemLinks,
    #[serde(flatten)]
    pub item: T,
}

#[derive(Clone, Debug, Serialize)]
pub struct Embedded<T> {
    pub items: Vec<T>,
}

/// A paginated collection envelope
#[derive(Clone, Debug, Serialize)]
pub struct HalCollection<T> {
    #[serde(rename = "_links")]
    pub links: CollectionLinks,
    pub current_page: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_count: Option<u64>,
    #[serde(rename = "_embedded")]
    pub embedded: Embedded<T>,
}

/// One page of results as returned by the query engine
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    /// Only computed when the request set `with_count=true`
    pub items_count: Option<u64>,
}

/// Builds absolute URLs for the category routes.
#[derive(Clone, Debug)]
pub struct CategoryRoutes {
    collection: Url,
}

impl CategoryRoutes {
    /// `base` is the public origin (e.g. `http://localhost`), `collection_path`
    /// the route of the collection below it.
    ///
    /// # Errors
    ///
    /// Fails when the joined URL cannot be parsed.
    pub fn new(base: &Url, collection_path: &str) -> Result<Self, url::ParseError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let collection = base.join(collection_path.trim_start_matches('/'))?;
        Ok(Self { collection })
    }

    /// URL of one page of the collection
    #[must_use]
    pub fn collection_href(
        &self,
        page: u64,
        limit: u64,
        with_count: bool,
        search: Option<&str>,
    ) -> String {
        let mut url = self.collection.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &page.to_string())
                .append_pair("limit", &limit.to_string())
                .append_pair("with_count", if with_count { "true" } else { "false" });
            if let Some(search) = search {
                pairs.append_pair("search", search);
            }
        }
        url.into()
    }

    /// URL of a single category
    #[must_use]
    pub fn item_href(&self, code: &str) -> String {
        let mut url = self.collection.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(code);
        }
        url.into()
    }

    #[must_use]
    pub fn category(&self, category: Category) -> HalItem<Category> {
        HalItem {
            links: ItemLinks {
                self_link: Link {
                    href: self.item_href(&category.code),
                },
            },
            item: category,
        }
    }

    /// Wrap a page of categories in the collection envelope
    #[must_use]
    pub fn collection(
        &self,
        page: Page<Category>,
        pagination: &Pagination,
        filter: &SearchFilter,
    ) -> HalCollection<HalItem<Category>> {
        let search = filter.to_query_value();
        let href = |page_number: u64| Link {
            href: self.collection_href(
                page_number,
                pagination.limit,
                pagination.with_count,
                search.as_deref(),
            ),
        };

        let links = CollectionLinks {
            self_link: href(pagination.page),
            first: href(1),
            previous: (pagination.page > 1).then(|| href(pagination.page - 1)),
            next: page.has_next.then(|| href(pagination.page + 1)),
        };

        HalCollection {
            links,
            current_page: pagination.page,
            items_count: page.items_count,
            embedded: Embedded {
                items: page
                    .items
                    .into_iter()
                    .map(|category| self.category(category))
                    .collect(),
            },
        }
    }
}
