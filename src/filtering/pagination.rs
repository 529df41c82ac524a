use crate::errors::ApiError;
use crate::models::ListQuery;

/// Page size bounds applied to list requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Validated paging parameters of a list request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
    pub with_count: bool,
}

impl Pagination {
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// Parse `page`, `limit` and `with_count` from the query string.
///
/// # Errors
///
/// Returns `ValidationFailed` for non-positive or non-numeric page/limit, a
/// limit above `config.max_limit`, a page whose offset cannot be addressed,
/// or a `with_count` other than `true`/`false`.
pub fn parse_pagination(
    params: &ListQuery,
    config: &PaginationConfig,
) -> Result<Pagination, ApiError> {
    let page = parse_positive(params.page.as_deref(), 1)
        .map_err(|raw| ApiError::invalid(format!("\"{raw}\" is not a valid page number.")))?;

    let limit = parse_positive(params.limit.as_deref(), config.default_limit)
        .map_err(|raw| ApiError::invalid(format!("\"{raw}\" is not a valid limit number.")))?;
    if limit > config.max_limit {
        return Err(ApiError::invalid(format!(
            "You cannot request more than {} items.",
            config.max_limit
        )));
    }

    // SQLite binds OFFSET as a signed 64-bit integer
    let addressable = (page - 1)
        .checked_mul(limit)
        .is_some_and(|offset| i64::try_from(offset).is_ok());
    if !addressable {
        return Err(ApiError::invalid(format!(
            "\"{page}\" is not a valid page number."
        )));
    }

    let with_count = match params.with_count.as_deref() {
        None | Some("false") => false,
        Some("true") => true,
        Some(other) => {
            return Err(ApiError::invalid(format!(
                "Parameter \"with_count\" has to be a boolean. Only \"true\" or \"false\" allowed, \"{other}\" given."
            )));
        }
    };

    Ok(Pagination {
        page,
        limit,
        with_count,
    })
}

/// Parse a strictly positive integer, handing back the raw text on failure
fn parse_positive(raw: Option<&str>, default: u64) -> Result<u64, String> {
    match raw {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(raw.to_string()),
        },
    }
}
