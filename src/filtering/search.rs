use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::ApiError;

/// One `{operator, value?}` entry exactly as the client sent it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCondition {
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// A validated search term over the category store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Criterion {
    ParentEmpty,
    ParentNotEmpty,
    ParentEquals(String),
    /// Also matches roots
    ParentNotEqual(String),
    ParentIn(Vec<String>),
    /// Also matches roots
    ParentNotIn(Vec<String>),
    CodeIn(Vec<String>),
    CodeNotIn(Vec<String>),
    IsRoot(bool),
}

/// Parsed `search` query parameter.
///
/// Keeps the normalized raw form so pagination links can carry the filter
/// forward, alongside the typed criteria the query engine consumes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchFilter {
    raw: BTreeMap<String, Vec<RawCondition>>,
    criteria: Vec<Criterion>,
}

impl SearchFilter {
    /// Parse the optional `search` parameter; a missing or blank value is no filter.
    ///
    /// # Errors
    ///
    /// `BadRequest` when the value is not JSON, `ValidationFailed` when the
    /// structure, field, operator or value is not supported.
    pub fn from_query(search: Option<&str>) -> Result<Self, ApiError> {
        match search.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(search) => Self::parse(search),
        }
    }

    /// Parse a JSON search expression such as `{"parent":[{"operator":"EMPTY"}]}`.
    ///
    /// # Errors
    ///
    /// See [`SearchFilter::from_query`].
    pub fn parse(search: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_str(search)
            .map_err(|_| ApiError::bad_request("Search query parameter should be valid JSON."))?;

        let Value::Object(fields) = value else {
            return Err(ApiError::invalid(
                "Search query parameter has to be an object.",
            ));
        };

        let mut filter = Self::default();
        for (field, conditions) in fields {
            let Value::Array(conditions) = conditions else {
                return Err(structure_error(&field));
            };

            let mut parsed = Vec::with_capacity(conditions.len());
            for condition in conditions {
                let raw: RawCondition =
                    serde_json::from_value(condition).map_err(|_| structure_error(&field))?;
                filter.criteria.push(to_criterion(&field, &raw)?);
                parsed.push(raw);
            }
            filter.raw.insert(field, parsed);
        }

        tracing::debug!(criteria = ?filter.criteria, "Parsed category search");
        Ok(filter)
    }

    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Compact JSON form for the `search` parameter of generated links
    #[must_use]
    pub fn to_query_value(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        serde_json::to_string(&self.raw).ok()
    }
}

fn structure_error(field: &str) -> ApiError {
    ApiError::invalid(format!(
        "Structure of filter \"{field}\" should respect this structure: \
         {{\"{field}\":[{{\"operator\": \"my_operator\", \"value\": \"my_value\"}}]}}"
    ))
}

fn unsupported(field: &str, operator: &str) -> ApiError {
    ApiError::invalid(format!(
        "Filter on property \"{field}\" is not supported or does not support operator \"{operator}\""
    ))
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn expect_string(field: &str, value: Option<&Value>) -> Result<String, ApiError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ApiError::invalid(format!(
            "Property \"{field}\" expects a string as data, \"{}\" given.",
            describe(value)
        ))),
    }
}

fn expect_string_list(field: &str, value: Option<&Value>) -> Result<Vec<String>, ApiError> {
    let error = || {
        ApiError::invalid(format!(
            "Property \"{field}\" expects a non-empty array of strings as data, \"{}\" given.",
            describe(value)
        ))
    };

    let Some(Value::Array(items)) = value else {
        return Err(error());
    };
    if items.is_empty() {
        return Err(error());
    }

    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(error))
        .collect()
}

fn expect_bool(field: &str, value: Option<&Value>) -> Result<bool, ApiError> {
    match value {
        Some(Value::Bool(flag)) => Ok(*flag),
        _ => Err(ApiError::invalid(format!(
            "Property \"{field}\" expects a boolean as data, \"{}\" given.",
            describe(value)
        ))),
    }
}

fn to_criterion(field: &str, condition: &RawCondition) -> Result<Criterion, ApiError> {
    let value = condition.value.as_ref();
    let criterion = match (field, condition.operator.as_str()) {
        ("parent", "EMPTY") => Criterion::ParentEmpty,
        ("parent", "NOT EMPTY") => Criterion::ParentNotEmpty,
        ("parent", "=") => Criterion::ParentEquals(expect_string(field, value)?),
        ("parent", "!=") => Criterion::ParentNotEqual(expect_string(field, value)?),
        ("parent", "IN") => Criterion::ParentIn(expect_string_list(field, value)?),
        ("parent", "NOT IN") => Criterion::ParentNotIn(expect_string_list(field, value)?),
        ("code", "IN") => Criterion::CodeIn(expect_string_list(field, value)?),
        ("code", "NOT IN") => Criterion::CodeNotIn(expect_string_list(field, value)?),
        ("is_root", "=") => Criterion::IsRoot(expect_bool(field, value)?),
        (field, operator) => return Err(unsupported(field, operator)),
    };
    Ok(criterion)
}
