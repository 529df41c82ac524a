//! # Error Handling for the Category API
//!
//! Every handler returns `Result<_, ApiError>`. The error:
//! - maps to the HTTP status the catalog API documents
//! - sends a sanitized message to the client
//! - logs internal details (database errors, lock failures) through `tracing`
//!
//! ```rust,ignore
//! use category_catalog::ApiError;
//!
//! async fn handler(State(state): State<AppState>, Path(code): Path<String>) -> Result<Json<Category>, ApiError> {
//!     let category = state
//!         .store
//!         .find_one_by_identifier(&code)
//!         .await?
//!         .ok_or_else(|| ApiError::category_not_found(&code))?;
//!     Ok(Json(category))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;

use crate::validation::ValidationErrors;

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - the category does not exist
    NotFound {
        /// Resource type (e.g. "Category")
        resource: String,
        /// Identifier that was looked up
        id: Option<String>,
    },

    /// 400 Bad Request - the request could not be read at all
    BadRequest {
        /// User-facing error message
        message: String,
    },

    /// 409 Conflict - the write clashes with existing data
    Conflict {
        /// User-facing error message
        message: String,
    },

    /// 422 Unprocessable Entity - the request was read but is invalid
    ValidationFailed {
        /// User-facing validation errors
        errors: Vec<String>,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl ApiError {
    /// Create a 404 Not Found error
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    /// 404 for a category code
    #[must_use]
    pub fn category_not_found(code: &str) -> Self {
        Self::not_found("Category", Some(code.to_string()))
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 409 Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a 422 Validation Failed error
    #[must_use]
    pub fn validation_failed(errors: Vec<String>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Single-message 422, the shape used by search and pagination parsing
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            errors: vec![message.into()],
        }
    }

    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Create a 500 Internal Server Error with optional details
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} \"{id}\" does not exist."),
                None => format!("{resource} not found"),
            },
            Self::ValidationFailed { errors } => {
                if let [single] = errors.as_slice() {
                    single.clone()
                } else {
                    format!("Validation failed: {}", errors.join(", "))
                }
            }
            Self::BadRequest { message }
            | Self::Conflict { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let response = match &self {
            Self::ValidationFailed { errors } if errors.len() > 1 => ErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.clone()),
            },
            _ => ErrorResponse {
                error: self.user_message(),
                details: None,
            },
        };

        (status, Json(response)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match &err {
            DbErr::RecordNotFound(msg) => Self::NotFound {
                resource: msg.clone(),
                id: None,
            },
            _ => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => {
                    tracing::debug!(detail = %detail, "Unique constraint violated");
                    Self::conflict("A category with this code already exists.")
                }
                _ => Self::database(err),
            },
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed {
            errors: errors.errors().iter().map(ToString::to_string).collect(),
        }
    }
}
