//! Validation Support
//!
//! Field-level validation for category updates. Errors are collected into
//! [`ValidationErrors`] so a single 422 response can list every problem.

use serde::Serialize;
use std::fmt;

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error of a validator result, if any
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(error) = result {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was collected.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Helper validators for category fields
pub mod validators {
    use super::ValidationError;

    /// Longest code the catalog accepts
    pub const MAX_CODE_LENGTH: usize = 100;

    /// Validate value is not empty
    ///
    /// # Errors
    ///
    /// Fails when the value is blank.
    pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new(field, "This value should not be blank."));
        }
        Ok(())
    }

    /// Validate a category code: letters, digits and underscores only
    ///
    /// # Errors
    ///
    /// Fails on blank, overlong or non-alphanumeric codes.
    pub fn validate_code(field: &str, value: &str) -> Result<(), ValidationError> {
        validate_required(field, value)?;

        if value.len() > MAX_CODE_LENGTH {
            return Err(ValidationError::new(
                field,
                format!("This value is too long. It should have {MAX_CODE_LENGTH} characters or less."),
            ));
        }

        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ValidationError::new(
                field,
                "Category code may contain only letters, numbers and underscores",
            ));
        }

        Ok(())
    }
}
