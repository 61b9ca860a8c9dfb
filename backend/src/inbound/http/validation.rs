//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{Error, RecipeValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidId,
    InvalidFlag,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidFlag => "invalid_flag",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }

    fn with_index(self, code: ErrorCode, index: usize, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "index": index,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn invalid_id_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a comma-separated list of integer ids"))
        .with_index(ErrorCode::InvalidId, index, value)
}

pub(crate) fn invalid_flag_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be one of 1, 0, true or false"))
        .with_value(ErrorCode::InvalidFlag, value)
}

/// Parse a comma-separated id list such as `1,2,3`.
///
/// An empty string yields an empty list, which filters out every recipe on
/// that axis.
pub(crate) fn parse_id_list<T: FromStr>(raw: &str, field: FieldName) -> Result<Vec<T>, Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .enumerate()
        .map(|(index, value)| {
            value
                .trim()
                .parse()
                .map_err(|_| invalid_id_index_error(field, index, value))
        })
        .collect()
}

/// Parse an optional `1|0|true|false` query flag; absent means `false`.
pub(crate) fn parse_flag(raw: Option<&str>, field: FieldName) -> Result<bool, Error> {
    match raw.map(str::trim) {
        None => Ok(false),
        Some(value) if value == "1" || value.eq_ignore_ascii_case("true") => Ok(true),
        Some(value) if value == "0" || value.eq_ignore_ascii_case("false") => Ok(false),
        Some(value) => Err(invalid_flag_error(field, value)),
    }
}

/// Map recipe field validation failures onto the JSON field names clients
/// send.
pub(crate) fn map_recipe_validation(error: RecipeValidationError) -> Error {
    let (field, code) = match error {
        RecipeValidationError::EmptyTitle => ("title", "required"),
        RecipeValidationError::TitleTooLong { .. } => ("title", "too_long"),
        RecipeValidationError::InvalidTimeMinutes { .. } => ("timeMinutes", "invalid_time"),
        RecipeValidationError::InvalidPrice { .. } => ("price", "invalid_price"),
        RecipeValidationError::PriceOutOfRange { .. } => ("price", "out_of_range"),
    };
    Error::invalid_field(field, code, error.to_string())
}
