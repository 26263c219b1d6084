//! Application error taxonomy.
//!
//! Every use-case entry point returns `AppResult<T>`. The HTTP layer that
//! wraps this crate maps each variant to a status code via [`AppError::code`];
//! validation and business-rule failures additionally carry a field-path-keyed
//! map of sub-errors (e.g. `"hobbies.0": ["every value must be unique"]`).

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Field-path-keyed sub-errors for validation failures.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("authentication required")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    #[error("{message}")]
    Unprocessable { message: String, fields: FieldErrors },

    #[error("operation timed out")]
    Timeout,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Validation error with no per-field detail.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields: FieldErrors::new(),
        }
    }

    /// Validation error for a single field.
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), vec![message.clone()]);
        AppError::Validation { message, fields }
    }

    /// Business-rule violation with per-field detail.
    pub fn unprocessable(message: impl Into<String>, fields: FieldErrors) -> Self {
        AppError::Unprocessable {
            message: message.into(),
            fields,
        }
    }

    /// The error produced by a malformed pagination cursor. Kept in one place
    /// so callers can assert on it distinctly from other validation failures.
    pub fn invalid_cursor() -> Self {
        AppError::validation("invalid cursor format")
    }

    /// Stable machine-readable code for the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation { .. } => "BAD_REQUEST",
            AppError::Unprocessable { .. } => "UNPROCESSABLE_ENTITY",
            AppError::Timeout => "TIMEOUT",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Wire-shaped body for the HTTP layer.
    pub fn to_body(&self) -> ErrorBody {
        let fields = match self {
            AppError::Validation { fields, .. } | AppError::Unprocessable { fields, .. } => {
                fields.clone()
            }
            _ => FieldErrors::new(),
        };
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            fields,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("record"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(db.message().to_string())
            }
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

/// Serialized error shape returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FieldErrors,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AppError::NotFound("match").code(), "NOT_FOUND");
        assert_eq!(AppError::Forbidden("nope").code(), "FORBIDDEN");
        assert_eq!(AppError::Unauthorized.code(), "UNAUTHORIZED");
        assert_eq!(AppError::Conflict("dup".into()).code(), "CONFLICT");
        assert_eq!(AppError::validation("bad").code(), "BAD_REQUEST");
        assert_eq!(AppError::Timeout.code(), "TIMEOUT");
    }

    #[test]
    fn test_invalid_cursor_is_distinct() {
        let err = AppError::invalid_cursor();
        assert_eq!(err.to_string(), "invalid cursor format");
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_body_includes_field_errors() {
        let mut fields = FieldErrors::new();
        fields.insert("hobbies.0".into(), vec!["every value must be unique".into()]);
        let err = AppError::unprocessable("invalid interests", fields);
        let body = err.to_body();
        assert_eq!(body.code, "UNPROCESSABLE_ENTITY");
        assert_eq!(
            body.fields.get("hobbies.0").unwrap(),
            &vec!["every value must be unique".to_string()]
        );
    }
}
