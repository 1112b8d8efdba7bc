use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::db::DatabaseError;

/// One field-level validation message, reported alongside the error body.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error")]
    Validation(Vec<FieldError>),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested (counselor, date, time) is no longer free. Reported
    /// distinctly from validation so the client re-fetches available slots.
    #[error("Requested slot is no longer available")]
    SlotConflict,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(flatten_validation_errors(&errors))
    }
}

pub fn flatten_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is not valid", field));
                FieldError::new(field.to_string(), message)
            })
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Database(err) => match err {
                DatabaseError::NotFound => {
                    (StatusCode::NOT_FOUND, "not_found", "Resource not found")
                }
                DatabaseError::Duplicate => {
                    (StatusCode::CONFLICT, "conflict", "Resource already exists")
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal server error occurred",
                ),
            },
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Validation error",
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", "Resource not found"),
            AppError::SlotConflict => (
                StatusCode::CONFLICT,
                "slot_conflict",
                "The requested slot is no longer available",
            ),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict", "Resource conflict"),
            AppError::Unauthorized(_) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Administrator access required",
            ),
        };

        let fields = match &self {
            AppError::Validation(fields) => fields.clone(),
            _ => Vec::new(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "details": self.to_string(),
                "fields": fields,
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_error_taxonomy() {
        let cases = [
            (
                AppError::Validation(vec![FieldError::new("name", "Name is required")]),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound("counselor not found".into()),
                StatusCode::NOT_FOUND,
            ),
            (AppError::SlotConflict, StatusCode::CONFLICT),
            (
                AppError::Unauthorized("missing token".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Database(DatabaseError::Duplicate),
                StatusCode::CONFLICT,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
