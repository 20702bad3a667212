use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response for 400/404/500 failures.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description.
    #[schema(example = "Post not found")]
    pub error: String,
}

/// Error response for 422 validation failures: messages grouped per field.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationErrorBody {
    #[schema(example = "The given data was invalid")]
    pub message: String,
    /// Violated rules, keyed by input field name.
    pub errors: BTreeMap<String, Vec<String>>,
}

/// A single violated validation rule.
#[derive(Debug)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// One or more input fields violated a validation rule.
    Validation(Vec<FieldError>),
    /// The request body could not be decoded at all.
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(field_errors) => {
                let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for fe in field_errors {
                    errors.entry(fe.field.to_string()).or_default().push(fe.message);
                }
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ValidationErrorBody {
                        message: "The given data was invalid".into(),
                        errors,
                    }),
                )
                    .into_response()
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error: msg })).into_response()
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody { error: msg })).into_response()
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "An unexpected error occurred".into(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(err.to_string())
    }
}
