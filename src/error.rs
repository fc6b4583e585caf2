//! Error handler for matina.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

const GENERIC_INTERNAL: &str = "internal server error";

/// Enum representing server-side errors.
///
/// Only two kinds are domain errors proper — [`ServerError::BadRequest`]
/// (input shape violations and natural-key conflicts) and
/// [`ServerError::NotFound`]. The rest cover the transport and
/// infrastructure boundaries.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error("invalid or expired token")]
    TokenInvalid(#[from] jsonwebtoken::errors::Error),

    #[error("invalid credentials")]
    Unauthorized,

    #[error("SQL request failed: {0}")]
    Sql(#[from] SqlxError),

    #[error(transparent)]
    Hash(#[from] crate::crypto::CryptoError),

    #[error("internal server error, {details}")]
    Internal { details: String },
}

impl ServerError {
    /// Transport status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) | Self::Json(_) => {
                StatusCode::BAD_REQUEST
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::TokenInvalid(_) | Self::Unauthorized => {
                StatusCode::UNAUTHORIZED
            },
            Self::Sql(_) | Self::Hash(_) | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

/// Structure for error responses: `{"message": ..., "status": ...}`.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    message: String,
    status: String,
}

impl ResponseError {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status: status_label(status),
        }
    }
}

/// Translate a unique-constraint violation into the conflict error the
/// existence pre-check would have produced. Backstop for concurrent writes
/// racing past the check.
pub(crate) fn conflict_on_unique(
    message: &'static str,
) -> impl Fn(SqlxError) -> ServerError {
    move |err| match err.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            ServerError::BadRequest(message.to_owned())
        },
        _ => ServerError::Sql(err),
    }
}

/// Upper-snake rendering of the HTTP reason, e.g. `400` → `"BAD_REQUEST"`.
fn status_label(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unknown")
        .to_uppercase()
        .replace(' ', "_")
}

fn flatten_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| match &issue.message {
                Some(message) => message.to_string(),
                None => format!("invalid value for '{field}'"),
            })
        })
        .collect();

    // Field order is a hash map detail; keep the body deterministic.
    messages.sort();
    messages.join(" ")
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            ServerError::Validation(errors) => {
                flatten_validation_errors(errors)
            },
            ServerError::Json(rejection) => rejection.body_text(),
            ServerError::Sql(err) => {
                tracing::error!(error = %err, "sql request failed");
                GENERIC_INTERNAL.to_owned()
            },
            ServerError::Hash(err) => {
                tracing::error!(error = %err, "password hashing failed");
                GENERIC_INTERNAL.to_owned()
            },
            ServerError::Internal { details } => {
                tracing::error!(%details, "server returned 500 status");
                GENERIC_INTERNAL.to_owned()
            },
            other => other.to_string(),
        };

        (status, Json(ResponseError::new(message, status))).into_response()
    }
}
