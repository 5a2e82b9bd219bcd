use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum HotlineError {
    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("slug already in use: {0}")]
    DuplicateSlug(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("malformed value in column `{column}`: {reason}")]
    MalformedColumn {
        column: &'static str,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid request body: {0}")]
    BadRequest(String),

    #[error("invalid or missing API key")]
    Unauthorized,

    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for HotlineError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            HotlineError::NotFound(what) => {
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found"),
                };
                (StatusCode::NOT_FOUND, body)
            }
            HotlineError::DuplicateSlug(slug) => {
                let body = ApiErrorBody {
                    code: "DUPLICATE_SLUG".to_string(),
                    message: format!("a hotline with slug `{slug}` already exists"),
                };
                (StatusCode::CONFLICT, body)
            }
            HotlineError::Unauthorized => {
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "invalid or missing API key".to_string(),
                };
                (StatusCode::UNAUTHORIZED, body)
            }
            HotlineError::BadRequest(message) => {
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message,
                };
                (StatusCode::BAD_REQUEST, body)
            }
            HotlineError::Database(_)
            | HotlineError::Json(_)
            | HotlineError::MalformedColumn { .. }
            | HotlineError::Config(_) => {
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
