use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Canvas API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse Canvas response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected Canvas payload: {0}")]
    UnexpectedPayload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Config(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Api { status, body } => {
                error!("canvas api error {}: {}", status, body);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Canvas API responded with {}", status),
                )
            }
            AppError::Request(e) => {
                error!("canvas request error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Canvas request failed".to_string(),
                )
            }
            AppError::Parse(e) => {
                error!("canvas parse error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Canvas response could not be parsed".to_string(),
                )
            }
            AppError::UnexpectedPayload(msg) => {
                error!("unexpected canvas payload: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Canvas response had an unexpected shape".to_string(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
