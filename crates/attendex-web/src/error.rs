use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use attendex_core::StoreError;
use attendex_parsing::ParsingError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Request failures, each rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum AppError {
    /// The request did not carry what the endpoint needs.
    InputMissing(String),
    /// Text extraction or record parsing failed.
    Extraction(ParsingError),
    Store(StoreError),
    Internal(String),
}

impl AppError {
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        AppError::Internal(format!("{}: {}", context, err))
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InputMissing(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::InputMissing(msg) | AppError::Internal(msg) => msg.clone(),
            AppError::Extraction(e) => e.to_string(),
            AppError::Store(e) => e.to_string(),
        }
    }
}

impl From<ParsingError> for AppError {
    fn from(e: ParsingError) -> Self {
        AppError::Extraction(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
