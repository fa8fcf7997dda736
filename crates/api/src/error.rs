use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sre_copilot_common::AssistantError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Core service error: {0}")]
    CoreService(#[from] AssistantError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::WebSocket(_) => (StatusCode::BAD_REQUEST, "WEBSOCKET_ERROR"),
            ApiError::CoreService(err) => match err {
                AssistantError::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "INVALID_QUERY"),
                AssistantError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                AssistantError::SynthesisFailure(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "SYNTHESIS_FAILURE")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let error_message = match &self {
            ApiError::Validation(msg) | ApiError::WebSocket(msg) => msg.clone(),
            ApiError::CoreService(
                err @ (AssistantError::InvalidQuery(_)
                | AssistantError::NotFound(_)
                | AssistantError::SynthesisFailure(_)),
            ) => err.to_string(),
            other => {
                error!("{}", other);
                "Internal server error".to_string()
            }
        };

        let response_body = json!({
            "success": false,
            "data": null,
            "error": error_message,
            "error_code": error_code,
            "timestamp": chrono::Utc::now()
        });

        (status, Json(response_body)).into_response()
    }
}

pub fn validation_error(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

pub type ApiResult<T> = Result<T, ApiError>;
