use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Completion service error (status {status:?}): {body}")]
    CompletionService { status: Option<u16>, body: String },

    #[error("Completion service unavailable: {0}")]
    CompletionUnavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl CoachError {
    pub fn status(&self) -> StatusCode {
        match self {
            CoachError::Validation(_) => StatusCode::BAD_REQUEST,
            CoachError::NotFound(_) => StatusCode::NOT_FOUND,
            CoachError::EmbeddingUnavailable(_)
            | CoachError::CompletionService { .. }
            | CoachError::CompletionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoachError::Database(_)
            | CoachError::Json(_)
            | CoachError::Io(_)
            | CoachError::Csv(_)
            | CoachError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to API clients. Store and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            CoachError::Validation(msg) | CoachError::NotFound(msg) => msg.clone(),
            CoachError::EmbeddingUnavailable(_) => {
                "AI embedding service unavailable. Ensure the embedding service is running."
                    .to_string()
            }
            CoachError::CompletionService { .. } | CoachError::CompletionUnavailable(_) => {
                "AI answer service unavailable. Check the completion service API key.".to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for CoachError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = Json(json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CoachError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = CoachError::Validation("Question is required".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Question is required");
    }

    #[test]
    fn backend_failures_map_to_service_unavailable() {
        let embedding = CoachError::EmbeddingUnavailable("connection refused".into());
        let completion = CoachError::CompletionService {
            status: Some(500),
            body: "boom".into(),
        };
        let missing_key = CoachError::CompletionUnavailable("no key".into());

        assert_eq!(embedding.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(completion.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(missing_key.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(embedding.public_message().contains("embedding"));
        assert!(completion.public_message().contains("answer"));
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = CoachError::Internal("secret debug info".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn completion_error_display_carries_status_and_body() {
        let err = CoachError::CompletionService {
            status: Some(502),
            body: "upstream down".into(),
        };
        let text = err.to_string();
        assert!(text.contains("502"));
        assert!(text.contains("upstream down"));
    }
}
