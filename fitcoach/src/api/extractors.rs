use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::CoachError;

/// `axum::Json` with rejections turned into `{"error": ...}` bodies.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(CoachError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` with rejections turned into `{"error": ...}` bodies.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CoachError))]
pub struct AppPath<T>(pub T);

impl From<JsonRejection> for CoachError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

impl From<PathRejection> for CoachError {
    fn from(rejection: PathRejection) -> Self {
        CoachError::Validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

fn map_json_rejection(rejection: JsonRejection) -> CoachError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                CoachError::Validation(format!("Missing required field: {field}"))
            } else {
                CoachError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            CoachError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            CoachError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(_) => {
            CoachError::Internal("Failed to read request body".to_string())
        }
        _ => CoachError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_missing_field() {
        assert_eq!(
            extract_missing_field("Failed to deserialize: missing field `question` at line 1"),
            Some("question")
        );
        assert_eq!(extract_missing_field("expected a string"), None);
    }
}
