use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models;

/// Request body for `POST /api/chat/ask`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    /// The user's question. Must contain non-whitespace text.
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub question: String,
    /// Existing conversation to continue. A new one is created when absent.
    pub conversation_id: Option<i64>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Response for `POST /api/chat/ask`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub conversation_id: i64,
    pub answer: String,
    /// Distinct book titles the answer drew on, in ranking order.
    pub sources: Vec<String>,
}

impl From<models::ChatAnswer> for AskResponse {
    fn from(answer: models::ChatAnswer) -> Self {
        Self {
            conversation_id: answer.conversation_id,
            answer: answer.answer,
            sources: answer.sources,
        }
    }
}

/// Response for `POST /api/chat/conversations`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationResponse {
    pub conversation_id: i64,
}

/// Entry in `GET /api/chat/conversations`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ConversationSummaryResponse {
    pub id: i64,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
    /// Opening message of the conversation, `null` if it has none yet.
    pub first_message: Option<String>,
}

impl From<models::ConversationSummary> for ConversationSummaryResponse {
    fn from(summary: models::ConversationSummary) -> Self {
        Self {
            id: summary.id,
            created_at: summary.created_at,
            updated_at: summary.updated_at,
            first_message: summary.first_message,
        }
    }
}

/// Entry in `GET /api/chat/conversations/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    /// `user`, `assistant` or `system`.
    pub role: String,
    pub content: String,
    pub sources: Vec<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<models::Message> for MessageResponse {
    fn from(message: models::Message) -> Self {
        Self {
            id: message.id,
            role: message.role.to_string(),
            content: message.content,
            sources: message.sources,
            created_at: message.created_at,
        }
    }
}

/// Response for `DELETE /api/chat/conversations/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteConversationResponse {
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_request_reads_camel_case_conversation_id() {
        let req: AskRequest =
            serde_json::from_str(r#"{"question":"Best rep range?","conversationId":7}"#).unwrap();
        assert_eq!(req.question, "Best rep range?");
        assert_eq!(req.conversation_id, Some(7));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn ask_request_missing_or_blank_question_fails_validation() {
        let missing: AskRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.validate().is_err());

        let blank: AskRequest = serde_json::from_str(r#"{"question":" \n "}"#).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn ask_response_serializes_camel_case() {
        let json = serde_json::to_value(AskResponse {
            conversation_id: 3,
            answer: "Train close to failure.".to_string(),
            sources: vec!["Book".to_string()],
        })
        .unwrap();
        assert_eq!(json["conversationId"], 3);
        assert!(json.get("conversation_id").is_none());
    }

    #[test]
    fn message_response_uses_lowercase_role() {
        let message = models::Message {
            id: 1,
            conversation_id: 2,
            role: models::MessageRole::Assistant,
            content: "hi".to_string(),
            sources: vec![],
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(MessageResponse::from(message)).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["sources"], serde_json::json!([]));
    }
}
