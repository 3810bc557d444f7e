//! Chat handlers: conversation CRUD and the question/answer turn.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use validator::Validate;

use crate::api::dto::{
    AskRequest, AskResponse, ConversationSummaryResponse, CreateConversationResponse,
    DeleteConversationResponse, ErrorResponse, MessageResponse,
};
use crate::api::extractors::{AppJson, AppPath};
use crate::api::AppState;
use crate::error::{CoachError, Result};

/// `POST /api/chat/conversations`
#[utoipa::path(
    post,
    path = "/api/chat/conversations",
    tag = "chat",
    responses(
        (status = 201, description = "Conversation created", body = CreateConversationResponse),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn create_conversation(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateConversationResponse>)> {
    let conversation_id = state.chat.create_conversation().await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateConversationResponse { conversation_id }),
    ))
}

/// `GET /api/chat/conversations`
///
/// Most recently updated first, capped at 20.
#[utoipa::path(
    get,
    path = "/api/chat/conversations",
    tag = "chat",
    responses(
        (status = 200, description = "Recent conversations", body = [ConversationSummaryResponse]),
        (status = 500, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn list_conversations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ConversationSummaryResponse>>> {
    let summaries = state.chat.list_conversations().await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// `GET /api/chat/conversations/{id}`
///
/// Messages in creation order. An unknown id yields an empty list.
#[utoipa::path(
    get,
    path = "/api/chat/conversations/{id}",
    tag = "chat",
    params(("id" = i64, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation messages", body = [MessageResponse]),
        (status = 400, description = "Invalid id", body = ErrorResponse),
    )
)]
pub async fn get_conversation(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Vec<MessageResponse>>> {
    let messages = state.chat.get_messages(id).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// `DELETE /api/chat/conversations/{id}`
#[utoipa::path(
    delete,
    path = "/api/chat/conversations/{id}",
    tag = "chat",
    params(("id" = i64, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation deleted", body = DeleteConversationResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
    )
)]
pub async fn delete_conversation(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<DeleteConversationResponse>> {
    state.chat.delete_conversation(id).await?;
    Ok(Json(DeleteConversationResponse {
        message: "Conversation deleted".to_string(),
    }))
}

/// `POST /api/chat/ask`
///
/// The question is stored before the answer is generated, so it survives a
/// 503 from either backend.
#[utoipa::path(
    post,
    path = "/api/chat/ask",
    tag = "chat",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer generated", body = AskResponse),
        (status = 400, description = "Missing or blank question", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse),
        (status = 503, description = "Embedding or answer service unavailable", body = ErrorResponse),
    )
)]
pub async fn ask(
    State(state): State<AppState>,
    AppJson(req): AppJson<AskRequest>,
) -> Result<Json<AskResponse>> {
    req.validate()
        .map_err(|_| CoachError::Validation("Question is required".to_string()))?;

    let answer = state.chat.ask(&req.question, req.conversation_id).await?;
    Ok(Json(answer.into()))
}
