use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fitcoach API",
        version = "1.0.0",
        description = "AI fitness coach: book-grounded answers personalised with the user's training log.",
    ),
    paths(
        handlers::health::health_check,
        handlers::chat::create_conversation,
        handlers::chat::list_conversations,
        handlers::chat::get_conversation,
        handlers::chat::delete_conversation,
        handlers::chat::ask,
    ),
    components(schemas(
        dto::AskRequest,
        dto::AskResponse,
        dto::CreateConversationResponse,
        dto::ConversationSummaryResponse,
        dto::MessageResponse,
        dto::DeleteConversationResponse,
        dto::ErrorResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::EmbeddingsStatus,
        handlers::health::LlmStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "chat", description = "Coach conversations and questions"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
