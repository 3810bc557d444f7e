use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::llm::LlmBackend;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub embeddings: EmbeddingsStatus,
    pub llm: LlmStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DatabaseStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct EmbeddingsStatus {
    pub model: String,
    pub base_url: String,
    pub dimensions: usize,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `GET /api/health`
///
/// Reports configuration only for the external services; they are not called.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    let database = match state.db.ping().await {
        Ok(()) => DatabaseStatus {
            status: "ok".to_string(),
        },
        Err(error) => {
            tracing::warn!(error = %error, "Health check database ping failed");
            DatabaseStatus {
                status: "error".to_string(),
            }
        }
    };

    let embeddings = EmbeddingsStatus {
        model: state.config.embeddings.model.clone(),
        base_url: state.config.embeddings.base_url.clone(),
        dimensions: state.embeddings.dimensions(),
    };

    let llm = match state.llm.backend() {
        LlmBackend::OpenAICompatible { .. } => LlmStatus {
            status: "ok".to_string(),
            model: Some(state.config.llm.model.clone()),
            reason: None,
        },
        LlmBackend::Unavailable { reason } => LlmStatus {
            status: "unavailable".to_string(),
            model: None,
            reason: Some(reason.clone()),
        },
    };

    let status = if database.status == "ok" {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthData {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        embeddings,
        llm,
    })
}
