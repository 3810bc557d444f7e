use crate::config::EmbeddingsConfig;
use crate::error::{CoachError, Result};

use super::api::{ApiConfig, EmbeddingApiClient};

/// Turns question text into vectors comparable with the stored book chunks.
#[derive(Clone)]
pub struct EmbeddingProvider {
    client: EmbeddingApiClient,
    dimensions: usize,
}

impl EmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let client = EmbeddingApiClient::new(ApiConfig {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })?;

        Ok(Self {
            client,
            dimensions: config.dimensions,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed one text. Empty vectors and vectors of the wrong width are
    /// treated as a broken embedding service.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.client.embed(text).await?;

        if embedding.is_empty() {
            return Err(CoachError::EmbeddingUnavailable(
                "Embedding service returned an empty vector".to_string(),
            ));
        }

        if embedding.len() != self.dimensions {
            return Err(CoachError::EmbeddingUnavailable(format!(
                "Expected {} dimensions, got {}",
                self.dimensions,
                embedding.len()
            )));
        }

        Ok(embedding)
    }
}
