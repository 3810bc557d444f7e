use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::{CoachError, Result};
use crate::llm::api::{missing_key_error, LlmApiClient};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl CompletionOptions {
    /// Sampling settings taken from configuration.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
            top_p: Some(config.top_p),
        }
    }
}

/// Answer-writing backend. Without a credential the provider is built in the
/// unavailable state and every call fails before touching the network.
#[derive(Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    client: Option<Arc<LlmApiClient>>,
    options: CompletionOptions,
}

impl LlmProvider {
    pub fn new(config: &LlmConfig) -> Self {
        let options = CompletionOptions::from_config(config);

        if config.api_key.is_none() {
            return Self::unavailable(&missing_key_error().to_string()).with_options(options);
        }

        match LlmApiClient::new(config) {
            Ok(client) => Self {
                backend: LlmBackend::OpenAICompatible {
                    base_url: config.base_url.clone(),
                },
                client: Some(Arc::new(client)),
                options,
            },
            Err(error) => Self::unavailable(&error.to_string()).with_options(options),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            client: None,
            options: CompletionOptions::default(),
        }
    }

    fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    /// Send a system instruction plus the user's text as a two-message exchange.
    pub async fn complete(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let client = match (&self.backend, &self.client) {
            (LlmBackend::OpenAICompatible { .. }, Some(client)) => client,
            _ => return Err(CoachError::CompletionUnavailable(self.unavailable_reason())),
        };

        client
            .complete(prompt, Some(system_prompt), Some(&self.options))
            .await
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "Completion client is not initialized".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_unavailable() {
        let provider = LlmProvider::new(&LlmConfig::default());
        assert!(!provider.is_available());
        assert!(matches!(provider.backend(), LlmBackend::Unavailable { .. }));
    }

    #[test]
    fn test_key_makes_provider_available() {
        let config = LlmConfig {
            api_key: Some("gsk_test".to_string()),
            ..LlmConfig::default()
        };
        let provider = LlmProvider::new(&config);
        assert!(provider.is_available());
        assert_eq!(
            provider.backend(),
            &LlmBackend::OpenAICompatible {
                base_url: "https://api.groq.com/openai/v1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unavailable_provider_fails_without_network() {
        let provider = LlmProvider::unavailable("no key");
        let err = provider.complete("system", "question").await.unwrap_err();
        match err {
            CoachError::CompletionUnavailable(reason) => assert_eq!(reason, "no key"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_options_follow_config() {
        let options = CompletionOptions::from_config(&LlmConfig::default());
        assert_eq!(options.temperature, Some(0.7));
        assert_eq!(options.max_tokens, Some(1024));
        assert_eq!(options.top_p, Some(0.9));
    }
}
