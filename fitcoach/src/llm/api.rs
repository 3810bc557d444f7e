use std::time::Duration;

use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::LlmConfig,
    error::{CoachError, Result},
    llm::provider::CompletionOptions,
};

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: String,
    model: String,
}

/// Only the fields the coach reads. Providers add their own extras to the
/// OpenAI shape, so the full response type is not deserialized.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client. Requests are built with
/// async-openai types and sent once; a failure is returned as-is with the
/// upstream status and body.
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(missing_key_error)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| {
                CoachError::CompletionUnavailable(format!(
                    "Failed to create LLM HTTP client: {error}"
                ))
            })?;

        Ok(Self {
            client,
            config: ApiConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                api_key,
                model: config.model.clone(),
            },
        })
    }

    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(CoachError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.build_request(prompt, system_prompt, options)?;
        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| CoachError::CompletionService {
                status: error.status().map(|s| s.as_u16()),
                body: format!("LLM request failed: {error}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Completion service returned an error");
            return Err(CoachError::CompletionService {
                status: Some(status.as_u16()),
                body,
            });
        }

        let body: CompletionResponse =
            response
                .json()
                .await
                .map_err(|error| CoachError::CompletionService {
                    status: Some(status.as_u16()),
                    body: format!("Failed to parse LLM response: {error}"),
                })?;

        Self::extract_content(body)
    }

    fn build_request(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: Option<&CompletionOptions>,
    ) -> Result<CreateChatCompletionRequest> {
        let mut messages = Vec::new();

        if let Some(system_prompt) = system_prompt.filter(|value| !value.trim().is_empty()) {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|error| {
                        CoachError::Validation(format!("Invalid system prompt: {error}"))
                    })?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|error| CoachError::Validation(format!("Invalid user prompt: {error}")))?
                .into(),
        );

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.config.model.clone()).messages(messages);
        Self::apply_completion_options(&mut request, options);

        request.build().map_err(|error| {
            CoachError::Internal(format!("Invalid LLM completion request: {error}"))
        })
    }

    fn apply_completion_options(
        request: &mut CreateChatCompletionRequestArgs,
        options: Option<&CompletionOptions>,
    ) {
        let Some(options) = options else {
            return;
        };

        if let Some(temperature) = options.temperature {
            request.temperature(temperature);
        }

        if let Some(max_tokens) = options.max_tokens {
            request.max_tokens(max_tokens);
        }

        if let Some(top_p) = options.top_p {
            request.top_p(top_p);
        }
    }

    fn extract_content(response: CompletionResponse) -> Result<String> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CoachError::CompletionService {
                status: None,
                body: "LLM response contained no choices".to_string(),
            })?
            .message
            .content
            .unwrap_or_default();

        if message.trim().is_empty() {
            return Err(CoachError::CompletionService {
                status: None,
                body: "LLM response contained empty content".to_string(),
            });
        }

        Ok(message)
    }
}

pub(crate) fn missing_key_error() -> CoachError {
    CoachError::CompletionUnavailable(
        "No API key configured for the completion service (set LLM_API_KEY or GROQ_API_KEY)"
            .to_string(),
    )
}
