use crate::error::Result;
use crate::llm::prompts::{answer_system_prompt, render_book_context, render_history};
use crate::llm::LlmProvider;
use crate::models::{Message, ScoredChunk};

/// Prior messages included in the prompt.
pub const HISTORY_WINDOW: usize = 4;

/// Composes the grounded prompt and asks the completion service for an answer.
#[derive(Clone)]
pub struct AnswerGenerator {
    llm: LlmProvider,
}

impl AnswerGenerator {
    pub fn new(llm: LlmProvider) -> Self {
        Self { llm }
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_available()
    }

    /// No local fallback: any completion failure propagates unchanged.
    pub async fn generate(
        &self,
        question: &str,
        chunks: &[ScoredChunk],
        fitness_summary: &str,
        history: &[Message],
    ) -> Result<String> {
        let book_context = render_book_context(chunks);
        let history_block = render_history(history, HISTORY_WINDOW);
        let system_prompt = answer_system_prompt(&book_context, fitness_summary, &history_block);

        tracing::debug!(
            chunks = chunks.len(),
            history = history.len().min(HISTORY_WINDOW),
            prompt_len = system_prompt.len(),
            "Generating answer"
        );

        self.llm.complete(&system_prompt, question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use crate::error::CoachError;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
    }

    fn generator_for(server: &MockServer) -> AnswerGenerator {
        AnswerGenerator::new(LlmProvider::new(&LlmConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            ..LlmConfig::default()
        }))
    }

    #[tokio::test]
    async fn test_generate_sends_system_and_user_messages() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(|req: &Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                let system = body["messages"][0]["content"].as_str().unwrap_or_default();
                let ok = body["messages"][0]["role"] == "system"
                    && body["messages"][1]["role"] == "user"
                    && body["messages"][1]["content"] == "Should I deload?"
                    && system.contains("No relevant book content found.")
                    && system.contains("No fitness data available yet.")
                    && body["temperature"].as_f64().is_some()
                    && body["max_tokens"] == 1024;
                if ok {
                    ResponseTemplate::new(200).set_body_json(completion_body("Take a lighter week."))
                } else {
                    ResponseTemplate::new(400).set_body_string("unexpected request shape")
                }
            })
            .expect(1)
            .mount(&server)
            .await;

        let answer = generator_for(&server)
            .generate("Should I deload?", &[], "No fitness data available yet.", &[])
            .await
            .unwrap();
        assert_eq!(answer, "Take a lighter week.");
    }

    #[tokio::test]
    async fn test_non_success_carries_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .expect(1)
            .mount(&server)
            .await;

        let err = generator_for(&server)
            .generate("q", &[], "summary", &[])
            .await
            .unwrap_err();

        match err {
            CoachError::CompletionService { status, body } => {
                assert_eq!(status, Some(429));
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let generator = AnswerGenerator::new(LlmProvider::new(&LlmConfig {
            base_url: server.uri(),
            api_key: None,
            ..LlmConfig::default()
        }));
        assert!(!generator.is_available());

        let err = generator.generate("q", &[], "summary", &[]).await.unwrap_err();
        assert!(matches!(err, CoachError::CompletionUnavailable(_)));
    }
}
