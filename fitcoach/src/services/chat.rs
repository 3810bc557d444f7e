use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::db::DatabaseBackend;
use crate::embeddings::EmbeddingProvider;
use crate::error::{CoachError, Result};
use crate::llm::LlmProvider;
use crate::models::{ChatAnswer, ConversationSummary, Message, MessageRole, ScoredChunk};

use super::answer::AnswerGenerator;
use super::fitness::FitnessContextBuilder;

/// Chunks retrieved per question before the relevance floor is applied.
pub const TOP_K: u32 = 5;

/// Chunks must score strictly above this cosine similarity to reach the prompt.
pub const RELEVANCE_THRESHOLD: f32 = 0.4;

/// Upper bound on conversations returned by the listing.
pub const CONVERSATION_LIST_LIMIT: u32 = 20;

/// Runs one question/answer turn end to end and exposes the conversation log.
///
/// The user's question is committed before any retrieval or generation, so a
/// failed turn still leaves the question in the conversation.
#[derive(Clone)]
pub struct ChatService {
    db: Arc<dyn DatabaseBackend>,
    embeddings: EmbeddingProvider,
    fitness: FitnessContextBuilder,
    answers: AnswerGenerator,
}

impl ChatService {
    pub fn new(db: Arc<dyn DatabaseBackend>, embeddings: EmbeddingProvider, llm: LlmProvider) -> Self {
        Self {
            fitness: FitnessContextBuilder::new(db.clone()),
            answers: AnswerGenerator::new(llm),
            db,
            embeddings,
        }
    }

    pub async fn ask(&self, question: &str, conversation_id: Option<i64>) -> Result<ChatAnswer> {
        if question.trim().is_empty() {
            return Err(CoachError::Validation("Question is required".to_string()));
        }

        let start = Instant::now();

        let conversation_id = match conversation_id {
            Some(id) => id,
            None => self.db.create_conversation().await?.id,
        };

        self.db
            .append_message(conversation_id, MessageRole::User, question, &[])
            .await?;

        let chunks = self.retrieve(question).await?;

        let snapshot = self.fitness.build_snapshot().await?;
        let summary = FitnessContextBuilder::render_summary(&snapshot);

        // Read after the question is stored, so the window ends with it.
        let history = self.db.get_messages(conversation_id).await?;

        let answer = self
            .answers
            .generate(question, &chunks, &summary, &history)
            .await?;

        let sources = distinct_titles(&chunks);
        self.db
            .append_message(conversation_id, MessageRole::Assistant, &answer, &sources)
            .await?;

        tracing::info!(
            conversation_id,
            chunks = chunks.len(),
            sources = sources.len(),
            history = history.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Answered question"
        );

        Ok(ChatAnswer {
            conversation_id,
            answer,
            sources,
        })
    }

    /// Nearest book chunks for `question` that clear the relevance floor,
    /// most similar first.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embeddings.embed(question).await?;
        let candidates = self.db.nearest_chunks(&embedding, TOP_K).await?;
        let total = candidates.len();

        let relevant: Vec<ScoredChunk> = candidates
            .into_iter()
            .filter(|chunk| chunk.similarity > RELEVANCE_THRESHOLD)
            .collect();

        tracing::debug!(
            candidates = total,
            relevant = relevant.len(),
            "Retrieved book chunks"
        );

        Ok(relevant)
    }

    pub async fn create_conversation(&self) -> Result<i64> {
        let conversation = self.db.create_conversation().await?;
        tracing::debug!(conversation_id = conversation.id, "Created conversation");
        Ok(conversation.id)
    }

    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.db.list_conversations(CONVERSATION_LIST_LIMIT).await
    }

    pub async fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        self.db.get_messages(conversation_id).await
    }

    pub async fn delete_conversation(&self, conversation_id: i64) -> Result<()> {
        if self.db.delete_conversation(conversation_id).await? {
            tracing::info!(conversation_id, "Deleted conversation");
            Ok(())
        } else {
            Err(CoachError::NotFound(format!(
                "Conversation {conversation_id} not found"
            )))
        }
    }
}

/// Book titles in ranking order, first occurrence wins.
fn distinct_titles(chunks: &[ScoredChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .filter(|chunk| seen.insert(chunk.book_title.as_str()))
        .map(|chunk| chunk.book_title.clone())
        .collect()
}
