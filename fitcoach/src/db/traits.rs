use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    BodyMetrics, CardioSession, Conversation, ConversationSummary, KnowledgeStats, Message,
    MessageRole, NewKnowledgeChunk, ScoredChunk, WorkoutEntry,
};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Pre-embedded book passages and nearest-neighbour search over them.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Remove every stored chunk. Returns the number of rows deleted.
    async fn clear_knowledge(&self) -> Result<u64>;

    /// Insert a batch atomically: either every row lands or none does.
    async fn insert_knowledge_batch(&self, chunks: &[NewKnowledgeChunk]) -> Result<u64>;

    /// The `k` chunks closest to `embedding` by cosine distance, most similar
    /// first. Ties keep insertion order. An empty store yields an empty list.
    async fn nearest_chunks(&self, embedding: &[f32], k: u32) -> Result<Vec<ScoredChunk>>;

    async fn knowledge_stats(&self) -> Result<KnowledgeStats>;
    async fn knowledge_table_exists(&self) -> Result<bool>;

    /// Drop and recreate the knowledge table with a new vector width.
    async fn recreate_knowledge_table(&self, dimensions: usize) -> Result<()>;
}

/// Conversations and their ordered messages.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(&self) -> Result<Conversation>;
    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>>;

    /// Insert a message and bump the conversation's `updated_at`.
    /// Fails with `NotFound` if the conversation does not exist.
    async fn append_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
        sources: &[String],
    ) -> Result<Message>;

    /// All messages of a conversation in creation order. Unknown ids yield an empty list.
    async fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>>;

    /// Most recently updated conversations first, with first-message previews.
    async fn list_conversations(&self, limit: u32) -> Result<Vec<ConversationSummary>>;

    /// Delete a conversation together with its messages. Returns `false` if it did not exist.
    async fn delete_conversation(&self, id: i64) -> Result<bool>;
}

/// Read-only view of the tracker tables.
#[async_trait]
pub trait FitnessStore: Send + Sync {
    async fn recent_workouts(&self, limit: u32) -> Result<Vec<WorkoutEntry>>;
    async fn recent_cardio(&self, limit: u32) -> Result<Vec<CardioSession>>;
    async fn latest_body_metrics(&self) -> Result<Option<BodyMetrics>>;
}

/// Key-value metadata (embedding dimensions, etc.).
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get_embedding_dimensions(&self) -> Result<Option<usize>>;
    async fn set_embedding_dimensions(&self, dims: usize) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// Everything the coach needs from storage, behind one object.
#[async_trait]
pub trait DatabaseBackend:
    KnowledgeStore + ConversationStore + FitnessStore + MetadataStore
{
    /// Sync with remote (e.g. Turso replication). No-op for local-only backends.
    async fn sync(&self) -> Result<()>;

    /// Cheap round-trip used by the health endpoint.
    async fn ping(&self) -> Result<()>;
}
