use crate::db::connection::Database;
use crate::db::repository::{ConversationRepository, FitnessRepository, KnowledgeRepository};
use crate::db::schema;
use crate::db::traits::{
    ConversationStore, DatabaseBackend, FitnessStore, KnowledgeStore, MetadataStore,
};
use crate::db::MetadataRepository;
use crate::error::Result;
use crate::models::{
    BodyMetrics, CardioSession, Conversation, ConversationSummary, KnowledgeStats, Message,
    MessageRole, NewKnowledgeChunk, ScoredChunk, WorkoutEntry,
};
use async_trait::async_trait;

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KnowledgeStore for LibSqlBackend {
    async fn clear_knowledge(&self) -> Result<u64> {
        let conn = self.db.connect().await?;
        KnowledgeRepository::clear(&conn).await
    }
    async fn insert_knowledge_batch(&self, chunks: &[NewKnowledgeChunk]) -> Result<u64> {
        let conn = self.db.connect().await?;
        KnowledgeRepository::insert_batch(&conn, chunks).await
    }
    async fn nearest_chunks(&self, embedding: &[f32], k: u32) -> Result<Vec<ScoredChunk>> {
        let conn = self.db.connect().await?;
        KnowledgeRepository::nearest(&conn, embedding, k).await
    }
    async fn knowledge_stats(&self) -> Result<KnowledgeStats> {
        let conn = self.db.connect().await?;
        KnowledgeRepository::stats(&conn).await
    }
    async fn knowledge_table_exists(&self) -> Result<bool> {
        let conn = self.db.connect().await?;
        KnowledgeRepository::table_exists(&conn).await
    }
    async fn recreate_knowledge_table(&self, dimensions: usize) -> Result<()> {
        let conn = self.db.connect().await?;
        schema::recreate_knowledge_table(&conn, dimensions).await
    }
}

#[async_trait]
impl ConversationStore for LibSqlBackend {
    async fn create_conversation(&self) -> Result<Conversation> {
        let conn = self.db.connect().await?;
        ConversationRepository::create(&conn).await
    }
    async fn get_conversation(&self, id: i64) -> Result<Option<Conversation>> {
        let conn = self.db.connect().await?;
        ConversationRepository::get(&conn, id).await
    }
    async fn append_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
        sources: &[String],
    ) -> Result<Message> {
        let conn = self.db.connect().await?;
        ConversationRepository::append_message(&conn, conversation_id, role, content, sources)
            .await
    }
    async fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        let conn = self.db.connect().await?;
        ConversationRepository::get_messages(&conn, conversation_id).await
    }
    async fn list_conversations(&self, limit: u32) -> Result<Vec<ConversationSummary>> {
        let conn = self.db.connect().await?;
        ConversationRepository::list(&conn, limit).await
    }
    async fn delete_conversation(&self, id: i64) -> Result<bool> {
        let conn = self.db.connect().await?;
        ConversationRepository::delete(&conn, id).await
    }
}

#[async_trait]
impl FitnessStore for LibSqlBackend {
    async fn recent_workouts(&self, limit: u32) -> Result<Vec<WorkoutEntry>> {
        let conn = self.db.connect().await?;
        FitnessRepository::recent_workouts(&conn, limit).await
    }
    async fn recent_cardio(&self, limit: u32) -> Result<Vec<CardioSession>> {
        let conn = self.db.connect().await?;
        FitnessRepository::recent_cardio(&conn, limit).await
    }
    async fn latest_body_metrics(&self) -> Result<Option<BodyMetrics>> {
        let conn = self.db.connect().await?;
        FitnessRepository::latest_body_metrics(&conn).await
    }
}

#[async_trait]
impl MetadataStore for LibSqlBackend {
    async fn get_embedding_dimensions(&self) -> Result<Option<usize>> {
        let conn = self.db.connect().await?;
        MetadataRepository::get_embedding_dimensions(&conn).await
    }
    async fn set_embedding_dimensions(&self, dims: usize) -> Result<()> {
        let conn = self.db.connect().await?;
        MetadataRepository::set_embedding_dimensions(&conn, dims).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.db.connect().await?;
        let mut rows = conn.query("SELECT 1", ()).await?;
        rows.next().await?;
        Ok(())
    }
}
