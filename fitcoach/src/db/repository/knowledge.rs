use libsql::{params, Connection, TransactionBehavior};

use super::value_as_f64;
use crate::error::Result;
use crate::models::{KnowledgeStats, NewKnowledgeChunk, ScoredChunk};

pub struct KnowledgeRepository;

impl KnowledgeRepository {
    pub async fn clear(conn: &Connection) -> Result<u64> {
        let deleted = conn.execute("DELETE FROM book_knowledge", ()).await?;
        Ok(deleted)
    }

    /// One transaction per batch. Any failing row rolls the whole batch back.
    pub async fn insert_batch(conn: &Connection, chunks: &[NewKnowledgeChunk]) -> Result<u64> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        let mut inserted = 0u64;

        for chunk in chunks {
            let embedding_json = serde_json::to_string(&chunk.embedding)?;
            tx.execute(
                r#"
                INSERT INTO book_knowledge (book_title, chunk_index, content, embedding)
                VALUES (?1, ?2, ?3, vector32(?4))
                "#,
                params![
                    chunk.book_title.clone(),
                    chunk.chunk_index,
                    chunk.content.clone(),
                    embedding_json,
                ],
            )
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Exact scan ordered by cosine distance. Similarity is reported as
    /// `1 - distance`; equal distances fall back to insertion order.
    pub async fn nearest(
        conn: &Connection,
        embedding: &[f32],
        k: u32,
    ) -> Result<Vec<ScoredChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let embedding_json = serde_json::to_string(embedding)?;
        let mut rows = conn
            .query(
                r#"
                SELECT id, book_title, chunk_index, content,
                       vector_distance_cos(embedding, vector32(?1)) AS distance
                FROM book_knowledge
                ORDER BY distance ASC, id ASC
                LIMIT ?2
                "#,
                params![embedding_json, k as i64],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let distance = value_as_f64(row.get_value(4)?).unwrap_or(1.0);
            results.push(ScoredChunk {
                id: row.get(0)?,
                book_title: row.get(1)?,
                chunk_index: row.get(2)?,
                content: row.get(3)?,
                similarity: (1.0 - distance) as f32,
            });
        }

        Ok(results)
    }

    pub async fn stats(conn: &Connection) -> Result<KnowledgeStats> {
        let mut rows = conn
            .query(
                "SELECT COUNT(*), COUNT(DISTINCT book_title) FROM book_knowledge",
                (),
            )
            .await?;

        let mut stats = KnowledgeStats::default();
        if let Some(row) = rows.next().await? {
            stats.row_count = row.get::<i64>(0)?.max(0) as u64;
            stats.distinct_titles = row.get::<i64>(1)?.max(0) as u64;
        }

        let mut rows = conn
            .query(
                r#"
                SELECT vector_extract(embedding),
                       1 - vector_distance_cos(embedding, embedding)
                FROM book_knowledge
                ORDER BY id ASC
                LIMIT 1
                "#,
                (),
            )
            .await?;

        if let Some(row) = rows.next().await? {
            let extracted: String = row.get(0)?;
            let vector: Vec<f32> = serde_json::from_str(&extracted)?;
            stats.sample_dimensions = Some(vector.len());
            stats.self_similarity = value_as_f64(row.get_value(1)?);
        }

        Ok(stats)
    }

    pub async fn table_exists(conn: &Connection) -> Result<bool> {
        let mut rows = conn
            .query(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'book_knowledge'",
                (),
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }
}
