use chrono::Utc;
use libsql::{params, Connection, Row, TransactionBehavior};

use super::{format_timestamp, parse_timestamp};
use crate::error::{CoachError, Result};
use crate::models::{Conversation, ConversationSummary, Message, MessageRole};

pub struct ConversationRepository;

impl ConversationRepository {
    pub async fn create(conn: &Connection) -> Result<Conversation> {
        let now = format_timestamp(Utc::now());

        conn.execute(
            "INSERT INTO conversations (created_at, updated_at) VALUES (?1, ?2)",
            params![now.clone(), now.clone()],
        )
        .await?;
        let id = conn.last_insert_rowid();

        let at = parse_timestamp(&now)?;
        Ok(Conversation {
            id,
            created_at: at,
            updated_at: at,
        })
    }

    pub async fn get(conn: &Connection, id: i64) -> Result<Option<Conversation>> {
        let mut rows = conn
            .query(
                "SELECT id, created_at, updated_at FROM conversations WHERE id = ?1",
                params![id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            let created_at: String = row.get(1)?;
            let updated_at: String = row.get(2)?;
            Ok(Some(Conversation {
                id: row.get(0)?,
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// The existence check and the insert share one transaction so a message
    /// can never be attached to a missing conversation.
    pub async fn append_message(
        conn: &Connection,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
        sources: &[String],
    ) -> Result<Message> {
        let now = format_timestamp(Utc::now());
        let sources_json = serde_json::to_string(sources)?;

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;

        // MAX keeps updated_at monotonic if the clock steps backwards.
        let touched = tx
            .execute(
                "UPDATE conversations SET updated_at = MAX(updated_at, ?2) WHERE id = ?1",
                params![conversation_id, now.clone()],
            )
            .await?;

        if touched == 0 {
            tx.rollback().await?;
            return Err(CoachError::NotFound(format!(
                "Conversation {conversation_id} not found"
            )));
        }

        tx.execute(
            r#"
            INSERT INTO messages (conversation_id, role, content, sources, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                conversation_id,
                role.as_str(),
                content,
                sources_json,
                now.clone(),
            ],
        )
        .await?;
        let id = tx.last_insert_rowid();

        tx.commit().await?;

        Ok(Message {
            id,
            conversation_id,
            role,
            content: content.to_string(),
            sources: sources.to_vec(),
            created_at: parse_timestamp(&now)?,
        })
    }

    pub async fn get_messages(conn: &Connection, conversation_id: i64) -> Result<Vec<Message>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, conversation_id, role, content, sources, created_at
                FROM messages
                WHERE conversation_id = ?1
                ORDER BY created_at ASC, id ASC
                "#,
                params![conversation_id],
            )
            .await?;

        let mut messages = Vec::new();
        while let Some(row) = rows.next().await? {
            messages.push(Self::row_to_message(&row)?);
        }
        Ok(messages)
    }

    pub async fn list(conn: &Connection, limit: u32) -> Result<Vec<ConversationSummary>> {
        let mut rows = conn
            .query(
                r#"
                SELECT c.id, c.created_at, c.updated_at,
                       (SELECT m.content FROM messages m
                        WHERE m.conversation_id = c.id
                        ORDER BY m.created_at ASC, m.id ASC
                        LIMIT 1) AS first_message
                FROM conversations c
                ORDER BY c.updated_at DESC, c.id DESC
                LIMIT ?1
                "#,
                params![limit as i64],
            )
            .await?;

        let mut summaries = Vec::new();
        while let Some(row) = rows.next().await? {
            let created_at: String = row.get(1)?;
            let updated_at: String = row.get(2)?;
            summaries.push(ConversationSummary {
                id: row.get(0)?,
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
                first_message: row.get::<Option<String>>(3)?,
            });
        }
        Ok(summaries)
    }

    /// Messages go first, then the conversation row, in one transaction.
    /// Foreign-key enforcement is per-connection in SQLite, so the cascade is
    /// not relied upon.
    pub async fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;

        tx.execute(
            "DELETE FROM messages WHERE conversation_id = ?1",
            params![id],
        )
        .await?;
        let deleted = tx
            .execute("DELETE FROM conversations WHERE id = ?1", params![id])
            .await?;

        tx.commit().await?;
        Ok(deleted > 0)
    }

    fn row_to_message(row: &Row) -> Result<Message> {
        let role: String = row.get(2)?;
        let sources: String = row.get(4)?;
        let created_at: String = row.get(5)?;

        Ok(Message {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            role: role.parse()?,
            content: row.get(3)?,
            sources: serde_json::from_str(&sources)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
