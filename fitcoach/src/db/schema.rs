use libsql::Connection;

use crate::error::Result;

/// Create every table this service touches.
///
/// The fitness tables belong to the tracker's CRUD side; they are created here
/// only when missing so the coach can run against an empty store.
pub async fn init_schema(conn: &Connection, embedding_dimensions: usize) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Conversations and their ordered messages
        CREATE TABLE IF NOT EXISTS conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_updated_at ON conversations(updated_at);

        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id INTEGER NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
            content TEXT NOT NULL,
            sources TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_messages_conversation
            ON messages(conversation_id, created_at);

        -- Metadata key-value store
        CREATE TABLE IF NOT EXISTS fitcoach_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- Tracker tables (read-only for the coach)
        CREATE TABLE IF NOT EXISTS workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL DEFAULT (date('now')),
            duration INTEGER,
            notes TEXT
        );

        CREATE TABLE IF NOT EXISTS workout_exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_id INTEGER REFERENCES workouts(id) ON DELETE CASCADE,
            exercise_name TEXT NOT NULL,
            sets INTEGER,
            reps INTEGER,
            weight REAL
        );

        CREATE INDEX IF NOT EXISTS idx_workout_exercises_workout
            ON workout_exercises(workout_id);

        CREATE TABLE IF NOT EXISTS cardio_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL DEFAULT (date('now')),
            type TEXT,
            distance REAL,
            duration INTEGER,
            notes TEXT
        );

        CREATE TABLE IF NOT EXISTS body_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL DEFAULT (date('now')),
            weight REAL,
            height REAL,
            body_fat_perc REAL,
            chest REAL,
            waist REAL,
            hips REAL,
            bicep REAL,
            thigh REAL
        );
        "#,
    )
    .await?;

    conn.execute_batch(&knowledge_table_sql(embedding_dimensions))
        .await?;

    Ok(())
}

/// Drop the knowledge table and create it again with a new vector width.
/// All stored chunks are lost; the corpus has to be reloaded afterwards.
pub async fn recreate_knowledge_table(conn: &Connection, embedding_dimensions: usize) -> Result<()> {
    conn.execute_batch("DROP TABLE IF EXISTS book_knowledge;")
        .await?;
    conn.execute_batch(&knowledge_table_sql(embedding_dimensions))
        .await?;
    Ok(())
}

fn knowledge_table_sql(embedding_dimensions: usize) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS book_knowledge (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_title TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            content TEXT NOT NULL,
            embedding F32_BLOB({embedding_dimensions}) NOT NULL,
            UNIQUE (book_title, chunk_index)
        );
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use libsql::Builder;

    async fn column_names(conn: &Connection, table: &str) -> Vec<String> {
        let mut rows = conn
            .query(
                "SELECT name FROM pragma_table_info(?1) ORDER BY cid",
                [table],
            )
            .await
            .unwrap();
        let mut names = Vec::new();
        while let Some(row) = rows.next().await.unwrap() {
            names.push(row.get::<String>(0).unwrap());
        }
        names
    }

    #[tokio::test]
    async fn test_schema_creates_chat_and_knowledge_tables() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();

        init_schema(&conn, 4).await.unwrap();

        assert_eq!(
            column_names(&conn, "messages").await,
            vec!["id", "conversation_id", "role", "content", "sources", "created_at"]
        );
        assert_eq!(
            column_names(&conn, "book_knowledge").await,
            vec!["id", "book_title", "chunk_index", "content", "embedding"]
        );
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();

        init_schema(&conn, 4).await.unwrap();
        init_schema(&conn, 4).await.unwrap();
    }

    #[tokio::test]
    async fn test_role_check_constraint_rejects_unknown_roles() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();
        init_schema(&conn, 4).await.unwrap();

        conn.execute(
            "INSERT INTO conversations (created_at, updated_at) VALUES ('t', 't')",
            (),
        )
        .await
        .unwrap();

        let result = conn
            .execute(
                "INSERT INTO messages (conversation_id, role, content, created_at) VALUES (1, 'coach', 'hi', 't')",
                (),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recreate_knowledge_table_changes_width() {
        let db = Builder::new_local(":memory:").build().await.unwrap();
        let conn = db.connect().unwrap();
        init_schema(&conn, 4).await.unwrap();

        recreate_knowledge_table(&conn, 2).await.unwrap();

        conn.execute(
            "INSERT INTO book_knowledge (book_title, chunk_index, content, embedding) VALUES ('b', 0, 'c', vector32('[1, 0]'))",
            (),
        )
        .await
        .unwrap();
    }
}
