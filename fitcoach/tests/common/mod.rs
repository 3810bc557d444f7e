// Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Once};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fitcoach::config::{Config, DatabaseConfig, EmbeddingsConfig, LlmConfig, ServerConfig};
use fitcoach::db::{Database, DatabaseBackend, LibSqlBackend};
use fitcoach::models::NewKnowledgeChunk;

pub const DIMENSIONS: usize = 3;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A throwaway libSQL file plus mock embedding and completion services.
pub struct TestEnv {
    pub dir: TempDir,
    pub raw_db: Database,
    pub db: Arc<dyn DatabaseBackend>,
    pub embedding_server: MockServer,
    pub llm_server: MockServer,
    pub config: Config,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_api_key(Some("test-key")).await
    }

    pub async fn with_api_key(api_key: Option<&str>) -> Self {
        init_test_logger();

        let embedding_server = MockServer::start().await;
        let llm_server = MockServer::start().await;

        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("fitcoach_test.db");

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: format!("file:{}", db_path.to_str().unwrap()),
                ..DatabaseConfig::default()
            },
            embeddings: EmbeddingsConfig {
                base_url: embedding_server.uri(),
                model: "nomic-embed-text".to_string(),
                dimensions: DIMENSIONS,
                timeout_secs: 5,
            },
            llm: LlmConfig {
                base_url: llm_server.uri(),
                api_key: api_key.map(str::to_string),
                timeout_secs: 5,
                ..LlmConfig::default()
            },
        };

        let raw_db = Database::new(&config.database, DIMENSIONS)
            .await
            .expect("Failed to open test database");
        let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db.clone()));

        Self {
            dir,
            raw_db,
            db,
            embedding_server,
            llm_server,
            config,
        }
    }

    /// Every embedding request returns `vector`.
    pub async fn mock_embedding(&self, vector: Vec<f32>) {
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": vector })))
            .mount(&self.embedding_server)
            .await;
    }

    pub async fn mock_completion(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .mount(&self.llm_server)
            .await;
    }

    pub async fn seed_chunks(&self, chunks: &[(&str, i64, [f32; DIMENSIONS])]) {
        let rows: Vec<NewKnowledgeChunk> = chunks
            .iter()
            .map(|(title, index, vector)| NewKnowledgeChunk {
                book_title: title.to_string(),
                chunk_index: *index,
                content: format!("{title} passage {index}"),
                embedding: vector.to_vec(),
            })
            .collect();
        self.db
            .insert_knowledge_batch(&rows)
            .await
            .expect("Failed to seed chunks");
    }

    pub async fn execute(&self, sql: &str) {
        let conn = self.raw_db.connect().await.unwrap();
        conn.execute_batch(sql).await.expect("Failed to run seed SQL");
    }
}

pub fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "llama-3.3-70b-versatile",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

/// Unit vector in the x/y plane whose cosine similarity with `[1, 0, 0]` is `similarity`.
pub fn vector_with_similarity(similarity: f32) -> [f32; DIMENSIONS] {
    [similarity, (1.0 - similarity * similarity).sqrt(), 0.0]
}
