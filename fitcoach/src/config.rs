use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
    /// Applied to every connection handed out, so concurrent writers wait
    /// for the lock instead of failing.
    pub busy_timeout_ms: u64,
    pub journal_mode: String,
    pub synchronous: String,
}

/// Embedding service (Ollama-compatible `/api/embeddings` endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
}

/// OpenAI-compatible chat completion service used to write answers.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Bearer credential. `None` leaves the answer backend unavailable.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "file:fitcoach.db".to_string(),
            auth_token: None,
            local_path: None,
            busy_timeout_ms: 5000,
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
        }
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            timeout_secs: 30,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            timeout_secs: 60,
            temperature: 0.7,
            max_tokens: 1024,
            top_p: 0.9,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let database_defaults = DatabaseConfig::default();
        let embedding_defaults = EmbeddingsConfig::default();
        let llm_defaults = LlmConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("FITCOACH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("FITCOACH_PORT", 5000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(database_defaults.url),
                auth_token: parse_env_opt("DATABASE_AUTH_TOKEN"),
                local_path: parse_env_opt("DATABASE_LOCAL_PATH"),
                busy_timeout_ms: parse_env_or(
                    "DATABASE_BUSY_TIMEOUT_MS",
                    database_defaults.busy_timeout_ms,
                ),
                journal_mode: env::var("DATABASE_JOURNAL_MODE")
                    .unwrap_or(database_defaults.journal_mode),
                synchronous: env::var("DATABASE_SYNCHRONOUS")
                    .unwrap_or(database_defaults.synchronous),
            },
            embeddings: EmbeddingsConfig {
                base_url: env::var("EMBEDDING_BASE_URL").unwrap_or(embedding_defaults.base_url),
                model: env::var("EMBEDDING_MODEL").unwrap_or(embedding_defaults.model),
                dimensions: parse_env_or("EMBEDDING_DIMENSIONS", embedding_defaults.dimensions),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", embedding_defaults.timeout_secs),
            },
            llm: LlmConfig {
                base_url: env::var("LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
                model: env::var("LLM_MODEL").unwrap_or(llm_defaults.model),
                api_key: parse_env_opt("LLM_API_KEY").or_else(|| parse_env_opt("GROQ_API_KEY")),
                timeout_secs: parse_env_or("LLM_TIMEOUT", llm_defaults.timeout_secs),
                temperature: parse_env_or("LLM_TEMPERATURE", llm_defaults.temperature),
                max_tokens: parse_env_or("LLM_MAX_TOKENS", llm_defaults.max_tokens),
                top_p: parse_env_or("LLM_TOP_P", llm_defaults.top_p),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
