use libsql::{Builder, Connection};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

/// Where the store lives. Connection pragmas only apply to a local SQLite file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreKind {
    Local,
    Replica,
    Remote,
}

impl StoreKind {
    fn of(config: &DatabaseConfig) -> Self {
        let remote_url = config.url.starts_with("libsql://") || config.url.starts_with("https://");
        match (remote_url, config.local_path.is_some()) {
            (false, _) => StoreKind::Local,
            (true, true) => StoreKind::Replica,
            (true, false) => StoreKind::Remote,
        }
    }

    fn has_local_file(self) -> bool {
        self != StoreKind::Remote
    }
}

/// Process-wide libSQL handle. Created once at startup and cloned into every
/// component that needs the store.
#[derive(Clone)]
pub struct Database {
    db: Arc<libsql::Database>,
    kind: StoreKind,
    /// `PRAGMA` statements run on every connection handed out by [`Database::connect`].
    connection_pragmas: Arc<str>,
}

impl Database {
    /// Open the store and make sure every table exists. `embedding_dimensions`
    /// fixes the vector width of a freshly created knowledge table.
    pub async fn new(config: &DatabaseConfig, embedding_dimensions: usize) -> Result<Self> {
        let kind = StoreKind::of(config);
        let token = config.auth_token.clone().unwrap_or_default();

        let db = match (kind, config.local_path.as_deref()) {
            (StoreKind::Replica, Some(local_path)) => {
                Builder::new_remote_replica(local_path, config.url.clone(), token)
                    .build()
                    .await?
            }
            (StoreKind::Local, _) => {
                let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
                Builder::new_local(path).build().await?
            }
            _ => Builder::new_remote(config.url.clone(), token).build().await?,
        };

        let database = Self {
            db: Arc::new(db),
            kind,
            connection_pragmas: connection_pragmas(config).into(),
        };

        if kind.has_local_file() {
            database
                .set_journal_mode(normalize_journal_mode(&config.journal_mode))
                .await?;
        }

        let conn = database.connect().await?;
        schema::init_schema(&conn, embedding_dimensions).await?;

        tracing::debug!(?kind, "Database ready");
        Ok(database)
    }

    /// A fresh connection with the busy timeout and sync level applied.
    ///
    /// `busy_timeout` is per connection in SQLite; without it a writer that
    /// meets another transaction fails at once with "database is locked".
    pub async fn connect(&self) -> Result<Connection> {
        let conn = self.db.connect()?;
        if self.kind.has_local_file() {
            conn.execute_batch(&self.connection_pragmas).await?;
        }
        Ok(conn)
    }

    /// Journal mode is persistent for the file, so it is set once at open.
    async fn set_journal_mode(&self, mode: &str) -> Result<()> {
        let conn = self.db.connect()?;
        if let Err(error) = conn
            .execute_batch(&format!("PRAGMA journal_mode = {mode}"))
            .await
        {
            tracing::warn!(mode, error = %error, "Failed to set SQLite journal_mode");
        }
        Ok(())
    }

    pub async fn sync(&self) -> Result<()> {
        if self.kind != StoreKind::Replica {
            return Ok(());
        }
        match self.db.sync().await {
            Ok(replicated) => tracing::info!("Database synced: {:?}", replicated),
            Err(error) => tracing::warn!(error = %error, "Replica sync failed"),
        }
        Ok(())
    }
}

fn connection_pragmas(config: &DatabaseConfig) -> String {
    format!(
        "PRAGMA busy_timeout = {}; PRAGMA synchronous = {};",
        config.busy_timeout_ms,
        normalize_synchronous(&config.synchronous)
    )
}

fn normalize_journal_mode(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "DELETE" => "DELETE",
        "TRUNCATE" => "TRUNCATE",
        "PERSIST" => "PERSIST",
        "MEMORY" => "MEMORY",
        "OFF" => "OFF",
        _ => "WAL",
    }
}

fn normalize_synchronous(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "OFF" => "OFF",
        "FULL" => "FULL",
        "EXTRA" => "EXTRA",
        _ => "NORMAL",
    }
}
