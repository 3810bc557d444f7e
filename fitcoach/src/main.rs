use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitcoach::api::{create_router, AppState};
use fitcoach::config::Config;
use fitcoach::db::{Database, DatabaseBackend, LibSqlBackend};
use fitcoach::embeddings::EmbeddingProvider;
use fitcoach::llm::LlmProvider;
use fitcoach::migration::{self, MigrationDecision};
use fitcoach::services::{KnowledgeLoader, DEFAULT_BATCH_SIZE};

#[derive(Parser)]
#[command(name = "fitcoach")]
#[command(about = "AI fitness coach backed by book knowledge and your training log")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Recreate the knowledge table when the embedding width changed
        #[arg(long)]
        rebuild_knowledge: bool,
    },
    /// Replace the knowledge table with rows from a pre-embedded CSV export
    LoadKnowledge {
        /// CSV with columns book_title,chunk_index,content,embedding
        csv_path: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitcoach=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Initializing database...");
    let raw_db = Database::new(&config.database, config.embeddings.dimensions).await?;
    let db: Arc<dyn DatabaseBackend> = Arc::new(LibSqlBackend::new(raw_db));

    match args.command.unwrap_or(Command::Serve {
        rebuild_knowledge: false,
    }) {
        Command::Serve { rebuild_knowledge } => serve(config, db, rebuild_knowledge).await,
        Command::LoadKnowledge {
            csv_path,
            batch_size,
        } => load_knowledge(config, db, csv_path, batch_size).await,
    }
}

async fn ensure_dimensions(
    db: &dyn DatabaseBackend,
    dimensions: usize,
    rebuild_knowledge: bool,
) -> anyhow::Result<()> {
    match migration::check_dimension_compatibility(db, dimensions, rebuild_knowledge).await? {
        MigrationDecision::NotNeeded => Ok(()),
        MigrationDecision::Approved => {
            migration::rebuild_knowledge_table(db, dimensions).await?;
            Ok(())
        }
        MigrationDecision::Rejected => {
            tracing::error!("Rebuild rejected. Cannot start with dimension mismatch.");
            Err(anyhow::anyhow!(
                "Embedding dimension mismatch - use --rebuild-knowledge to recreate the knowledge table"
            ))
        }
    }
}

async fn serve(
    config: Config,
    db: Arc<dyn DatabaseBackend>,
    rebuild_knowledge: bool,
) -> anyhow::Result<()> {
    ensure_dimensions(&*db, config.embeddings.dimensions, rebuild_knowledge).await?;

    tracing::info!(
        "Using embedding model {} at {}",
        config.embeddings.model,
        config.embeddings.base_url
    );
    let embeddings = EmbeddingProvider::new(&config.embeddings)?;

    tracing::info!("Initializing completion provider: {}...", config.llm.model);
    let llm = LlmProvider::new(&config.llm);
    if !llm.is_available() {
        tracing::warn!("Completion API key missing - /api/chat/ask will return 503");
    }

    let state = AppState::new(config.clone(), db, embeddings, llm);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Fitcoach starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);
    tracing::info!("  API docs:     http://{}/api/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/openapi.json", addr);

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel_token.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn load_knowledge(
    config: Config,
    db: Arc<dyn DatabaseBackend>,
    csv_path: PathBuf,
    batch_size: usize,
) -> anyhow::Result<()> {
    ensure_dimensions(&*db, config.embeddings.dimensions, false).await?;

    let loader =
        KnowledgeLoader::new(db.clone(), config.embeddings.dimensions).with_batch_size(batch_size);
    let report = loader.load_path(&csv_path).await?;
    db.sync().await?;

    tracing::info!(
        deleted = report.deleted,
        inserted = report.inserted,
        failed = report.failed,
        rows = report.stats.row_count,
        titles = report.stats.distinct_titles,
        "Knowledge load complete"
    );

    if !report.is_clean() {
        return Err(anyhow::anyhow!(
            "{} corpus rows failed to load",
            report.failed
        ));
    }
    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", error);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install SIGTERM handler: {}", error);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining requests...");
    cancel_token.cancel();
}
