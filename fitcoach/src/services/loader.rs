use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::db::DatabaseBackend;
use crate::error::{CoachError, Result};
use crate::models::{KnowledgeStats, LoadReport, NewKnowledgeChunk};

pub const DEFAULT_BATCH_SIZE: usize = 100;
const PROGRESS_INTERVAL: u64 = 500;
const SELF_SIMILARITY_TOLERANCE: f64 = 0.001;

/// One line of the pre-embedded corpus export. `embedding` is the vector as
/// JSON-style text, e.g. `[0.12, -0.05, ...]`.
#[derive(Debug, Deserialize)]
struct CsvRow {
    book_title: String,
    chunk_index: i64,
    content: String,
    embedding: String,
}

/// Offline bulk loader: replaces the whole knowledge table from a CSV export.
pub struct KnowledgeLoader {
    db: Arc<dyn DatabaseBackend>,
    dimensions: usize,
    batch_size: usize,
}

impl KnowledgeLoader {
    pub fn new(db: Arc<dyn DatabaseBackend>, dimensions: usize) -> Self {
        Self {
            db,
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub async fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadReport> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), batch_size = self.batch_size, "Loading knowledge corpus");
        let file = std::fs::File::open(path)?;
        self.load_reader(file).await
    }

    /// Delete-then-reinsert. Bad rows and rejected batches are counted as
    /// failures and loading continues with the next row.
    pub async fn load_reader<R: Read>(&self, reader: R) -> Result<LoadReport> {
        self.preflight().await?;

        let deleted = self.db.clear_knowledge().await?;
        tracing::info!(deleted, "Cleared existing knowledge rows");

        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut report = LoadReport {
            deleted,
            ..LoadReport::default()
        };
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut processed = 0u64;

        for (line, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
            processed += 1;

            match record
                .map_err(CoachError::from)
                .and_then(|row| self.parse_row(row))
            {
                Ok(chunk) => batch.push(chunk),
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(row = line + 1, error = %error, "Skipping corpus row");
                }
            }

            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut report).await;
            }

            if processed % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    processed,
                    inserted = report.inserted,
                    failed = report.failed,
                    "Load progress"
                );
            }
        }

        self.flush(&mut batch, &mut report).await;

        tracing::info!(
            inserted = report.inserted,
            failed = report.failed,
            "Finished inserting knowledge rows"
        );

        report.stats = self.db.knowledge_stats().await?;
        self.verify(&report);

        Ok(report)
    }

    async fn preflight(&self) -> Result<()> {
        self.db.ping().await?;
        if !self.db.knowledge_table_exists().await? {
            return Err(CoachError::Internal(
                "book_knowledge table does not exist".to_string(),
            ));
        }
        Ok(())
    }

    fn parse_row(&self, row: CsvRow) -> Result<NewKnowledgeChunk> {
        let embedding: Vec<f32> = serde_json::from_str(row.embedding.trim())?;

        if embedding.len() != self.dimensions {
            return Err(CoachError::Validation(format!(
                "Expected {} dimensions, got {}",
                self.dimensions,
                embedding.len()
            )));
        }

        Ok(NewKnowledgeChunk {
            book_title: row.book_title,
            chunk_index: row.chunk_index,
            content: row.content,
            embedding,
        })
    }

    async fn flush(&self, batch: &mut Vec<NewKnowledgeChunk>, report: &mut LoadReport) {
        if batch.is_empty() {
            return;
        }

        let rows = batch.len() as u64;
        match self.db.insert_knowledge_batch(batch).await {
            Ok(inserted) => report.inserted += inserted,
            Err(error) => {
                report.failed += rows;
                tracing::error!(
                    rows,
                    after = report.inserted + report.failed,
                    error = %error,
                    "Failed to insert knowledge batch"
                );
            }
        }
        batch.clear();
    }

    fn verify(&self, report: &LoadReport) {
        let stats: &KnowledgeStats = &report.stats;

        if stats.row_count != report.inserted {
            tracing::warn!(
                rows = stats.row_count,
                inserted = report.inserted,
                "Knowledge row count does not match inserted rows"
            );
        }

        tracing::info!(distinct_titles = stats.distinct_titles, "Distinct book titles");

        if let Some(dims) = stats.sample_dimensions {
            if dims != self.dimensions {
                tracing::warn!(dims, expected = self.dimensions, "Sample vector has unexpected width");
            }
        }

        if let Some(similarity) = stats.self_similarity {
            if (similarity - 1.0).abs() > SELF_SIMILARITY_TOLERANCE {
                tracing::warn!(similarity, "Self-similarity is not ~1.0, embeddings may be corrupted");
            } else {
                tracing::info!(similarity, "Self-similarity check passed");
            }
        }
    }
}
