use std::io::{self, Write};

use crate::db::traits::DatabaseBackend;
use crate::error::Result;

#[derive(Debug, PartialEq, Eq)]
pub enum MigrationDecision {
    NotNeeded,
    Approved,
    Rejected,
}

/// Compare the configured embedding width with the one recorded in the store.
///
/// A fresh store records the configured width. On mismatch the operator is
/// asked on stdin unless `force_rebuild` is set.
pub async fn check_dimension_compatibility(
    db: &dyn DatabaseBackend,
    model_dimensions: usize,
    force_rebuild: bool,
) -> Result<MigrationDecision> {
    let stored_dimensions = db.get_embedding_dimensions().await?;

    match stored_dimensions {
        None => {
            tracing::info!(
                "Fresh database, storing embedding dimensions: {}",
                model_dimensions
            );
            db.set_embedding_dimensions(model_dimensions).await?;
            Ok(MigrationDecision::NotNeeded)
        }
        Some(db_dims) if db_dims == model_dimensions => {
            tracing::info!("Embedding dimensions match: {}", model_dimensions);
            Ok(MigrationDecision::NotNeeded)
        }
        Some(db_dims) => {
            tracing::warn!(
                "Dimension mismatch: database has {} dimensions, embedding model produces {}",
                db_dims,
                model_dimensions
            );

            if force_rebuild {
                tracing::info!("Rebuild flag set, recreating knowledge table");
                return Ok(MigrationDecision::Approved);
            }

            print!(
                "\nEmbedding dimension mismatch detected!\n\
                 Database: {db_dims} dimensions\n\
                 Model: {model_dimensions} dimensions\n\n\
                 The knowledge table must be recreated and the corpus reloaded.\n\
                 Proceed? [y/N]: "
            );
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            let answer = input.trim().to_lowercase();
            if answer == "y" || answer == "yes" {
                Ok(MigrationDecision::Approved)
            } else {
                Ok(MigrationDecision::Rejected)
            }
        }
    }
}

/// Recreate the knowledge table at the new width and record it.
/// Conversations and tracker data are untouched.
pub async fn rebuild_knowledge_table(db: &dyn DatabaseBackend, new_dimensions: usize) -> Result<()> {
    tracing::info!(
        "Recreating knowledge table with {} dimensions",
        new_dimensions
    );

    db.recreate_knowledge_table(new_dimensions).await?;
    db.set_embedding_dimensions(new_dimensions).await?;

    tracing::warn!("Knowledge table is empty; run `fitcoach load-knowledge <CSV>` to reload the corpus");

    Ok(())
}
