use serde::{Deserialize, Serialize};

/// A corpus row ready to be written to the knowledge store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewKnowledgeChunk {
    pub book_title: String,
    pub chunk_index: i64,
    pub content: String,
    pub embedding: Vec<f32>,
}

/// A stored chunk returned by nearest-neighbour search, annotated with its
/// cosine similarity to the query vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: i64,
    pub book_title: String,
    pub chunk_index: i64,
    pub content: String,
    pub similarity: f32,
}

/// Post-load verification figures for the knowledge table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KnowledgeStats {
    pub row_count: u64,
    pub distinct_titles: u64,
    /// Vector length of the first stored row, if any.
    pub sample_dimensions: Option<usize>,
    /// Similarity of the first stored vector with itself; ~1.0 for healthy data.
    pub self_similarity: Option<f64>,
}

/// Outcome of one bulk corpus load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Rows removed from the previous corpus.
    pub deleted: u64,
    pub inserted: u64,
    /// Rows skipped for bad data plus rows in batches the store rejected.
    pub failed: u64,
    pub stats: KnowledgeStats,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}
