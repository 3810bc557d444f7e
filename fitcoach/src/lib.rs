//! Retrieval-augmented fitness coach.
//!
//! Answers training questions by combining passages from pre-embedded
//! fitness books with a summary of the user's own logged workouts, cardio
//! and body metrics, then asking an external completion service to write
//! the reply. Conversations are persisted in the same libSQL store.

pub mod api;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod migration;
pub mod models;
pub mod services;
