//! Wire types for the chat API.
//!
//! Kept apart from the domain models in `src/models/`. Field casing follows
//! what existing clients send and read: camelCase for ask/create payloads,
//! snake_case for stored rows.

pub mod chat;

pub use chat::*;
