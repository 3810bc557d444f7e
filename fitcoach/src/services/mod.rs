mod answer;
mod chat;
mod fitness;
mod loader;

pub use answer::{AnswerGenerator, HISTORY_WINDOW};
pub use chat::{ChatService, CONVERSATION_LIST_LIMIT, RELEVANCE_THRESHOLD, TOP_K};
pub use fitness::{FitnessContextBuilder, NO_FITNESS_DATA};
pub use loader::{KnowledgeLoader, DEFAULT_BATCH_SIZE};
