//! Prompt templates for the coach's answers.
//!
//! Plain `format!()` interpolation; the wording is fixed and tests pin it.

use crate::models::{Message, MessageRole, ScoredChunk};

/// Placeholder used when no chunk clears the relevance floor.
pub const NO_BOOK_CONTENT: &str = "No relevant book content found.";

const SOURCE_SEPARATOR: &str = "\n\n---\n\n";

/// Render retrieved chunks as numbered, titled blocks.
///
/// ```
/// use fitcoach::llm::prompts::render_book_context;
///
/// assert_eq!(render_book_context(&[]), "No relevant book content found.");
/// ```
pub fn render_book_context(chunks: &[ScoredChunk]) -> String {
    if chunks.is_empty() {
        return NO_BOOK_CONTENT.to_string();
    }

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Source {}: {}]\n{}", i + 1, chunk.book_title, chunk.content))
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR)
}

/// Render the last `window` messages, oldest first, one `Speaker: text` line each.
pub fn render_history(history: &[Message], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    history[start..]
        .iter()
        .map(|msg| format!("{}: {}", speaker(msg.role), msg.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Anything not said by the user is voiced as the coach.
fn speaker(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "User",
        MessageRole::Assistant | MessageRole::System => "Assistant",
    }
}

/// System instruction for answer generation. The conversation section is
/// omitted entirely when `history` is empty.
pub fn answer_system_prompt(book_context: &str, fitness_summary: &str, history: &str) -> String {
    let history_block = if history.is_empty() {
        String::new()
    } else {
        format!("3. Recent Conversation:\n{history}\n")
    };

    format!(
        r#"You are an expert AI fitness and nutrition coach with access to professional fitness books and the user's personal fitness data.

AVAILABLE INFORMATION:

1. Book Knowledge:
{book_context}

2. User's Fitness Data:
{fitness_summary}

{history_block}
INSTRUCTIONS:
- Provide personalized advice based on the user's actual fitness data when relevant
- Reference specific workouts, exercises, or metrics from their data
- Use book knowledge to support your recommendations with evidence-based information
- Be encouraging and motivational
- Keep responses concise and actionable (2-4 paragraphs max)
- If you don't have relevant information, say so honestly"#
    )
}
