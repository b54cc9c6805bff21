//! Answer prompt template and assembly

use crate::rag::ContextWindow;

/// Built-in system template; the serialized context window is appended directly after it
pub const ANSWER_SYSTEM_PROMPT: &str = r#"You are an assistant that answers questions about internal company documents.

Instructions:
1. Answer the user's question using only the search results below
2. Answer in the same language as the question
3. Cite the filepath of every document you rely on
4. If the search results do not contain the answer, say that you could not find it
5. Do not invent policies, numbers, dates or names that are not in the search results

Each search result has a filepath, an extractive caption, a reranker_score between 0 and 4
(higher is more relevant) and the chunk content.

Search results:
"#;

/// Build the system prompt: template immediately followed by the serialized window.
///
/// Pure; equal inputs always give byte-identical output.
#[must_use]
pub fn build_answer_prompt(template: &str, window: &ContextWindow) -> String {
    format!("{template}{window}")
}
