//! RAG (Retrieval-Augmented Generation) module
//!
//! This module provides the end-to-end answer flow:
//! - Query vectorization and hybrid retrieval
//! - Token-budgeted accumulation of results into a context window
//! - Prompt assembly from the window
//! - LLM-based answer generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use searchrag::config::AppConfig;
//! use searchrag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load(None)?;
//!     let service = RagService::new(&config)?;
//!
//!     let response = service
//!         .query("What is the expense approval flow?", &mut std::io::stdout())
//!         .await?;
//!     println!("Sources: {} chunks", response.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod prompts;

use std::fmt;

use unicode_general_category::get_general_category;
use unicode_general_category::GeneralCategory;

pub use context::BudgetOutcome;
pub use context::ContextBudgeter;
pub use context::RetainedRecord;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
pub use prompts::build_answer_prompt;
pub use prompts::ANSWER_SYSTEM_PROMPT;

use crate::search::DocumentFields;
use crate::search::SearchDocument;

/// Placeholder for any text field the service did not return
pub const MISSING_FIELD: &str = "None";

/// Normalized search record
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Chunk id; shown in the trace but not serialized into the prompt
    pub id: String,
    pub filepath: String,
    pub caption: String,
    /// Semantic reranker score, 0.00 to 4.00; `None` when not returned
    pub reranker_score: Option<f64>,
    pub content: String,
}

impl SearchResult {
    /// Normalize a raw record, defaulting every missing field
    #[must_use]
    pub fn from_document(doc: &SearchDocument, fields: &DocumentFields) -> Self {
        let text = |field: &str| {
            doc.get_text(field)
                .unwrap_or_else(|| MISSING_FIELD.to_string())
        };

        Self {
            id: text(&fields.id),
            filepath: text(&fields.title),
            caption: doc
                .first_caption()
                .unwrap_or_else(|| MISSING_FIELD.to_string()),
            reranker_score: doc.reranker_score(),
            content: text(&fields.content),
        }
    }
}

/// Renders as a map literal: `{'filepath': ..., 'caption': ..., 'reranker_score': ..., 'content': ...}`
impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{'filepath': {}, 'caption': {}, 'reranker_score': {}, 'content': {}}}",
            quote_literal(&self.filepath),
            quote_literal(&self.caption),
            score_literal(self.reranker_score),
            quote_literal(&self.content)
        )
    }
}

/// Results retained for the prompt, in retrieval order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextWindow {
    results: Vec<SearchResult>,
}

impl ContextWindow {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: SearchResult) {
        self.results.push(result);
    }

    /// Remove the most recently appended result
    pub fn pop(&mut self) -> Option<SearchResult> {
        self.results.pop()
    }

    #[must_use]
    pub fn last(&self) -> Option<&SearchResult> {
        self.results.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.results.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[SearchResult] {
        &self.results
    }
}

impl<'a> IntoIterator for &'a ContextWindow {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Renders as a list literal of records, `[]` when empty
impl fmt::Display for ContextWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, result) in self.results.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{result}")?;
        }
        f.write_str("]")
    }
}

/// Quote a string as a literal: single quotes unless the text contains a
/// single quote and no double quote. Non-printable characters are escaped
/// as `\xNN`, `\uNNNN` or `\UNNNNNNNN`.
#[must_use]
pub fn quote_literal(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => push_escaped(&mut out, c),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Printable unless a control, format, surrogate, private-use, unassigned or
/// separator character; the ASCII space is printable.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
            | GeneralCategory::SpaceSeparator
    )
}

fn push_escaped(out: &mut String, c: char) {
    let code = u32::from(c);
    let escaped = if code < 0x100 {
        format!("\\x{code:02x}")
    } else if code < 0x1_0000 {
        format!("\\u{code:04x}")
    } else {
        format!("\\U{code:08x}")
    };
    out.push_str(&escaped);
}

/// Shortest round-trip form, keeping a `.0` on integral values. Decimal
/// exponents below -4 or from 16 up switch to `1e-05` / `1e+16` notation.
#[must_use]
pub fn format_score(score: f64) -> String {
    if score.is_nan() {
        return "nan".to_string();
    }
    if score.is_infinite() {
        return if score > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{score:e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if score != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exponent.abs());
    }

    let fixed = format!("{score}");
    if fixed.contains('.') {
        fixed
    } else {
        format!("{fixed}.0")
    }
}

/// Score as it appears in the prompt and trace; a missing score is `0`
#[must_use]
pub fn score_literal(score: Option<f64>) -> String {
    score.map_or_else(|| "0".to_string(), format_score)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_document_full() {
        let doc = SearchDocument::from(json!({
            "chunk_id": "doc1_pages_3",
            "title": "就業規則.pdf",
            "chunk": "第1条 この規則は...",
            "@search.captions": [{"text": "この規則は", "highlights": "<em>規則</em>"}],
            "@search.rerankerScore": 3.1415
        }));

        let result = SearchResult::from_document(&doc, &DocumentFields::default());
        assert_eq!(result.id, "doc1_pages_3");
        assert_eq!(result.filepath, "就業規則.pdf");
        assert_eq!(result.caption, "この規則は");
        assert_eq!(result.reranker_score, Some(3.1415));
        assert_eq!(result.content, "第1条 この規則は...");
    }

    #[test]
    fn test_from_document_missing_fields_default() {
        let result = SearchResult::from_document(&SearchDocument::default(), &DocumentFields::default());

        assert_eq!(result.id, "None");
        assert_eq!(result.filepath, "None");
        assert_eq!(result.caption, "None");
        assert_eq!(result.reranker_score, None);
        assert_eq!(result.content, "None");
    }

    #[test]
    fn test_from_document_custom_fields() {
        let doc = SearchDocument::from(json!({"name": "x.docx", "text": "body", "key": "k1"}));
        let fields = DocumentFields {
            title: "name".to_string(),
            content: "text".to_string(),
            id: "key".to_string(),
        };

        let result = SearchResult::from_document(&doc, &fields);
        assert_eq!(result.filepath, "x.docx");
        assert_eq!(result.content, "body");
        assert_eq!(result.id, "k1");
    }

    #[test]
    fn test_window_push_pop() {
        let mut window = ContextWindow::new();
        assert!(window.is_empty());

        window.push(SearchResult::from_document(&SearchDocument::default(), &DocumentFields::default()));
        assert_eq!(window.len(), 1);
        assert!(window.pop().is_some());
        assert!(window.is_empty());
        assert!(window.pop().is_none());
    }

    #[test]
    fn test_window_display() {
        let mut window = ContextWindow::new();
        assert_eq!(window.to_string(), "[]");

        window.push(SearchResult {
            id: "1".to_string(),
            filepath: "a.pdf".to_string(),
            caption: "cap".to_string(),
            reranker_score: Some(2.0),
            content: "line1\nline2".to_string(),
        });
        window.push(SearchResult {
            id: "2".to_string(),
            filepath: "b.pdf".to_string(),
            caption: "None".to_string(),
            reranker_score: None,
            content: "x".to_string(),
        });

        assert_eq!(
            window.to_string(),
            "[{'filepath': 'a.pdf', 'caption': 'cap', 'reranker_score': 2.0, 'content': 'line1\\nline2'}, \
             {'filepath': 'b.pdf', 'caption': 'None', 'reranker_score': 0, 'content': 'x'}]"
        );
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("plain"), "'plain'");
        assert_eq!(quote_literal("it's"), "\"it's\"");
        assert_eq!(quote_literal("both ' and \""), "'both \\' and \"'");
        assert_eq!(quote_literal("back\\slash\ttab"), "'back\\\\slash\\ttab'");
        assert_eq!(quote_literal("bell\u{7}"), "'bell\\x07'");
        assert_eq!(quote_literal("日本語"), "'日本語'");
    }

    #[test]
    fn test_quote_literal_escapes_unicode_separators() {
        assert_eq!(quote_literal("規程\u{3000}第1条"), "'規程\\u3000第1条'");
        assert_eq!(quote_literal("a\u{a0}b"), "'a\\xa0b'");
        assert_eq!(quote_literal("zero\u{200b}width"), "'zero\\u200bwidth'");
        assert_eq!(quote_literal("line\u{2028}sep"), "'line\\u2028sep'");
        assert_eq!(quote_literal("del\u{7f}"), "'del\\x7f'");
        assert_eq!(quote_literal("pua\u{f0000}"), "'pua\\U000f0000'");
        assert_eq!(quote_literal("a b"), "'a b'");
        assert_eq!(quote_literal("全角「括弧」"), "'全角「括弧」'");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(4.0), "4.0");
        assert_eq!(format_score(2.5), "2.5");
        assert_eq!(format_score(1.2345678), "1.2345678");
        assert_eq!(format_score(0.0001), "0.0001");
        assert_eq!(format_score(0.00001), "1e-05");
        assert_eq!(format_score(0.000015), "1.5e-05");
        assert_eq!(format_score(1e15), "1000000000000000.0");
        assert_eq!(format_score(1e16), "1e+16");
        assert_eq!(format_score(-0.0), "-0.0");
    }

    #[test]
    fn test_score_literal_missing_is_int_zero() {
        assert_eq!(score_literal(None), "0");
        assert_eq!(score_literal(Some(0.0)), "0.0");
        assert_eq!(score_literal(Some(3.2)), "3.2");
    }
}
