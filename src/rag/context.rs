//! Token-budgeted context accumulation

use std::io::Write;

use futures::Stream;
use futures::StreamExt;
use tracing::debug;

use crate::errors::Result;
use crate::rag::build_answer_prompt;
use crate::rag::score_literal;
use crate::rag::ContextWindow;
use crate::rag::SearchResult;
use crate::search::DocumentFields;
use crate::search::SearchDocument;
use crate::tokens::TokenCount;

/// Default ceiling on prompt tokens plus query tokens
pub const DEFAULT_MAX_TOKENS: usize = 120_000;

const TRACE_SEPARATOR: &str = "--------------------------------------------------";

/// Trace entry for a record that made it into the window
#[derive(Debug, Clone, PartialEq)]
pub struct RetainedRecord {
    /// 1-based position in the window
    pub ordinal: usize,
    pub id: String,
    pub reranker_score: Option<f64>,
    pub filepath: String,
    pub caption: String,
    /// Tokens in the record's content alone
    pub content_tokens: usize,
}

/// Result of one budgeting run
#[derive(Debug, Clone)]
pub struct BudgetOutcome {
    pub window: ContextWindow,
    pub query_tokens: usize,
    /// Tokens in the prompt assembled from the final window
    pub system_tokens: usize,
    pub total_tokens: usize,
    pub retained: Vec<RetainedRecord>,
    /// True when a record was rejected for breaching the ceiling
    pub halted: bool,
}

/// Accumulates ranked search records into a window whose assembled prompt
/// plus the query stays within `max_tokens`.
///
/// The prompt is re-assembled and re-measured after every append. The first
/// record that breaches the ceiling is dropped and nothing after it is read.
pub struct ContextBudgeter<C> {
    counter: C,
    template: String,
    max_tokens: usize,
    fields: DocumentFields,
}

impl<C: TokenCount> ContextBudgeter<C> {
    /// Create a new budgeter
    pub fn new(counter: C, template: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            counter,
            template: template.into(),
            max_tokens,
            fields: DocumentFields::default(),
        }
    }

    /// Use non-default index field names when normalizing records
    #[must_use]
    pub fn with_fields(mut self, fields: DocumentFields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub const fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Assemble the system prompt for a window
    #[must_use]
    pub fn assemble(&self, window: &ContextWindow) -> String {
        build_answer_prompt(&self.template, window)
    }

    /// Token length of the prompt assembled from `window`
    #[must_use]
    pub fn measure(&self, window: &ContextWindow) -> usize {
        self.counter.count(&self.assemble(window))
    }

    /// Consume `results` in order, writing a trace block for every retained
    /// record and a final `total_token` line to `out`.
    ///
    /// # Errors
    /// - Errors yielded by the result stream (remote paging failures)
    /// - Write errors on `out`
    pub async fn accumulate<S, W>(&self, query: &str, mut results: S, out: &mut W) -> Result<BudgetOutcome>
    where
        S: Stream<Item = Result<SearchDocument>> + Unpin,
        W: Write,
    {
        let query_tokens = self.counter.count(query);
        let mut window = ContextWindow::new();
        let mut retained: Vec<RetainedRecord> = Vec::new();
        let mut halted = false;

        while let Some(doc) = results.next().await {
            let result = SearchResult::from_document(&doc?, &self.fields);
            window.push(result);

            let system_tokens = self.measure(&window);
            if system_tokens + query_tokens > self.max_tokens {
                if let Some(rejected) = window.pop() {
                    debug!(
                        "Token ceiling reached at {} + {} > {}, dropping {} and stopping",
                        system_tokens, query_tokens, self.max_tokens, rejected.id
                    );
                }
                halted = true;
                break;
            }

            let Some(last) = window.last() else {
                continue;
            };
            let record = RetainedRecord {
                ordinal: retained.len() + 1,
                id: last.id.clone(),
                reranker_score: last.reranker_score,
                filepath: last.filepath.clone(),
                caption: last.caption.clone(),
                content_tokens: self.counter.count(&last.content),
            };
            debug!(
                "Retained #{} {} (running total {})",
                record.ordinal,
                record.id,
                system_tokens + query_tokens
            );
            write_trace(out, &record)?;
            retained.push(record);
        }

        let system_tokens = self.measure(&window);
        let total_tokens = system_tokens + query_tokens;
        writeln!(out, "total_token : {total_tokens}\n")?;

        Ok(BudgetOutcome {
            window,
            query_tokens,
            system_tokens,
            total_tokens,
            retained,
            halted,
        })
    }
}

fn write_trace<W: Write>(out: &mut W, record: &RetainedRecord) -> std::io::Result<()> {
    writeln!(out, "({}). id: {}", record.ordinal, record.id)?;
    writeln!(out, "reranker_score: {}", score_literal(record.reranker_score))?;
    writeln!(out, "filepath: {}", record.filepath)?;
    writeln!(out, "caption: {}", record.caption)?;
    writeln!(out, "content_token: {}", record.content_tokens)?;
    writeln!(out, "{TRACE_SEPARATOR}")
}
