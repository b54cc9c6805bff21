//! Complete RAG pipeline: Embed -> Search -> Budget -> Generate

use std::io::Write;

use chrono::DateTime;
use chrono::Local;
use tracing::debug;
use tracing::info;

use crate::cli::output::format_elapsed;
use crate::cli::output::format_timestamp;
use crate::config::AppConfig;
use crate::embeddings::EmbeddingClient;
use crate::errors::Result;
use crate::llm::LlmService;
use crate::rag::ContextBudgeter;
use crate::rag::ContextWindow;
use crate::search::DocumentFields;
use crate::search::SearchClient;
use crate::tokens::TiktokenCounter;

const FINAL_ANSWER_BANNER: &str = "########### Final Answer ############";

/// Complete RAG service
pub struct RagService {
    embedder: EmbeddingClient,
    search: SearchClient,
    budgeter: ContextBudgeter<TiktokenCounter>,
    llm: LlmService,
}

impl RagService {
    /// Create a new RAG service
    ///
    /// Nothing is validated against the remote services here; missing
    /// endpoints or keys surface when the corresponding call is made.
    ///
    /// # Errors
    /// - HTTP client build errors
    /// - Unknown token encoding
    /// - Unreadable system prompt file
    pub fn new(config: &AppConfig) -> Result<Self> {
        let embedder = EmbeddingClient::new(&config.openai)?;
        let search = SearchClient::new(&config.search)?;
        let counter = TiktokenCounter::new(config.encoding())?;
        let budgeter = ContextBudgeter::new(counter, config.system_prompt()?, config.max_tokens())
            .with_fields(DocumentFields::from_config(&config.search));
        let llm = LlmService::new(&config.openai)?;

        Ok(Self::from_services(embedder, search, budgeter, llm))
    }

    /// Create from existing services
    #[must_use]
    pub const fn from_services(
        embedder: EmbeddingClient,
        search: SearchClient,
        budgeter: ContextBudgeter<TiktokenCounter>,
        llm: LlmService,
    ) -> Self {
        Self {
            embedder,
            search,
            budgeter,
            llm,
        }
    }

    /// Answer `query`, writing the retrieval trace, token report, timing and
    /// final answer to `out`.
    ///
    /// # Errors
    /// - Embedding, search or chat API failures (network, auth, malformed responses)
    /// - Write errors on `out`
    pub async fn query<W: Write>(&self, query: &str, out: &mut W) -> Result<RagResponse> {
        info!("Processing RAG query: {}", query);

        debug!("Step 1: Vectorizing query");
        let vector = self.embedder.generate(query).await?;
        debug!("Query vector has {} dimensions", vector.len());

        debug!("Step 2: Hybrid search");
        let results = self.search.search(query, &vector).await?;

        debug!("Step 3: Budgeting context");
        let outcome = self.budgeter.accumulate(query, results, out).await?;
        info!(
            "Context holds {} records, {} tokens",
            outcome.window.len(),
            outcome.total_tokens
        );

        debug!("Step 4: Generating answer");
        let system_prompt = self.budgeter.assemble(&outcome.window);

        let started_at = Local::now();
        writeln!(out, "LLM - Start time:  {}", format_timestamp(&started_at))?;

        let answer = self.llm.generate(&system_prompt, query).await?;

        let finished_at = Local::now();
        writeln!(out, "LLM - End time:  {}", format_timestamp(&finished_at))?;
        let duration = finished_at - started_at;
        writeln!(out, "Duration:  {}", format_elapsed(duration))?;

        writeln!(out, "\n{FINAL_ANSWER_BANNER}")?;
        writeln!(out, "{answer}")?;

        info!("RAG query completed successfully");

        Ok(RagResponse {
            query: query.to_string(),
            answer,
            sources: outcome.window,
            total_tokens: outcome.total_tokens,
            started_at,
            finished_at,
        })
    }

    /// Get budgeter reference
    #[must_use]
    pub const fn budgeter(&self) -> &ContextBudgeter<TiktokenCounter> {
        &self.budgeter
    }
}

/// RAG response
#[derive(Debug, Clone)]
pub struct RagResponse {
    pub query: String,
    pub answer: String,
    pub sources: ContextWindow,
    /// Prompt plus query tokens sent to the model
    pub total_tokens: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RagResponse {
    /// Wall-clock time spent in answer generation
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
