//! Azure AI Search hybrid query client

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use futures::Stream;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::SearchConfig;
use crate::errors::Result;
use crate::errors::SearchRagError;
use crate::search::types::SearchDocument;
use crate::search::types::SearchPage;
use crate::search::types::SearchRequest;
use crate::search::types::VectorQuery;

/// Client for one search index
pub struct SearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
    index: String,
    api_version: String,
    vector_field: String,
    semantic_configuration: String,
    query_language: String,
    top: usize,
}

impl SearchClient {
    /// Create a new search client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchRagError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            index: config.index.clone(),
            api_version: config.api_version.clone(),
            vector_field: config.vector_field.clone(),
            semantic_configuration: config.semantic_configuration.clone(),
            query_language: config.query_language.clone(),
            top: config.top,
        })
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/indexes/{}/docs/search", self.endpoint, self.index)
    }

    /// Run one hybrid query: keyword text, vector similarity on the vector
    /// field, semantic reranking and extractive captions.
    ///
    /// The first page is fetched before returning; later pages are fetched
    /// lazily as the stream is drained.
    ///
    /// # Errors
    /// - Network errors, authentication failures, non-success status codes
    /// - Malformed response bodies
    pub async fn search(&self, query: &str, vector: &[f32]) -> Result<SearchResultStream> {
        let request = SearchRequest {
            search: query,
            query_language: &self.query_language,
            vector_queries: vec![VectorQuery {
                kind: "vector",
                vector,
                fields: &self.vector_field,
                k: self.top,
            }],
            query_type: "semantic",
            semantic_configuration: &self.semantic_configuration,
            captions: "extractive",
            top: self.top,
        };
        let body = serde_json::to_value(&request)?;

        let mut cursor = PageCursor {
            client: self.client.clone(),
            url: self.url(),
            api_key: self.api_key.clone(),
            api_version: self.api_version.clone(),
            buffered: VecDeque::new(),
            next_page: None,
            remaining: self.top,
        };

        debug!("Calling Azure AI Search: {} (top={})", cursor.url, self.top);
        let page = cursor.fetch(&body).await?;
        cursor.absorb(page);

        Ok(SearchResultStream::from_cursor(cursor))
    }
}

/// Paging state behind a [`SearchResultStream`]
struct PageCursor {
    client: Client,
    url: String,
    api_key: String,
    api_version: String,
    buffered: VecDeque<SearchDocument>,
    next_page: Option<Value>,
    remaining: usize,
}

impl PageCursor {
    async fn fetch(&self, body: &Value) -> Result<SearchPage> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| SearchRagError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchRagError::SearchError(format!(
                "Azure AI Search error ({status}): {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SearchRagError::SearchError(format!("Failed to parse response: {e}")))
    }

    fn absorb(&mut self, page: SearchPage) {
        debug!(
            "Search page with {} records (more pages: {})",
            page.value.len(),
            page.next_page_parameters.is_some()
        );
        // An empty page ends paging even if the service offers another one
        self.next_page = if page.value.is_empty() {
            None
        } else {
            page.next_page_parameters
        };
        self.buffered.extend(page.value);
    }

    async fn next_document(mut self) -> Option<(Result<SearchDocument>, Self)> {
        loop {
            if self.remaining == 0 {
                return None;
            }
            if let Some(doc) = self.buffered.pop_front() {
                self.remaining -= 1;
                return Some((Ok(doc), self));
            }

            let body = self.next_page.take()?;
            match self.fetch(&body).await {
                Ok(page) => self.absorb(page),
                Err(e) => {
                    self.remaining = 0;
                    return Some((Err(e), self));
                }
            }
        }
    }
}

/// Ranked, finite, single-pass sequence of raw search records.
///
/// Records arrive in the service's order (highest relevance first). The
/// stream cannot be rewound; running the query again is the only way to
/// restart it.
pub struct SearchResultStream {
    stream: Pin<Box<dyn Stream<Item = Result<SearchDocument>> + Send>>,
}

impl SearchResultStream {
    pub fn new(stream: Pin<Box<dyn Stream<Item = Result<SearchDocument>> + Send>>) -> Self {
        Self { stream }
    }

    /// Stream over already-materialized records
    pub fn from_documents(documents: Vec<SearchDocument>) -> Self {
        Self::new(Box::pin(futures::stream::iter(documents.into_iter().map(Ok))))
    }

    fn from_cursor(cursor: PageCursor) -> Self {
        Self::new(Box::pin(futures::stream::unfold(
            cursor,
            PageCursor::next_document,
        )))
    }
}

impl Stream for SearchResultStream {
    type Item = Result<SearchDocument>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.as_mut().poll_next(cx)
    }
}
