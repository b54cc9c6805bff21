//! Hybrid retrieval against Azure AI Search
//!
//! One query combines keyword search, vector similarity and the semantic
//! ranker. Results come back as a [`SearchResultStream`] of raw documents;
//! normalization into [`crate::rag::SearchResult`] happens in the budgeter.

pub mod client;
pub mod types;

pub use client::SearchClient;
pub use client::SearchResultStream;
pub use types::DocumentFields;
pub use types::SearchDocument;
