//! Query vectorization
//!
//! The query text is embedded once per invocation with the configured Azure
//! OpenAI embedding deployment (`text-embedding-3-large` by default).
//!
//! # Examples
//!
//! ```rust,no_run
//! use searchrag::config::AppConfig;
//! use searchrag::embeddings::EmbeddingClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load(None)?;
//!     let client = EmbeddingClient::new(&config.openai)?;
//!
//!     let embedding = client.generate("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

pub use client::EmbeddingClient;
