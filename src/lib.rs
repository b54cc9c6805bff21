pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod search;
pub mod tokens;

#[cfg(test)]
mod errors_tests;

pub use config::AppConfig;
pub use errors::*;
