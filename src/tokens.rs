//! Token counting for prompt budgeting

use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use crate::errors::Result;
use crate::errors::SearchRagError;

/// Measures text length in tokens.
///
/// Every measurement in one budgeting run must go through the same counter so
/// the query and prompt counts are comparable.
pub trait TokenCount {
    fn count(&self, text: &str) -> usize;
}

/// Token counter backed by a tiktoken BPE encoding
#[derive(Clone)]
pub struct TiktokenCounter {
    encoding: String,
    bpe: Arc<CoreBPE>,
}

impl TiktokenCounter {
    /// Load the named encoding (`o200k_base`, `cl100k_base`, `p50k_base`, `r50k_base`)
    pub fn new(encoding: &str) -> Result<Self> {
        let bpe = match encoding {
            "o200k_base" => tiktoken_rs::o200k_base(),
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(SearchRagError::ConfigError(format!(
                    "Unsupported token encoding: {other}"
                )))
            }
        }
        .map_err(|e| SearchRagError::TokenizerError(format!("Failed to load {encoding}: {e}")))?;

        Ok(Self {
            encoding: encoding.to_string(),
            bpe: Arc::new(bpe),
        })
    }

    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }
}

impl TokenCount for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_encoding_rejected() {
        let err = TiktokenCounter::new("gpt2-ish").err().unwrap();
        assert!(matches!(err, SearchRagError::ConfigError(_)));
    }

    #[test]
    fn test_o200k_counts() {
        let counter = TiktokenCounter::new("o200k_base").unwrap();
        assert_eq!(counter.encoding(), "o200k_base");
        assert_eq!(counter.count(""), 0);
        assert!(counter.count("hello world") >= 2);
        // Japanese text still tokenizes to a positive count
        assert!(counter.count("社内規程について教えてください") > 0);
    }

    #[test]
    fn test_count_is_deterministic() {
        let counter = TiktokenCounter::new("o200k_base").unwrap();
        let text = "[{'filepath': 'a.pdf', 'caption': 'None', 'reranker_score': 0.0}]";
        assert_eq!(counter.count(text), counter.count(text));
    }
}
