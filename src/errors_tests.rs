//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::SearchRagError;

    // ====== Error Type Tests ======

    #[test]
    fn test_config_error() {
        let error = SearchRagError::ConfigError("Unknown encoding".to_string());
        assert!(matches!(error, SearchRagError::ConfigError(_)));
        let display = format!("{}", error);
        assert_eq!(display, "Configuration error: Unknown encoding");
    }

    #[test]
    fn test_remote_call_errors_display() {
        let errors = vec![
            SearchRagError::HttpError("connection refused".to_string()),
            SearchRagError::EmbeddingError("401".to_string()),
            SearchRagError::SearchError("index not found".to_string()),
            SearchRagError::LlmError("quota exceeded".to_string()),
            SearchRagError::TokenizerError("bad encoding".to_string()),
        ];

        for error in errors {
            let display = format!("{}", error);
            assert!(display.contains("error:"), "{display}");
        }
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: SearchRagError = io_err.into();

        match err {
            SearchRagError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_from_serde_json() {
        let parse_result: Result<serde_json::Value, _> = serde_json::from_str("{invalid json}");

        if let Err(json_err) = parse_result {
            let err: SearchRagError = json_err.into();
            assert!(matches!(err, SearchRagError::Serialization(_)));
        }
    }

    #[test]
    fn test_error_from_toml() {
        let parse_result: Result<toml::Value, _> = toml::from_str("key = ");

        if let Err(toml_err) = parse_result {
            let err: SearchRagError = toml_err.into();
            assert!(matches!(err, SearchRagError::TomlParsing(_)));
            assert!(format!("{err}").starts_with("TOML parsing error"));
        }
    }

    // ====== Result Type Tests ======

    #[test]
    fn test_result_and_then() {
        let result: crate::Result<usize> = Ok(42);
        let chained = result.and_then(|v| {
            if v > 40 {
                Ok(v + 10)
            } else {
                Err(SearchRagError::ConfigError("Too small".to_string()))
            }
        });
        assert_eq!(chained.unwrap(), 52);
    }
}
