//! Wire types for the Azure AI Search documents API

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::config::SearchConfig;

/// Semantic ranker output field
pub const RERANKER_SCORE_FIELD: &str = "@search.rerankerScore";
/// Semantic caption output field
pub const CAPTIONS_FIELD: &str = "@search.captions";

/// One raw result record as returned by the service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SearchDocument(pub Map<String, Value>);

impl SearchDocument {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// String value of a field; non-string scalars are rendered as text
    #[must_use]
    pub fn get_text(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    #[must_use]
    pub fn reranker_score(&self) -> Option<f64> {
        self.get(RERANKER_SCORE_FIELD).and_then(Value::as_f64)
    }

    /// Text of the first extractive caption, if any
    #[must_use]
    pub fn first_caption(&self) -> Option<String> {
        let caption = self.get(CAPTIONS_FIELD)?.as_array()?.first()?;
        caption.get("text")?.as_str().map(str::to_string)
    }
}

impl From<Value> for SearchDocument {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Names of the index fields that feed a normalized result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFields {
    pub title: String,
    pub content: String,
    pub id: String,
}

impl DocumentFields {
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            title: config.title_field.clone(),
            content: config.content_field.clone(),
            id: config.id_field.clone(),
        }
    }
}

impl Default for DocumentFields {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest<'a> {
    pub search: &'a str,
    pub query_language: &'a str,
    pub vector_queries: Vec<VectorQuery<'a>>,
    pub query_type: &'a str,
    pub semantic_configuration: &'a str,
    pub captions: &'a str,
    pub top: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct VectorQuery<'a> {
    pub kind: &'a str,
    pub vector: &'a [f32],
    pub fields: &'a str,
    pub k: usize,
}

/// One page of results
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    pub value: Vec<SearchDocument>,
    /// Body for the follow-up request when the service paged the results
    #[serde(rename = "@search.nextPageParameters", default)]
    pub next_page_parameters: Option<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_document_accessors() {
        let doc = SearchDocument::from(json!({
            "chunk_id": "abc_0",
            "title": "handbook.pdf",
            "@search.rerankerScore": 2.75,
            "@search.captions": [{"text": "first", "highlights": ""}, {"text": "second"}]
        }));

        assert_eq!(doc.get_text("title").as_deref(), Some("handbook.pdf"));
        assert_eq!(doc.reranker_score(), Some(2.75));
        assert_eq!(doc.first_caption().as_deref(), Some("first"));
        assert!(doc.get("chunk").is_none());
    }

    #[test]
    fn test_null_fields_count_as_missing() {
        let doc = SearchDocument::from(json!({
            "title": null,
            "@search.captions": null,
            "@search.rerankerScore": null
        }));

        assert!(doc.get_text("title").is_none());
        assert!(doc.first_caption().is_none());
        assert!(doc.reranker_score().is_none());
    }

    #[test]
    fn test_empty_captions() {
        let doc = SearchDocument::from(json!({"@search.captions": []}));
        assert!(doc.first_caption().is_none());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let vector = [0.5_f32, -0.25];
        let request = SearchRequest {
            search: "経費精算",
            query_language: "ja-jp",
            vector_queries: vec![VectorQuery {
                kind: "vector",
                vector: &vector,
                fields: "text_vector",
                k: 100,
            }],
            query_type: "semantic",
            semantic_configuration: "cfg",
            captions: "extractive",
            top: 100,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["search"], "経費精算");
        assert_eq!(body["queryLanguage"], "ja-jp");
        assert_eq!(body["queryType"], "semantic");
        assert_eq!(body["semanticConfiguration"], "cfg");
        assert_eq!(body["captions"], "extractive");
        assert_eq!(body["top"], 100);
        assert_eq!(body["vectorQueries"][0]["kind"], "vector");
        assert_eq!(body["vectorQueries"][0]["fields"], "text_vector");
        assert_eq!(body["vectorQueries"][0]["k"], 100);
        assert_eq!(body["vectorQueries"][0]["vector"][1], -0.25);
    }

    #[test]
    fn test_page_parses_next_parameters() {
        let page: SearchPage = serde_json::from_value(json!({
            "value": [{"title": "a"}],
            "@search.nextPageParameters": {"skip": 50, "top": 50}
        }))
        .unwrap();

        assert_eq!(page.value.len(), 1);
        assert_eq!(page.next_page_parameters.unwrap()["skip"], 50);
    }
}
