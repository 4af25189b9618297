//! Adapters for the hosted retrieval service.
//!
//! The service has shipped two request/response shapes over time. Each shape
//! gets its own [`RetrievalBackend`] implementation; the one in use is chosen
//! by [`RetrievalConfig::api`] rather than by probing the service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{RetrievalApi, RetrievalConfig};
use crate::models::{DocumentMetadata, RetrievalFilter, RetrievalResult};

/// A single query as sent to a backend.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendQuery {
    pub query: String,
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<RetrievalFilter>,
    pub include_metadata: bool,
}

/// Capability interface over a retrieval service.
#[async_trait]
pub trait RetrievalBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn retrieve(&self, query: &BackendQuery) -> Result<Vec<RetrievalResult>>;
}

/// Build the backend selected by `config`, or `None` when it is not usable.
pub fn build_backend(config: &RetrievalConfig) -> Option<Arc<dyn RetrievalBackend>> {
    let Some(base_url) = config.base_url.as_deref() else {
        tracing::warn!("RAG_RETRIEVAL_BASE_URL not set; using fallback dataset");
        return None;
    };
    let Some(api_key) = config.api_key.as_deref() else {
        tracing::warn!("RAG_RETRIEVAL_API_KEY not set; using fallback dataset");
        return None;
    };

    let http = match HttpRetrieval::new(base_url, api_key, config.timeout_secs) {
        Ok(http) => http,
        Err(e) => {
            tracing::warn!("Retrieval client initialization failed: {e:#}");
            return None;
        }
    };

    let backend: Arc<dyn RetrievalBackend> = match config.api {
        RetrievalApi::Retrieve => Arc::new(RetrieveApi { http }),
        RetrievalApi::Search => Arc::new(SearchApi { http }),
    };
    tracing::info!("Retrieval backend: {} ({base_url})", backend.name());
    Some(backend)
}

// ─── Shared HTTP plumbing ────────────────────────────────

#[derive(Clone)]
struct HttpRetrieval {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRetrieval {
    fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs.clamp(1, 60)))
            .build()
            .context("Failed to build retrieval HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &BackendQuery,
    ) -> Result<T> {
        let url = format!("{}{endpoint}", self.base_url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(query)
            .send()
            .await
            .with_context(|| format!("Failed to reach retrieval service at {url}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Retrieval service returned {status}: {body}");
        }

        resp.json()
            .await
            .context("Failed to parse retrieval service response")
    }
}

/// Document as returned by either API shape. Older deployments name the
/// text field `text`.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(alias = "text")]
    content: String,
    #[serde(default)]
    metadata: Option<DocumentMetadata>,
    #[serde(default)]
    score: Option<f32>,
}

/// Convert each returned document on its own so one malformed entry does
/// not cost the rest of the response.
fn parse_documents(raw: Vec<serde_json::Value>) -> Vec<RetrievalResult> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<RawDocument>(value) {
            Ok(doc) => Some(doc.into()),
            Err(e) => {
                tracing::debug!("Skipping malformed document #{i}: {e}");
                None
            }
        })
        .collect()
}

impl From<RawDocument> for RetrievalResult {
    fn from(doc: RawDocument) -> Self {
        Self {
            content: doc.content,
            metadata: doc.metadata,
            score: doc.score.map(|s| s.clamp(0.0, 1.0)),
        }
    }
}

// ─── /v1/retrieve ────────────────────────────────────────

pub struct RetrieveApi {
    http: HttpRetrieval,
}

#[derive(Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[async_trait]
impl RetrievalBackend for RetrieveApi {
    fn name(&self) -> &'static str {
        "retrieve"
    }

    async fn retrieve(&self, query: &BackendQuery) -> Result<Vec<RetrievalResult>> {
        let body: RetrieveResponse = self.http.post("/v1/retrieve", query).await?;
        Ok(parse_documents(body.results))
    }
}

// ─── /v1/search ──────────────────────────────────────────

pub struct SearchApi {
    http: HttpRetrieval,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<serde_json::Value>,
}

#[async_trait]
impl RetrievalBackend for SearchApi {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn retrieve(&self, query: &BackendQuery) -> Result<Vec<RetrievalResult>> {
        let body: SearchResponse = self.http.post("/v1/search", query).await?;
        Ok(parse_documents(body.hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_document_accepts_content_field() {
        let doc: RawDocument = serde_json::from_str(
            r#"{"content":"hello","metadata":{"source":"Docs","date":"2024-01-01"},"score":0.5}"#,
        )
        .unwrap();
        let result: RetrievalResult = doc.into();
        assert_eq!(result.content, "hello");
        assert_eq!(result.source(), Some("Docs"));
        assert_eq!(result.score, Some(0.5));
    }

    #[test]
    fn test_raw_document_accepts_text_field() {
        let doc: RawDocument = serde_json::from_str(r#"{"text":"legacy"}"#).unwrap();
        let result: RetrievalResult = doc.into();
        assert_eq!(result.content, "legacy");
        assert!(result.metadata.is_none());
        assert!(result.score.is_none());
    }

    #[test]
    fn test_scores_are_clamped() {
        let doc: RawDocument = serde_json::from_str(r#"{"content":"x","score":1.7}"#).unwrap();
        assert_eq!(RetrievalResult::from(doc).score, Some(1.0));
        let doc: RawDocument = serde_json::from_str(r#"{"content":"x","score":-0.2}"#).unwrap();
        assert_eq!(RetrievalResult::from(doc).score, Some(0.0));
    }

    #[test]
    fn test_malformed_documents_are_skipped() {
        let raw = vec![
            serde_json::json!({"content": "kept", "metadata": {"source": "Docs", "date": 20240501}}),
            serde_json::json!({"score": 0.9}),
            serde_json::json!("not an object"),
            serde_json::json!({"text": "also kept", "metadata": {"source": null}}),
        ];
        let results = parse_documents(raw);
        let contents: Vec<&str> = results.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["kept", "also kept"]);
        assert_eq!(results[0].metadata.as_ref().unwrap().date, "20240501");
        assert_eq!(results[1].source(), None);
    }

    #[test]
    fn test_backend_query_wire_shape() {
        let query = BackendQuery {
            query: "rag".into(),
            top_k: 3,
            filter: None,
            include_metadata: true,
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({"query": "rag", "topK": 3, "includeMetadata": true}));
    }

    #[test]
    fn test_build_backend_requires_key_and_url() {
        let mut config = RetrievalConfig::default();
        assert!(build_backend(&config).is_none());

        config.base_url = Some("http://localhost:1".into());
        assert!(build_backend(&config).is_none());

        config.api_key = Some("secret".into());
        let backend = build_backend(&config).unwrap();
        assert_eq!(backend.name(), "retrieve");

        config.api = RetrievalApi::Search;
        assert_eq!(build_backend(&config).unwrap().name(), "search");
    }
}
