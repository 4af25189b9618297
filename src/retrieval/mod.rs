//! Retrieval client: original + expansion query, merged and deduplicated.

pub mod backend;
pub mod fallback;

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::RetrievalConfig;
use crate::models::{DocumentMetadata, QueryOrigin, RetrievalOptions, RetrievalResult};

pub use backend::{build_backend, BackendQuery, RetrievalBackend};

/// Expansion results are trusted less than results for the query as typed.
const EXPANSION_SCORE_FACTOR: f32 = 0.8;

/// Characters of normalized content compared when deduplicating.
const DEDUP_PREFIX_CHARS: usize = 100;

static RE_QUESTION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(\?\s*$|^\s*(what|who|when|where|why|how|which|is|are|can|does|do)\b)").ok()
});

fn is_question_like(query: &str) -> bool {
    RE_QUESTION.as_ref().is_some_and(|r| r.is_match(query))
}

/// Derive the secondary query used to widen coverage.
pub fn expansion_query(query: &str) -> String {
    let query = query.trim();
    if is_question_like(query) {
        format!("background information {query}")
    } else {
        format!("what is {query}")
    }
}

/// ceil(top_k * 0.7)
fn main_request_size(top_k: usize) -> usize {
    (top_k * 7).div_ceil(10)
}

/// ceil(top_k * 0.5)
fn expansion_request_size(top_k: usize) -> usize {
    top_k.div_ceil(2)
}

fn dedup_key(content: &str) -> String {
    content
        .trim()
        .to_lowercase()
        .chars()
        .take(DEDUP_PREFIX_CHARS)
        .collect()
}

/// Drop results whose normalized content prefix was already seen.
/// The first occurrence wins and order is preserved.
pub fn dedupe_results(results: Vec<RetrievalResult>) -> Vec<RetrievalResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(dedup_key(&r.content)))
        .collect()
}

fn tag_origin(results: &mut [RetrievalResult], origin: QueryOrigin) {
    for result in results.iter_mut() {
        result
            .metadata
            .get_or_insert_with(|| DocumentMetadata {
                source: String::new(),
                date: String::new(),
                origin: None,
            })
            .origin = Some(origin);

        if origin == QueryOrigin::Expansion {
            result.score = result.score.map(|s| s * EXPANSION_SCORE_FACTOR);
        }
    }
}

/// Retrieval client over an optional backend. Without a backend every query
/// is answered from the fallback dataset.
#[derive(Clone, Default)]
pub struct Retriever {
    backend: Option<Arc<dyn RetrievalBackend>>,
}

impl Retriever {
    pub fn new(backend: Option<Arc<dyn RetrievalBackend>>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(build_backend(config))
    }

    /// A retriever that never leaves the process.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("fallback", |b| b.name())
    }

    /// Retrieve at most `options.top_k` documents for `options.query`.
    /// Never fails: backend errors are replaced by fallback data.
    pub async fn retrieve_context(&self, options: &RetrievalOptions) -> Vec<RetrievalResult> {
        if options.top_k == 0 {
            return Vec::new();
        }

        let expanded = expansion_query(&options.query);
        let main_request = BackendQuery {
            query: options.query.clone(),
            top_k: main_request_size(options.top_k),
            filter: options.filter.clone(),
            include_metadata: options.include_metadata,
        };
        let expansion_request = BackendQuery {
            query: expanded,
            top_k: expansion_request_size(options.top_k),
            ..main_request.clone()
        };

        let (mut main, mut expansion) = tokio::join!(
            self.query_or_fallback(&main_request),
            self.query_or_fallback(&expansion_request),
        );

        tag_origin(&mut main, QueryOrigin::Main);
        tag_origin(&mut expansion, QueryOrigin::Expansion);

        let (main_count, expansion_count) = (main.len(), expansion.len());
        main.append(&mut expansion);

        let mut results = dedupe_results(main);
        results.truncate(options.top_k);

        tracing::info!(
            "Retrieved {} documents via {} ({main_count} main, {expansion_count} expansion)",
            results.len(),
            self.backend_name(),
        );
        results
    }

    async fn query_or_fallback(&self, query: &BackendQuery) -> Vec<RetrievalResult> {
        let Some(backend) = &self.backend else {
            return fallback::fallback_results(&query.query, query.top_k);
        };

        match backend.retrieve(query).await {
            Ok(mut results) => {
                results.truncate(query.top_k);
                results
            }
            Err(e) => {
                tracing::warn!(
                    "Retrieval via {} failed for '{}', using fallback data: {e:#}",
                    backend.name(),
                    query.query
                );
                fallback::fallback_results(&query.query, query.top_k)
            }
        }
    }
}
