//! Static documents served when the retrieval service is unavailable.
//!
//! Development aid only. The keyword switch below is the whole selection
//! logic; it is not a relevance model.

use crate::models::{DocumentMetadata, RetrievalResult};

struct FallbackDoc {
    content: &'static str,
    source: &'static str,
    date: &'static str,
    score: f32,
}

const WEATHER_DOCS: &[FallbackDoc] = &[
    FallbackDoc {
        content: "Weather forecasts combine numerical prediction models with live observations \
                  from ground stations, satellites and radar. Short-range forecasts (up to 48 hours) \
                  are considerably more reliable than week-ahead outlooks.",
        source: "Weather Forecasting Primer",
        date: "2024-03-12",
        score: 0.92,
    },
    FallbackDoc {
        content: "Current conditions reported by a weather station usually include temperature, \
                  relative humidity, wind speed and direction, pressure and precipitation over the \
                  last hour. Readings are refreshed every 10 to 60 minutes.",
        source: "Weather Station Handbook",
        date: "2023-11-02",
        score: 0.85,
    },
];

const ARTIFACT_DOCS: &[FallbackDoc] = &[
    FallbackDoc {
        content: "Artifacts are standalone documents such as code, prose or spreadsheets that are \
                  created next to the conversation. They can be opened, edited and versioned \
                  independently of the chat transcript.",
        source: "Artifacts Guide",
        date: "2024-05-20",
        score: 0.9,
    },
    FallbackDoc {
        content: "When a document is updated, the previous revision is kept so that changes can be \
                  compared or reverted. Suggestions are attached to specific text ranges of the \
                  current revision.",
        source: "Document Versioning Reference",
        date: "2024-06-01",
        score: 0.82,
    },
];

const RAG_DOCS: &[FallbackDoc] = &[
    FallbackDoc {
        content: "Retrieval-augmented generation (RAG) supplies a language model with passages \
                  retrieved from an external corpus at query time, so answers can draw on \
                  information that is newer or more specific than the model's training data.",
        source: "Introduction to RAG",
        date: "2024-01-15",
        score: 0.95,
    },
    FallbackDoc {
        content: "A typical RAG pipeline splits documents into chunks, embeds each chunk, stores the \
                  vectors in an index and, for every query, retrieves the nearest chunks before \
                  prompting the model.",
        source: "RAG Pipeline Architecture",
        date: "2024-02-08",
        score: 0.9,
    },
    FallbackDoc {
        content: "Reranking retrieved passages before they are added to the prompt keeps the most \
                  relevant evidence near the top, which matters when the context window is small.",
        source: "Reranking in RAG Systems",
        date: "2024-04-22",
        score: 0.84,
    },
    FallbackDoc {
        content: "Grounding answers in retrieved context reduces hallucination. Cite the source of \
                  each claim and say so explicitly when the retrieved material does not cover the \
                  question.",
        source: "RAG Best Practices",
        date: "2024-07-30",
        score: 0.8,
    },
];

fn select_docs(query: &str) -> &'static [FallbackDoc] {
    let lower = query.to_lowercase();
    if lower.contains("weather") {
        WEATHER_DOCS
    } else if lower.contains("document") || lower.contains("artifact") {
        ARTIFACT_DOCS
    } else {
        RAG_DOCS
    }
}

/// Up to `count` fallback documents for `query`.
pub fn fallback_results(query: &str, count: usize) -> Vec<RetrievalResult> {
    select_docs(query)
        .iter()
        .take(count)
        .map(|doc| RetrievalResult {
            content: doc.content.to_string(),
            metadata: Some(DocumentMetadata {
                source: doc.source.to_string(),
                date: doc.date.to_string(),
                origin: None,
            }),
            score: Some(doc.score),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_keyword() {
        let results = fallback_results("Will the WEATHER be nice tomorrow?", 10);
        assert_eq!(results.len(), WEATHER_DOCS.len());
        assert!(results.iter().all(|r| r.source().unwrap().contains("Weather")));
    }

    #[test]
    fn test_document_and_artifact_keywords() {
        let docs = fallback_results("how do I edit a document", 10);
        let artifacts = fallback_results("show my artifacts", 10);
        assert_eq!(docs, artifacts);
        assert_eq!(docs[0].source(), Some("Artifacts Guide"));
    }

    #[test]
    fn test_generic_entries_mention_rag() {
        let results = fallback_results("what is RAG?", 10);
        assert_eq!(results.len(), RAG_DOCS.len());
        for r in &results {
            assert!(r.source().unwrap().to_lowercase().contains("rag"));
        }
    }

    #[test]
    fn test_count_caps_results() {
        assert_eq!(fallback_results("anything", 1).len(), 1);
        assert!(fallback_results("anything", 0).is_empty());
    }
}
