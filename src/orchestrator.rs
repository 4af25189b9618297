use crate::augment::{create_enhanced_rag_prompt, format_retrieved_context_with, rerank_results};
use crate::classify::get_rag_config;
use crate::config::Config;
use crate::models::{ChatMessage, RequestHints};
use crate::retrieval::Retriever;

pub use crate::config::DEFAULT_CHAT_MODEL;

/// Text of the most recent user message, or `None` when there is no user
/// message or it carries no text.
pub fn last_user_query(history: &[ChatMessage]) -> Option<String> {
    let message = history.iter().rev().find(|m| m.role == "user")?;
    let text = message.text();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Turns a system prompt into a retrieval-augmented one.
#[derive(Clone, Default)]
pub struct RagEnhancer {
    retriever: Retriever,
}

impl RagEnhancer {
    pub fn new(retriever: Retriever) -> Self {
        Self { retriever }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Retriever::from_config(&config.retrieval))
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Return `system_prompt` enriched with context for the latest user
    /// message. Whenever there is nothing to add the original prompt is
    /// returned unchanged.
    pub async fn enhance_prompt_with_rag(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        hints: &RequestHints,
        selected_model: &str,
    ) -> String {
        let Some(query) = last_user_query(history) else {
            tracing::debug!("No user text in history; prompt left unchanged");
            return system_prompt.to_string();
        };
        tracing::debug!(
            city = hints.city.as_deref().unwrap_or("-"),
            country = hints.country.as_deref().unwrap_or("-"),
            "Enhancing prompt for model {selected_model}"
        );

        let config = get_rag_config(&query, selected_model);
        if !config.enabled {
            tracing::debug!("Retrieval disabled for this query");
            return system_prompt.to_string();
        }

        let results = self
            .retriever
            .retrieve_context(&config.retrieval_options(&query))
            .await;
        if results.is_empty() {
            tracing::debug!("No documents retrieved; prompt left unchanged");
            return system_prompt.to_string();
        }

        let ranked = rerank_results(&query, results);
        let context = format_retrieved_context_with(&ranked, &config.format_options);
        if context.is_empty() {
            return system_prompt.to_string();
        }

        tracing::info!("Added {} retrieved documents to the system prompt", ranked.len());
        create_enhanced_rag_prompt(system_prompt, &query, &context)
    }
}
