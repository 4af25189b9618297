//! Query classification: derives a [`RagConfig`] from the query text and the
//! selected model.
//!
//! Rules are evaluated in table order and the first match wins. A query that
//! matches nothing gets [`RagConfig::default`].

use regex::Regex;
use std::sync::LazyLock;

use crate::models::RagConfig;

static RE_GREETING: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(hi|hello|hey|greetings|good\s+(morning|afternoon|evening)|how\s+are\s+you)\b")
        .ok()
});

static RE_FACTUAL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(what\s+is|who\s+is|when\s+did|where\s+is|why\s+is|how\s+does)\b").ok()
});

static RE_INSTRUCTION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(write|generate|create|build|implement|code|develop)\b").ok()
});

/// A single entry of the classification table.
pub struct ClassificationRule {
    pub name: &'static str,
    matches: fn(&str, &str) -> bool,
    apply: fn(&mut RagConfig),
}

impl ClassificationRule {
    pub fn matches(&self, query: &str, selected_model: &str) -> bool {
        (self.matches)(query, selected_model)
    }
}

fn is_match(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|r| r.is_match(text))
}

pub fn is_greeting(query: &str) -> bool {
    is_match(&RE_GREETING, query)
}

pub fn is_factual_question(query: &str) -> bool {
    is_match(&RE_FACTUAL, query)
}

pub fn is_instruction(query: &str) -> bool {
    is_match(&RE_INSTRUCTION, query)
}

pub fn is_reasoning_model(selected_model: &str) -> bool {
    selected_model.to_lowercase().contains("reasoning")
}

pub static RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "greeting",
        matches: |q, _| is_greeting(q),
        apply: |c| c.enabled = false,
    },
    ClassificationRule {
        name: "factual",
        matches: |q, _| is_factual_question(q),
        apply: |c| c.top_k = 5,
    },
    ClassificationRule {
        name: "instruction",
        matches: |q, _| is_instruction(q),
        apply: |c| {
            c.top_k = 4;
            c.format_options.max_chars_per_doc = Some(2000);
        },
    },
    ClassificationRule {
        name: "reasoning_model",
        matches: |_, m| is_reasoning_model(m),
        apply: |c| {
            c.include_metadata = true;
            c.format_options.hide_source = Some(false);
        },
    },
];

/// Classify `query` and return the retrieval configuration for it.
pub fn get_rag_config(query: &str, selected_model: &str) -> RagConfig {
    let mut config = RagConfig::default();

    match RULES.iter().find(|r| r.matches(query, selected_model)) {
        Some(rule) => {
            tracing::debug!("Query classified as {}", rule.name);
            (rule.apply)(&mut config);
        }
        None => tracing::debug!("Query classified as default"),
    }

    config
}
