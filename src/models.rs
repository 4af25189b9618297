use serde::{Deserialize, Deserializer, Serialize};

/// Default number of documents kept per request.
pub const DEFAULT_TOP_K: usize = 3;

/// Per-document character cap applied when no rule overrides it.
pub const DEFAULT_MAX_CHARS_PER_DOC: usize = 1500;

/// Which query produced a retrieved document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryOrigin {
    Main,
    Expansion,
}

/// Provenance attached to a retrieved document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<QueryOrigin>,
}

/// Backends are loose about metadata types: `null` becomes empty and
/// numbers or booleans are kept in their JSON spelling.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// A single document returned by the retrieval client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
    /// Relevance in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl RetrievalResult {
    /// Non-empty source name, if the document carries one.
    pub fn source(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.source.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Restricts which documents the backend may return.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Retrieval request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalOptions {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<RetrievalFilter>,
    #[serde(default = "default_true")]
    pub include_metadata: bool,
}

impl RetrievalOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            filter: None,
            include_metadata: true,
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_true() -> bool {
    true
}

/// How retrieved documents are rendered into the prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    /// Per-document template with `{index}`, `{content}`, `{source}`, `{date}`
    /// and `{score}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars_per_doc: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_source: Option<bool>,
}

/// Per-query retrieval configuration, derived fresh for every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagConfig {
    pub enabled: bool,
    pub top_k: usize,
    pub include_metadata: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<RetrievalFilter>,
    #[serde(default)]
    pub format_options: FormatOptions,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: DEFAULT_TOP_K,
            include_metadata: true,
            filter: None,
            format_options: FormatOptions {
                max_chars_per_doc: Some(DEFAULT_MAX_CHARS_PER_DOC),
                ..Default::default()
            },
        }
    }
}

impl RagConfig {
    pub fn retrieval_options(&self, query: &str) -> RetrievalOptions {
        RetrievalOptions {
            query: query.to_string(),
            top_k: self.top_k,
            filter: self.filter.clone(),
            include_metadata: self.include_metadata,
        }
    }
}

/// One part of a multi-part chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessagePart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
        }
    }
}

/// A single chat turn as sent by the frontend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<MessagePart>>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            parts: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
            parts: None,
        }
    }

    /// Plain text of the message: `content` if set, else the text parts
    /// joined by single spaces.
    pub fn text(&self) -> String {
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            return content.to_string();
        }
        self.parts
            .iter()
            .flatten()
            .filter(|p| p.kind == "text")
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Geolocation hints forwarded by the chat frontend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Input document for the `prompt-rag` binary
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub system_prompt: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub request_hints: RequestHints,
    pub selected_model: Option<String>,
}
