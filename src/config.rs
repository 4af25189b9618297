use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Model id used when the caller does not name one.
pub const DEFAULT_CHAT_MODEL: &str = "chat-model";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Retrieval backend configuration
    pub retrieval: RetrievalConfig,
    /// Model id assumed when a request carries none
    pub default_model: String,
}

/// Which request/response shape the hosted retrieval service speaks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalApi {
    /// `POST /v1/retrieve`, documents under `results`
    #[default]
    Retrieve,
    /// `POST /v1/search`, documents under `hits`
    Search,
}

impl FromStr for RetrievalApi {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "retrieve" => Ok(Self::Retrieve),
            "search" => Ok(Self::Search),
            other => anyhow::bail!("Unknown retrieval API: {other} (expected retrieve or search)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub api: RetrievalApi,
    /// Base URL of the hosted retrieval service.
    /// If None, every query is answered from the fallback dataset.
    pub base_url: Option<String>,
    /// API key sent as a bearer token
    pub api_key: Option<String>,
    /// Request timeout in seconds, within `1..=60`.
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            api: RetrievalApi::default(),
            base_url: None,
            api_key: None,
            timeout_secs: 15,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            default_model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }
}

/// Bounds applied to `RAG_RETRIEVAL_TIMEOUT_SECS`.
const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 60;

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(api) = lookup("RAG_RETRIEVAL_API") {
            match api.parse() {
                Ok(api) => config.retrieval.api = api,
                Err(e) => tracing::warn!("Ignoring RAG_RETRIEVAL_API: {e}"),
            }
        }
        if let Some(url) = lookup("RAG_RETRIEVAL_BASE_URL") {
            if !url.trim().is_empty() {
                config.retrieval.base_url = Some(url);
            }
        }
        if let Some(key) = lookup("RAG_RETRIEVAL_API_KEY") {
            if !key.trim().is_empty() {
                config.retrieval.api_key = Some(key);
            }
        }
        if let Some(val) = lookup("RAG_RETRIEVAL_TIMEOUT_SECS") {
            if let Ok(v) = val.trim().parse::<u64>() {
                config.retrieval.timeout_secs = v.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
            }
        }
        if let Some(model) = lookup("RAG_DEFAULT_MODEL") {
            if !model.trim().is_empty() {
                config.default_model = model;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_api_parses_known_names() {
        assert_eq!("retrieve".parse::<RetrievalApi>().unwrap(), RetrievalApi::Retrieve);
        assert_eq!(" Search ".parse::<RetrievalApi>().unwrap(), RetrievalApi::Search);
    }

    #[test]
    fn test_retrieval_api_rejects_unknown() {
        assert!("query".parse::<RetrievalApi>().is_err());
    }

    #[test]
    fn test_default_config_has_no_backend() {
        let config = Config::default();
        assert!(config.retrieval.base_url.is_none());
        assert!(config.retrieval.api_key.is_none());
        assert_eq!(config.retrieval.api, RetrievalApi::Retrieve);
        assert_eq!(config.default_model, DEFAULT_CHAT_MODEL);
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_from_lookup_without_vars_matches_default() {
        let config = Config::from_lookup(|_| None);
        assert!(config.retrieval.base_url.is_none());
        assert_eq!(config.retrieval.timeout_secs, 15);
        assert_eq!(config.default_model, DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn test_from_lookup_reads_every_variable() {
        let config = Config::from_lookup(lookup(&[
            ("RAG_RETRIEVAL_API", "search"),
            ("RAG_RETRIEVAL_BASE_URL", "https://retrieval.internal"),
            ("RAG_RETRIEVAL_API_KEY", "secret"),
            ("RAG_RETRIEVAL_TIMEOUT_SECS", "30"),
            ("RAG_DEFAULT_MODEL", "chat-model-reasoning"),
        ]));
        assert_eq!(config.retrieval.api, RetrievalApi::Search);
        assert_eq!(config.retrieval.base_url.as_deref(), Some("https://retrieval.internal"));
        assert_eq!(config.retrieval.api_key.as_deref(), Some("secret"));
        assert_eq!(config.retrieval.timeout_secs, 30);
        assert_eq!(config.default_model, "chat-model-reasoning");
    }

    #[test]
    fn test_unknown_api_keeps_retrieve() {
        let config = Config::from_lookup(lookup(&[("RAG_RETRIEVAL_API", "graphql")]));
        assert_eq!(config.retrieval.api, RetrievalApi::Retrieve);
    }

    #[test]
    fn test_blank_url_and_key_stay_unset() {
        let config = Config::from_lookup(lookup(&[
            ("RAG_RETRIEVAL_BASE_URL", ""),
            ("RAG_RETRIEVAL_API_KEY", "   "),
        ]));
        assert!(config.retrieval.base_url.is_none());
        assert!(config.retrieval.api_key.is_none());
    }

    #[test]
    fn test_timeout_is_clamped() {
        let timeout = |v: &str| {
            Config::from_lookup(lookup(&[("RAG_RETRIEVAL_TIMEOUT_SECS", v)]))
                .retrieval
                .timeout_secs
        };
        assert_eq!(timeout("600"), 60);
        assert_eq!(timeout("0"), 1);
        assert_eq!(timeout("not a number"), 15);
    }
}
