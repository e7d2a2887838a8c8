//! Endpoint configuration from TOML (`[endpoint]` section)

use ctxprobe_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Raw endpoint configuration from TOML
///
/// # Example
///
/// ```toml
/// [endpoint]
/// base_url = "https://api.openai.com/v1"
/// api_key_env = "OPENAI_API_KEY"     # name of the variable, never the key itself
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEndpointConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for FileEndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl FileEndpointConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let url = self.base_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            vec![]
        } else {
            vec![ConfigIssue::error(
                ConfigIssueCode::InvalidEndpoint,
                format!(
                    "endpoint.base_url: '{}' is not an http(s) URL",
                    self.base_url
                ),
            )]
        }
    }
}
