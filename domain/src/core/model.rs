//! Model value object identifying the endpoint under test

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of the model whose context window is being probed (Value Object)
///
/// Model ids are opaque to the probing engine. An optional `provider/`
/// prefix (e.g. `openai/gpt-4.1`) is preserved and exposed through
/// [`Model::provider`] so adapters can route on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Model {
    id: String,
}

impl Model {
    /// Create a model identifier, rejecting empty or whitespace-only ids
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                id: trimmed.to_string(),
            })
        }
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Provider prefix, if the id is of the form `provider/name`
    pub fn provider(&self) -> Option<&str> {
        self.id.split_once('/').map(|(provider, _)| provider)
    }

    /// Model name with any provider prefix removed
    pub fn name(&self) -> &str {
        self.id
            .split_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.id)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl std::str::FromStr for Model {
    type Err = crate::core::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::try_new(s).ok_or_else(|| {
            crate::core::error::DomainError::InvalidModel("model id cannot be empty".to_string())
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
