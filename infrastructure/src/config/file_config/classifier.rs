//! Extra error phrasings from TOML (`[classifier]` section)

use ctxprobe_domain::{Classification, OutcomeClassifier, PatternTable};
use serde::{Deserialize, Serialize};

/// Additional case-insensitive substrings per classification.
///
/// Patterns are appended to the built-in vocabulary, never replacing it.
///
/// # Example
///
/// ```toml
/// [classifier]
/// token_limit = ["prompt is too long for this deployment"]
/// transient = ["upstream connect error"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClassifierConfig {
    pub token_limit: Vec<String>,
    pub rate_limited: Vec<String>,
    pub auth_error: Vec<String>,
    pub transient: Vec<String>,
}

impl FileClassifierConfig {
    pub fn is_empty(&self) -> bool {
        self.token_limit.is_empty()
            && self.rate_limited.is_empty()
            && self.auth_error.is_empty()
            && self.transient.is_empty()
    }

    /// Built-in table extended with the configured phrasings.
    pub fn to_classifier(&self) -> OutcomeClassifier {
        let mut table = PatternTable::default();
        table.extend_patterns(Classification::TokenLimitExceeded, &self.token_limit);
        table.extend_patterns(Classification::RateLimited, &self.rate_limited);
        table.extend_patterns(Classification::AuthError, &self.auth_error);
        table.extend_patterns(Classification::Transient, &self.transient);
        OutcomeClassifier::new(table)
    }
}
