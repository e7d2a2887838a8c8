//! Outcome classifier: maps a raw call result to a [`Classification`].
//!
//! Classification is driven by a data table of vendor phrasings so a new
//! provider's wording can be added without touching search logic. Rules
//! are evaluated in order and the first match wins:
//!
//! 1. token-limit vocabulary → [`Classification::TokenLimitExceeded`]
//! 2. auth vocabulary → [`Classification::AuthError`]
//! 3. network / timeout vocabulary → [`Classification::Transient`]
//! 4. rate-limit vocabulary → [`Classification::RateLimited`]
//! 5. HTTP status hint (401/403, 429, 408/5xx, 413)
//! 6. anything else → [`Classification::Unknown`]
//!
//! Textual rules run before status hints because several vendors report
//! context overflows as a plain `400`.

use super::call::{CallError, RawCallResult};
use super::classification::Classification;
use crate::core::string::{MAX_ERROR_DETAIL_BYTES, condense_detail};

/// One ordered entry in the [`PatternTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub classification: Classification,
    /// Lowercase substrings; any match selects `classification`
    patterns: Vec<String>,
}

impl ClassificationRule {
    pub fn new<I, S>(classification: Classification, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            classification,
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    fn matches(&self, lowered: &str) -> bool {
        self.patterns.iter().any(|p| lowered.contains(p.as_str()))
    }
}

/// Ordered vocabulary used to interpret vendor error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTable {
    rules: Vec<ClassificationRule>,
}

impl PatternTable {
    /// A table with no rules; every error classifies by status or as `Unknown`.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule after the existing ones.
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add phrasings to the first rule for `classification`, creating the
    /// rule at the end of the table if none exists yet.
    pub fn extend_patterns<I, S>(&mut self, classification: Classification, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra = ClassificationRule::new(classification, patterns);
        if extra.patterns.is_empty() {
            return;
        }
        match self
            .rules
            .iter_mut()
            .find(|r| r.classification == classification)
        {
            Some(rule) => {
                for p in extra.patterns {
                    if !rule.patterns.contains(&p) {
                        rule.patterns.push(p);
                    }
                }
            }
            None => self.rules.push(extra),
        }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// First rule whose vocabulary matches the message.
    fn match_message(&self, message: &str) -> Option<Classification> {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.classification)
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::empty()
            .with_rule(ClassificationRule::new(
                Classification::TokenLimitExceeded,
                [
                    "context_length_exceeded",
                    "maximum context length",
                    "context length",
                    "context window",
                    "too many tokens",
                    "prompt is too long",
                    "input is too long",
                    "input too long",
                    "reduce the length",
                    "exceeds the maximum number of tokens",
                    "token limit",
                    "string_above_max_length",
                ],
            ))
            .with_rule(ClassificationRule::new(
                Classification::AuthError,
                [
                    "unauthorized",
                    "forbidden",
                    "invalid api key",
                    "invalid_api_key",
                    "incorrect api key",
                    "invalid x-api-key",
                    "authentication",
                    "permission denied",
                ],
            ))
            .with_rule(ClassificationRule::new(
                Classification::Transient,
                [
                    "timed out",
                    "timeout",
                    "connection reset",
                    "connection refused",
                    "connection closed",
                    "broken pipe",
                    "network",
                    "dns",
                    "bad gateway",
                    "service unavailable",
                    "gateway timeout",
                    "overloaded",
                    "internal server error",
                ],
            ))
            .with_rule(ClassificationRule::new(
                Classification::RateLimited,
                [
                    "rate limit",
                    "rate_limit",
                    "ratelimit",
                    "too many requests",
                    "quota exceeded",
                    "resource_exhausted",
                    "throttl",
                ],
            ))
    }
}

/// Token counts to fall back on when the response omits usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenCounts {
    pub input: u64,
    pub output: u64,
}

/// Classification plus the bookkeeping the executor records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub classification: Classification,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub error_detail: Option<String>,
}

/// Pure, deterministic classifier over a [`PatternTable`].
#[derive(Debug, Clone, Default)]
pub struct OutcomeClassifier {
    table: PatternTable,
}

impl OutcomeClassifier {
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Classify a raw call result.
    pub fn classify(&self, raw: &RawCallResult) -> Classification {
        match raw {
            Ok(_) => Classification::Success,
            Err(err) => self.classify_error(err),
        }
    }

    /// Classify and extract the token counts to record.
    ///
    /// On success the provider-reported usage wins; `fallback` (the
    /// generator's measured input and the requested output) fills gaps.
    /// On error the request was not answered, so output is zero and the
    /// measured input is recorded.
    pub fn interpret(&self, raw: &RawCallResult, fallback: TokenCounts) -> Interpretation {
        match raw {
            Ok(response) => Interpretation {
                classification: Classification::Success,
                input_tokens: response.input_tokens.unwrap_or(fallback.input),
                output_tokens: response.output_tokens.unwrap_or(fallback.output),
                error_detail: None,
            },
            Err(err) => Interpretation {
                classification: self.classify_error(err),
                input_tokens: fallback.input,
                output_tokens: 0,
                error_detail: Some(condense_detail(&err.to_string(), MAX_ERROR_DETAIL_BYTES)),
            },
        }
    }

    fn classify_error(&self, err: &CallError) -> Classification {
        self.table
            .match_message(&err.message)
            .or_else(|| err.status.and_then(status_hint))
            .unwrap_or(Classification::Unknown)
    }
}

fn status_hint(status: u16) -> Option<Classification> {
    match status {
        401 | 403 => Some(Classification::AuthError),
        413 => Some(Classification::TokenLimitExceeded),
        429 => Some(Classification::RateLimited),
        408 | 500..=599 => Some(Classification::Transient),
        _ => None,
    }
}
