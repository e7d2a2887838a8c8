//! Sample generator port
//!
//! Produces a payload of approximately the requested token count, and
//! reports what it actually produced.

use thiserror::Error;

/// Errors from payload generation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Cannot generate a sample of {0} tokens")]
    UnsupportedSize(u64),

    #[error("Sample generation failed: {0}")]
    Failed(String),
}

/// A generated payload and its measured size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub text: String,
    /// Token count as measured by the generator's estimator. All probe
    /// bookkeeping uses this, never the requested target.
    pub actual_token_count: u64,
}

pub trait SampleGenerator: Send + Sync {
    fn generate(&self, target_tokens: u64) -> Result<Sample, GeneratorError>;
}
