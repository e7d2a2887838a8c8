//! Heuristic filler-text sample generator.
//!
//! Token counts are estimated at four characters per token, the usual rule
//! of thumb for English text with BPE tokenizers. The estimate is what gets
//! reported as the sample's size; the endpoint's own count may differ and
//! is preferred whenever the provider reports usage.

use ctxprobe_application::{GeneratorError, Sample, SampleGenerator};

pub const CHARS_PER_TOKEN: u64 = 4;

/// Upper bound on a single sample (about 40 MB of text).
const MAX_SAMPLE_TOKENS: u64 = 10_000_000;

const PREAMBLE: &str = "Ignore the filler text below and reply with the single word OK.\n\n";

const FILLER: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "a", "lazy", "dog", "while", "seven",
    "amber", "lanterns", "drift", "across", "quiet", "harbor", "water", "under", "pale", "stars",
];

/// Estimated tokens in `text` (rounded up).
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(CHARS_PER_TOKEN)
}

/// Builds ASCII filler of exactly `target * 4` characters, preamble included.
#[derive(Debug, Clone, Default)]
pub struct FillerSampleGenerator;

impl FillerSampleGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SampleGenerator for FillerSampleGenerator {
    fn generate(&self, target_tokens: u64) -> Result<Sample, GeneratorError> {
        if target_tokens == 0 || target_tokens > MAX_SAMPLE_TOKENS {
            return Err(GeneratorError::UnsupportedSize(target_tokens));
        }
        let want = (target_tokens * CHARS_PER_TOKEN) as usize;

        let mut text = String::with_capacity(want + 16);
        if PREAMBLE.len() <= want {
            text.push_str(PREAMBLE);
        }
        for word in FILLER.iter().cycle() {
            if text.len() >= want {
                break;
            }
            text.push_str(word);
            text.push(' ');
        }
        text.truncate(want);

        let actual_token_count = estimate_tokens(&text);
        Ok(Sample {
            text,
            actual_token_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_matches_target_estimate() {
        let generator = FillerSampleGenerator::new();
        for target in [1, 3, 16, 1000, 4096, 128_000] {
            let sample = generator.generate(target).unwrap();
            assert_eq!(sample.actual_token_count, target);
            assert_eq!(sample.text.len() as u64, target * CHARS_PER_TOKEN);
        }
    }

    #[test]
    fn test_large_samples_carry_the_instruction() {
        let sample = FillerSampleGenerator::new().generate(500).unwrap();
        assert!(sample.text.starts_with(PREAMBLE));
    }

    #[test]
    fn test_out_of_range_sizes_are_rejected() {
        let generator = FillerSampleGenerator::new();
        assert_eq!(generator.generate(0), Err(GeneratorError::UnsupportedSize(0)));
        assert!(generator.generate(MAX_SAMPLE_TOKENS + 1).is_err());
    }

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
