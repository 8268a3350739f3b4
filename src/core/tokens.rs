//! Approximate token counting for before/after cost comparison

use std::fmt;
use tiktoken_rs::CoreBPE;
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};

/// Vocabulary used when the model has no published tokenizer
pub const FALLBACK_VOCABULARY: &str = "cl100k_base";

/// Subword token estimator backed by a fixed BPE vocabulary
pub struct TokenEstimator {
    bpe: CoreBPE,
    vocabulary: String,
}

impl TokenEstimator {
    /// Use the model's own vocabulary when tiktoken knows it, else cl100k_base
    pub fn for_model(model: &str) -> Result<Self> {
        match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => {
                info!("Token estimator using vocabulary of {}", model);
                Ok(Self {
                    bpe,
                    vocabulary: model.to_string(),
                })
            }
            Err(_) => {
                info!(
                    "No tokenizer for {}, falling back to {}",
                    model, FALLBACK_VOCABULARY
                );
                Self::fallback()
            }
        }
    }

    /// The general-purpose vocabulary
    pub fn fallback() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| TranslationError::ConfigError {
            message: format!("failed to load {}: {}", FALLBACK_VOCABULARY, e),
        })?;
        Ok(Self {
            bpe,
            vocabulary: FALLBACK_VOCABULARY.to_string(),
        })
    }

    /// Name of the loaded vocabulary
    pub fn vocabulary(&self) -> &str {
        &self.vocabulary
    }

    /// Count tokens in `text`
    ///
    /// Grows with repeated words, but a longer run of one character can
    /// encode to fewer tokens when the vocabulary holds a merged piece for it.
    pub fn estimate(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let count = self.bpe.encode_with_special_tokens(text).len();
        debug!("Estimated {} tokens for {} bytes", count, text.len());
        count
    }
}

impl fmt::Debug for TokenEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenEstimator")
            .field("vocabulary", &self.vocabulary)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_falls_back() {
        let estimator = TokenEstimator::for_model("gemini-2.5-flash").unwrap();
        assert_eq!(estimator.vocabulary(), FALLBACK_VOCABULARY);
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        let estimator = TokenEstimator::fallback().unwrap();
        assert_eq!(estimator.estimate(""), 0);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let estimator = TokenEstimator::fallback().unwrap();
        let text = "Acme Corp develops software.";
        assert!(estimator.estimate(text) > 0);
        assert_eq!(estimator.estimate(text), estimator.estimate(text));
    }

    #[test]
    fn test_estimate_grows_with_repeated_words() {
        let estimator = TokenEstimator::fallback().unwrap();
        let mut previous = 0;
        for n in 0..50 {
            let count = estimator.estimate(&" translate".repeat(n));
            assert!(count >= previous, "count dropped at {} repetitions", n);
            previous = count;
        }
    }

    #[test]
    fn test_single_character_runs_can_merge() {
        // cl100k_base has a token for eight `a`s, so the run shrinks to one token
        let estimator = TokenEstimator::fallback().unwrap();
        let seven = estimator.estimate(&"a".repeat(7));
        let eight = estimator.estimate(&"a".repeat(8));
        assert!(eight < seven, "seven a's -> {}, eight -> {}", seven, eight);
    }

    #[test]
    fn test_removing_phrase_lowers_estimate() {
        let estimator = TokenEstimator::fallback().unwrap();
        let full = estimator.estimate("Acme Corp develops software.");
        let reduced = estimator.estimate(" develops software.");
        assert!(reduced < full);
    }
}
