//! Unicode normalization shared by extraction and translation

use unicode_normalization::UnicodeNormalization;

/// NFKC-normalize text. Idempotent.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect()
}
