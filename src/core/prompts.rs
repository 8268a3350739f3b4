//! Prompt templates sent to the text-generation model

use crate::core::models::Language;

/// Marker line placed before and after the interpolated source text
pub const DELIMITER: &str = "---";

/// Ask the model for the phrases that must stay untranslated
pub fn exclusion_prompt(text: &str, source: Language) -> String {
    format!(
        "\nFrom the following {source} text, extract phrases that should NOT be translated.\n\
         These include company names, product names, library names, Katakana loanwords (for Japanese), and proper nouns.\n\
         Return ONLY a valid Python list of strings. No explanation or extra formatting.\n\
         \n\
         Text:\n\
         {DELIMITER}\n\
         {text}\n\
         {DELIMITER}\n\
         \n\
         List:\n"
    )
}

/// Plain translation with no preservation instructions
pub fn direct_translation_prompt(text: &str, source: Language, target: Language) -> String {
    format!(
        "\nTranslate the following {source} text to {target}.\n\
         \n\
         Text:\n\
         {DELIMITER}\n\
         {text}\n\
         {DELIMITER}\n\
         \n\
         Translated text:\n"
    )
}

/// Translation that keeps names and loanwords verbatim
pub fn exclusion_translation_prompt(text: &str, source: Language, target: Language) -> String {
    format!(
        "\nTranslate the following {source} text to {target}.\n\
         Do NOT translate company names, product names, library names, Katakana loanwords (for Japanese), or proper nouns.\n\
         Preserve them as-is in the translation.\n\
         \n\
         Text:\n\
         {DELIMITER}\n\
         {text}\n\
         {DELIMITER}\n\
         \n\
         Translated text:\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_sits_between_delimiters() {
        let prompt = direct_translation_prompt("Hello world", Language::English, Language::Japanese);
        assert!(prompt.contains("Translate the following English text to Japanese."));
        assert!(prompt.contains("---\nHello world\n---"));
        assert!(!prompt.contains("Do NOT translate"));
    }

    #[test]
    fn test_exclusion_translation_asks_to_preserve() {
        let prompt = exclusion_translation_prompt("こんにちは", Language::Japanese, Language::English);
        assert!(prompt.contains("Translate the following Japanese text to English."));
        assert!(prompt.contains("Preserve them as-is"));
        assert!(prompt.contains("---\nこんにちは\n---"));
    }

    #[test]
    fn test_exclusion_prompt_requests_list_only() {
        let prompt = exclusion_prompt("Acme Corp develops software.", Language::English);
        assert!(prompt.contains("From the following English text"));
        assert!(prompt.contains("Return ONLY a valid Python list of strings. No explanation"));
        assert!(prompt.contains("Acme Corp develops software."));
    }

    #[test]
    fn test_exclusion_prompt_carries_no_sample_names() {
        let prompt = exclusion_prompt("Ferris writes code.", Language::English);
        assert!(!prompt.contains("Acme"));
        assert!(!prompt.contains("Rust"));
        assert_eq!(prompt.matches('[').count(), 0);
    }
}
