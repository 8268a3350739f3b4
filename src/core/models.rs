//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core::errors::{Result, TranslationError};

/// Supported document language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Language {
    English,
    Japanese,
}

impl Language {
    /// Every supported language, in display order
    pub const ALL: [Language; 2] = [Language::English, Language::Japanese];

    /// Label used in prompts and responses
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Japanese => "Japanese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.label() == s)
            .ok_or_else(|| TranslationError::InvalidLanguage {
                value: s.to_string(),
            })
    }
}

/// Validated source/target pair; the two sides always differ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    source: Language,
    target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Result<Self> {
        if source == target {
            return Err(TranslationError::SameLanguage);
        }
        Ok(Self { source, target })
    }

    pub fn source(&self) -> Language {
        self.source
    }

    pub fn target(&self) -> Language {
        self.target
    }
}

/// Model advertised by the LLM provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    /// Check if the model can be used for text generation
    pub fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == "generateContent")
    }
}

/// Translation result for a single mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Model output, or the failure sentinel
    pub translation: String,
    /// Tokens that needed translating in this mode
    pub token_estimate: usize,
    /// Phrases kept verbatim; empty in direct mode
    pub exclusions: Vec<String>,
    /// False when `translation` holds the failure sentinel
    pub succeeded: bool,
}

/// Token usage comparison between the two modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenUsageReport {
    pub with_exclusion: usize,
    pub without_exclusion: usize,
    pub estimated_tokens_saved: i64,
}

impl TokenUsageReport {
    pub fn new(with_exclusion: usize, without_exclusion: usize) -> Self {
        Self {
            with_exclusion,
            without_exclusion,
            estimated_tokens_saved: without_exclusion as i64 - with_exclusion as i64,
        }
    }
}

/// Full response for one translated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentTranslation {
    pub original_filename: String,
    pub source_language: String,
    pub target_language: String,
    pub translated_content: String,
    pub token_usage: TokenUsageReport,
}
