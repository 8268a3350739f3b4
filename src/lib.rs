//! Document Translator - translate uploaded documents with an LLM
//!
//! Extracts text from .txt, .pdf and .docx files, translates it between
//! English and Japanese while keeping proper nouns verbatim, and estimates
//! how many tokens the exclusion saved.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;
pub mod server;

// Re-export key types for convenience
pub use self::core::{
    client::{GeminiClient, TextGenerator},
    config::TranslatorConfig,
    engine::TranslationEngine,
    errors::{ExtractionError, TranslationError},
    models::{DocumentTranslation, Language, LanguagePair, TokenUsageReport, TranslationResult},
    tokens::TokenEstimator,
};

pub use processors::extract;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
