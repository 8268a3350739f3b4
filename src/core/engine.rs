//! Translation engine: direct and exclusion-aware modes

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::client::{GeminiClient, TextGenerator};
use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;
use crate::core::exclusion::{remove_phrases, ExclusionAnalyzer};
use crate::core::models::{
    DocumentTranslation, LanguagePair, TokenUsageReport, TranslationResult,
};
use crate::core::prompts;
use crate::core::text::normalize;
use crate::core::tokens::TokenEstimator;

/// Translated text substituted when the model call fails
pub const TRANSLATION_FAILED: &str = "Translation failed.";

/// Translation engine shared by the HTTP server and the CLI
#[derive(Debug, Clone)]
pub struct TranslationEngine {
    generator: Arc<dyn TextGenerator>,
    estimator: Arc<TokenEstimator>,
    analyzer: ExclusionAnalyzer,
    local_baseline: bool,
}

impl TranslationEngine {
    /// Create a new engine
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        estimator: Arc<TokenEstimator>,
        local_baseline: bool,
    ) -> Self {
        Self {
            analyzer: ExclusionAnalyzer::new(generator.clone()),
            generator,
            estimator,
            local_baseline,
        }
    }

    /// Gemini-backed engine with the configured tokenizer
    pub fn from_config(config: TranslatorConfig) -> Result<Self> {
        let estimator = Arc::new(TokenEstimator::for_model(&config.tokenizer_model)?);
        let local_baseline = config.local_baseline;
        let client = GeminiClient::new(config)?;
        Ok(Self::new(Arc::new(client), estimator, local_baseline))
    }

    /// Token count of `text` under the engine's vocabulary
    pub fn estimate_tokens(&self, text: &str) -> usize {
        self.estimator.estimate(text)
    }

    /// Translate without any exclusion instructions
    pub async fn translate_direct(&self, text: &str, pair: LanguagePair) -> TranslationResult {
        let text = normalize(text);
        let token_estimate = self.estimator.estimate(&text);
        let prompt = prompts::direct_translation_prompt(&text, pair.source(), pair.target());

        self.complete(&prompt, token_estimate, Vec::new(), "direct translation")
            .await
    }

    /// Translate while keeping model-identified phrases verbatim
    pub async fn translate_with_exclusion(
        &self,
        text: &str,
        pair: LanguagePair,
    ) -> TranslationResult {
        let text = normalize(text);

        let exclusions = self.analyzer.find_exclusions(&text, pair.source()).await;
        let reduced = remove_phrases(&text, &exclusions);
        let token_estimate = self.estimator.estimate(&reduced);
        debug!(
            "{} excluded phrases, {} tokens left to translate",
            exclusions.len(),
            token_estimate
        );

        // the prompt carries the full text, not the reduced one
        let prompt = prompts::exclusion_translation_prompt(&text, pair.source(), pair.target());

        self.complete(&prompt, token_estimate, exclusions, "exclusion-aware translation")
            .await
    }

    async fn complete(
        &self,
        prompt: &str,
        token_estimate: usize,
        exclusions: Vec<String>,
        mode: &str,
    ) -> TranslationResult {
        match self.generator.generate(prompt).await {
            Ok(response) => TranslationResult {
                translation: response.trim().to_string(),
                token_estimate,
                exclusions,
                succeeded: true,
            },
            Err(e) => {
                warn!("Error during {}: {}", mode, e);
                TranslationResult {
                    translation: TRANSLATION_FAILED.to_string(),
                    token_estimate,
                    exclusions,
                    succeeded: false,
                }
            }
        }
    }

    /// Baseline count for the comparison, from the direct call or locally
    async fn baseline_tokens(&self, text: &str, pair: LanguagePair) -> usize {
        if self.local_baseline {
            return self.estimator.estimate(&normalize(text));
        }
        self.translate_direct(text, pair).await.token_estimate
    }

    /// Run both modes in sequence and assemble the response
    pub async fn translate_document(
        &self,
        filename: &str,
        text: &str,
        pair: LanguagePair,
    ) -> DocumentTranslation {
        info!(
            "Translating {} ({} -> {}, {} chars)",
            filename,
            pair.source(),
            pair.target(),
            text.chars().count()
        );

        let without_exclusion = self.baseline_tokens(text, pair).await;
        let result = self.translate_with_exclusion(text, pair).await;
        let token_usage = TokenUsageReport::new(result.token_estimate, without_exclusion);

        info!(
            "Translated {}: {} tokens with exclusion, {} without, {} saved",
            filename,
            token_usage.with_exclusion,
            token_usage.without_exclusion,
            token_usage.estimated_tokens_saved
        );

        DocumentTranslation {
            original_filename: filename.to_string(),
            source_language: pair.source().label().to_string(),
            target_language: pair.target().label().to_string(),
            translated_content: result.translation,
            token_usage,
        }
    }

    /// Names of the provider's text-generation models, in provider order
    pub async fn list_generation_models(&self) -> Result<Vec<String>> {
        let models = self.generator.list_models().await?;
        Ok(models
            .into_iter()
            .filter(|m| m.supports_generation())
            .map(|m| m.name)
            .collect())
    }
}
