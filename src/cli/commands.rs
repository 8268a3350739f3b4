//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::core::config::TranslatorConfig;
use crate::core::engine::TranslationEngine;
use crate::core::models::{DocumentTranslation, Language, LanguagePair};
use crate::processors;

/// Commands for the document translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },

    /// Translate a single .txt, .pdf or .docx file
    Translate {
        /// Input file (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Source language: English or Japanese
        #[arg(short, long, value_parser = parse_language)]
        source: Language,

        /// Target language: English or Japanese
        #[arg(short, long, value_parser = parse_language)]
        target: Language,

        /// Write the JSON response here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List models that support text generation
    Models,
}

fn parse_language(value: &str) -> Result<Language, String> {
    value.parse::<Language>().map_err(|e| e.to_string())
}

/// Handle server command
pub async fn handle_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    crate::server::api::run_server(config, host, port).await
}

/// Read, extract and translate one file
pub async fn translate_file(
    engine: &TranslationEngine,
    file: &Path,
    pair: LanguagePair,
) -> anyhow::Result<DocumentTranslation> {
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let bytes = tokio::fs::read(file).await?;
    let text = processors::extract(&bytes, &filename)?;

    Ok(engine.translate_document(&filename, &text, pair).await)
}

/// Handle single-file translation command
pub async fn handle_translate(
    config: TranslatorConfig,
    file: PathBuf,
    source: Language,
    target: Language,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::{Duration, Instant};
    use tracing::info;

    let start_time = Instant::now();
    let pair = LanguagePair::new(source, target)?;

    info!("Input: {}", file.display());
    info!("{} -> {}", source, target);

    let engine = TranslationEngine::from_config(config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Translating {}", file.display()));

    let result = translate_file(&engine, &file, pair).await;
    spinner.finish_and_clear();
    let response = result?;

    let json = serde_json::to_string_pretty(&response)?;
    match output {
        Some(path) => {
            tokio::fs::write(&path, json).await?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    info!(
        "Done in {:.1}s, {} tokens saved",
        start_time.elapsed().as_secs_f64(),
        response.token_usage.estimated_tokens_saved
    );

    Ok(())
}

/// Handle model listing command
pub async fn handle_models(config: TranslatorConfig) -> anyhow::Result<()> {
    let engine = TranslationEngine::from_config(config)?;
    for name in engine.list_generation_models().await? {
        println!("{}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::testing::ScriptedGenerator;
    use crate::core::errors::{ExtractionError, TranslationError};
    use crate::core::tokens::TokenEstimator;
    use clap::Parser;
    use std::sync::Arc;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    fn engine(generator: Arc<ScriptedGenerator>) -> TranslationEngine {
        TranslationEngine::new(generator, Arc::new(TokenEstimator::fallback().unwrap()), false)
    }

    #[test]
    fn test_translate_args_parse_languages() {
        let cli = TestCli::try_parse_from([
            "doc-translator", "translate", "--file", "a.txt", "--source", "Japanese", "--target", "English",
        ])
        .unwrap();

        match cli.command {
            Commands::Translate { source, target, output, .. } => {
                assert_eq!(source, Language::Japanese);
                assert_eq!(target, Language::English);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_language_rejected_by_parser() {
        assert!(TestCli::try_parse_from([
            "doc-translator", "translate", "-f", "a.txt", "-s", "German", "-t", "English",
        ])
        .is_err());
    }

    #[tokio::test]
    async fn test_translate_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.txt");
        std::fs::write(&path, "Acme Corp develops software.").unwrap();

        let generator = Arc::new(ScriptedGenerator::new(r#"["Acme Corp"]"#, "翻訳"));
        let pair = LanguagePair::new(Language::English, Language::Japanese).unwrap();

        let response = translate_file(&engine(generator), &path, pair).await.unwrap();
        assert_eq!(response.original_filename, "acme.txt");
        assert_eq!(response.translated_content, "翻訳");
        assert!(response.token_usage.estimated_tokens_saved > 0);
    }

    #[tokio::test]
    async fn test_translate_file_rejects_doc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.doc");
        std::fs::write(&path, "whatever").unwrap();

        let generator = Arc::new(ScriptedGenerator::new("[]", "unused"));
        let pair = LanguagePair::new(Language::English, Language::Japanese).unwrap();

        let err = translate_file(&engine(generator.clone()), &path, pair)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractionError>(),
            Some(ExtractionError::LegacyFormatUnsupported)
        ));
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn test_same_language_pair_fails_fast() {
        assert!(matches!(
            LanguagePair::new(Language::Japanese, Language::Japanese),
            Err(TranslationError::SameLanguage)
        ));
    }
}
