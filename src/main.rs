//! Main entry point for the document translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use doc_translator::cli::commands::{self, Commands};
use doc_translator::TranslatorConfig;

/// Document Translator - LLM translation with proper-noun exclusion
#[derive(Parser, Debug)]
#[command(name = "doc-translator", version, about, long_about = None)]
struct Args {
    /// API key for Gemini (optional, defaults to GEMINI_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// JSON configuration file (overrides environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn load_config(args: &Args) -> anyhow::Result<TranslatorConfig> {
    let mut config = match &args.config {
        Some(path) => TranslatorConfig::from_file(path)?,
        None => TranslatorConfig::from_env()?,
    };

    // Override config with CLI args if provided
    if let Some(api_key) = &args.api_key {
        config.api_key = api_key.clone();
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("doc_translator={},tower_http={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Execute command
    match args.command {
        Some(Commands::Server { ref host, port }) => {
            let config = load_config(&args)?;
            commands::handle_server(config, host.clone(), port).await?;
        }
        Some(Commands::Translate {
            ref file,
            source,
            target,
            ref output,
        }) => {
            let config = load_config(&args)?;
            commands::handle_translate(config, file.clone(), source, target, output.clone()).await?;
        }
        Some(Commands::Models) => {
            let config = load_config(&args)?;
            commands::handle_models(config).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_key_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translator.json");
        TranslatorConfig {
            api_key: "file-key".to_string(),
            ..Default::default()
        }
        .to_file(&path)
        .unwrap();

        let args = Args::try_parse_from([
            "doc-translator",
            "--api-key",
            "cli-key",
            "--config",
            path.to_str().unwrap(),
            "models",
        ])
        .unwrap();
        assert_eq!(load_config(&args).unwrap().api_key, "cli-key");
    }

    #[test]
    fn test_config_file_key_used_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translator.json");
        TranslatorConfig {
            api_key: "file-key".to_string(),
            ..Default::default()
        }
        .to_file(&path)
        .unwrap();

        let args =
            Args::try_parse_from(["doc-translator", "--config", path.to_str().unwrap(), "models"]).unwrap();
        assert_eq!(load_config(&args).unwrap().api_key, "file-key");
    }
}
