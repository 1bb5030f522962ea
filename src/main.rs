//! SafeMask - PII redaction for free-form text
//!
//! Reads a text, masks personal and payment data in it and prints the
//! masked text with the list of masked entities as JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use safemask::{normalize, MaskedDocument, Masker, MaskerConfig};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Parser)]
#[command(name = "safemask")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Mask personal and payment data in free-form text")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SAFEMASK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mask PII and print the result as JSON
    Mask {
        #[command(flatten)]
        input: Input,

        /// Known person name to mask (repeatable)
        #[arg(short, long = "person")]
        persons: Vec<String>,
    },

    /// Print the normalized text
    Normalize {
        #[command(flatten)]
        input: Input,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

/// Input source; stdin when neither is given.
#[derive(Args)]
struct Input {
    /// Text to process
    #[arg(short, long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the text from a file
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl Input {
    fn read(self) -> Result<String> {
        if let Some(text) = self.text {
            return Ok(text);
        }
        if let Some(path) = self.file {
            return std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    }
}

/// JSON payload printed by `mask`.
#[derive(Serialize)]
struct MaskOutput<'a> {
    input_email_body: &'a str,
    #[serde(flatten)]
    document: MaskedDocument,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the payload
    let log_level = if cli.verbose { "debug" } else { "info" };
    let fmt_layer = if cli.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("safemask={}", log_level).into()),
        )
        .with(fmt_layer)
        .init();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        MaskerConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else {
        MaskerConfig::default()
    };

    match cli.command {
        Commands::Mask { input, persons } => {
            run_mask(config, input.read()?, persons)?;
        }
        Commands::Normalize { input } => {
            println!("{}", normalize(&input.read()?));
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

fn run_mask(mut config: MaskerConfig, text: String, persons: Vec<String>) -> Result<()> {
    config.analyzer.person_names.extend(persons);
    let masker = Masker::new(&config)?;

    let document = masker.mask_pii(&text)?;
    tracing::info!(entities = document.entities.len(), "Masked input");

    let output = MaskOutput {
        input_email_body: &text,
        document,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn show_config(config: Option<&MaskerConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
