//! Skillpub CLI
//!
//! Two commands over a corpus root:
//! - `publish` runs the full pipeline and publishes to the registry;
//!   exit code 0 only when every document published.
//! - `check` runs loader + normalizer + validator without publishing;
//!   `--fix` writes normalized documents back to storage.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::warn;

use skillpub::category::CategoryMap;
use skillpub::config::{default_config, load_config, resolve_path, PipelineConfig};
use skillpub::publish::report::{exit_code, render_batch, render_check, render_json};
use skillpub::publish::{run_batch, run_check, BatchOptions};
use skillpub::registry::RegistryHttpClient;
use skillpub::validate::ValidationLimits;

/// Skillpub -- skill corpus publish pipeline
#[derive(Parser, Debug)]
#[command(
    name = "skillpub",
    version,
    about = "Validate, normalize, and publish a skill corpus to the registry"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline over a corpus root and publish every
    /// conformant document
    Publish {
        /// Corpus root directory (one subdirectory per skill)
        root: String,

        /// Maximum documents published concurrently
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-document publish timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Registry API base URL (overrides config)
        #[arg(long)]
        api_url: Option<String>,

        /// Registry API key (overrides config)
        #[arg(long)]
        api_key: Option<String>,

        /// Emit the batch report as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Check the corpus without publishing; optionally normalize in place
    Check {
        /// Corpus root directory (one subdirectory per skill)
        root: String,

        /// Write normalized documents back to storage
        #[arg(long)]
        fix: bool,
    },
}

fn limits_from(config: &PipelineConfig) -> ValidationLimits {
    ValidationLimits {
        description_min_chars: config.description_min_chars,
        description_max_chars: config.description_max_chars,
        max_body_lines: config.max_body_lines,
    }
}

async fn run_publish(
    config: PipelineConfig,
    root: String,
    concurrency: Option<usize>,
    timeout_secs: Option<u64>,
    api_url: Option<String>,
    api_key: Option<String>,
    json: bool,
) -> Result<i32> {
    let api_url = api_url.unwrap_or(config.registry_api_url.clone());
    let api_key = api_key.unwrap_or(config.registry_api_key.clone());
    if api_key.is_empty() {
        eprintln!("No registry API key configured. Set registryApiKey in the config or pass --api-key.");
        return Ok(1);
    }

    let options = BatchOptions {
        concurrency: concurrency.unwrap_or(config.concurrency),
        publish_timeout: Duration::from_secs(
            timeout_secs.unwrap_or(config.publish_timeout_secs),
        ),
        limits: limits_from(&config),
    };

    let registry = Arc::new(RegistryHttpClient::new(api_url, api_key));
    let categories = Arc::new(CategoryMap::with_entries(&config.categories));

    // Ctrl+C requests cooperative cancellation: no new documents start,
    // in-flight publish calls finish or time out, and the report still
    // covers the whole corpus.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("Cancellation requested; finishing in-flight documents");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let root = PathBuf::from(resolve_path(&root));
    let output = run_batch(&root, registry, categories, options, cancel).await?;

    if json {
        println!("{}", render_json(&output.report)?);
    } else {
        print!("{}", render_batch(&output));
    }

    Ok(exit_code(&output.report))
}

fn run_check_command(config: PipelineConfig, root: String, fix: bool) -> Result<i32> {
    let categories = CategoryMap::with_entries(&config.categories);
    let limits = limits_from(&config);

    let root = PathBuf::from(resolve_path(&root));
    let report = run_check(&root, &categories, &limits, fix)?;
    print!("{}", render_check(&report));

    Ok(if report.is_clean() { 0 } else { 1 })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skillpub=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config().unwrap_or_else(default_config);

    let result = match cli.command {
        Commands::Publish {
            root,
            concurrency,
            timeout_secs,
            api_url,
            api_key,
            json,
        } => {
            run_publish(
                config,
                root,
                concurrency,
                timeout_secs,
                api_url,
                api_key,
                json,
            )
            .await
        }
        Commands::Check { root, fix } => run_check_command(config, root, fix),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Fatal: {:#}", e);
            std::process::exit(2);
        }
    }
}
