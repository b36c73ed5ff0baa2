use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use readshelf::config::{Config, API_KEY_ENV, DEFAULT_CONFIG_FILE};
use readshelf::goodreads::{DatePolicy, SourceKind};
use readshelf::sync;

#[derive(Parser, Debug)]
#[command(
    name = "readshelf",
    about = "Export a Goodreads read shelf as static-site pages"
)]
struct Args {
    /// Config file (defaults to ./readshelf.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Endpoint to read from: rss or api (api needs GOODREADS_KEY)
    #[arg(long)]
    source: Option<SourceKind>,

    /// Goodreads numeric user id
    #[arg(long)]
    user_id: Option<u64>,

    /// Directory the pages are written into (must exist)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Service root URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Value of the `layout` front-matter key
    #[arg(long)]
    layout: Option<String>,

    /// Which dates make an entry eligible: read-or-added or read-only
    #[arg(long)]
    date_policy: Option<DatePolicy>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(user_id) = self.user_id {
            config.user_id = Some(user_id);
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(policy) = self.date_policy {
            config.date_policy = Some(policy);
        }
        if let Some(secs) = self.timeout {
            config.request_timeout_secs = Some(secs);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config_path = match &args.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            path.clone()
        }
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    args.apply(&mut config);
    tracing::debug!(config = ?config, "Effective configuration");

    let sync_config = config
        .resolve(std::env::var(API_KEY_ENV).ok())
        .context("Invalid configuration")?;

    let report = sync::run(&sync_config)
        .await
        .context("Failed to export read shelf")?;

    println!(
        "Wrote {} review(s) to {} ({} skipped)",
        report.written.len(),
        sync_config.write.output_dir.display(),
        report.skipped
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %format!("{:#}", e), "Export failed");
        std::process::exit(1);
    }
}
