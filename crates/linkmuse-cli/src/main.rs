//! linkmuse - command-line host for note link discovery

mod cli;

use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linkmuse_core::{DiscoveryStatus, DocumentSource};
use linkmuse_discovery::{append_report, render_report, LinkDiscovery, Vault};
use linkmuse_inference::{LinkMuseConfig, ProviderGateway, RelevanceAnalyzer};

use cli::{Cli, Commands, LogLevel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_level);

    let mut config = match cli.config {
        Some(ref path) => LinkMuseConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LinkMuseConfig::load().context("Failed to load config")?,
    };
    if let Some(provider) = cli.provider {
        config.default_provider = provider;
    }

    match cli.command {
        Commands::Discover {
            note,
            vault,
            max_notes,
            max_links,
            append,
        } => {
            if let Some(n) = max_notes {
                config.max_notes_to_analyze = n;
            }
            if let Some(n) = max_links {
                config.max_links_to_generate = n;
            }
            config.validate().context("Invalid configuration")?;
            discover(&config, &vault, &note, append).await
        }
        Commands::TestConnection => {
            config.validate().context("Invalid configuration")?;
            test_connection(&config).await
        }
    }
}

async fn discover(
    config: &LinkMuseConfig,
    vault_root: &Path,
    note: &str,
    append: bool,
) -> anyhow::Result<()> {
    let vault = Vault::new(vault_root);
    let focal = vault
        .read(note)
        .await
        .with_context(|| format!("Failed to open note {}", note))?;

    let gateway = ProviderGateway::new(config.registry())?;
    let analyzer =
        RelevanceAnalyzer::new(gateway).with_content_truncation(config.content_truncation);
    let engine = LinkDiscovery::new(analyzer)
        .with_budget(config.budget())
        .with_concurrency(config.concurrency);

    eprintln!("{}", DiscoveryStatus::Analyzing);
    let links = match engine.discover_for(&focal, &vault).await {
        Ok(links) => links,
        Err(e) => {
            eprintln!("{}", DiscoveryStatus::Error(e.to_string()));
            return Err(e.into());
        }
    };

    let status = DiscoveryStatus::for_count(links.len());
    if !links.is_empty() {
        let report = render_report(&links);
        if append {
            let path = vault.root().join(&focal.path);
            tokio::fs::write(&path, append_report(&focal.content, &report))
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(note_path = %focal.path, result_count = links.len(), "Report appended");
        } else {
            print!("{}", report);
        }
    }
    eprintln!("{}", status);
    Ok(())
}

async fn test_connection(config: &LinkMuseConfig) -> anyhow::Result<()> {
    let gateway = ProviderGateway::new(config.registry())?;
    let provider = config.default_provider.as_str();

    if gateway.test_connection().await? {
        println!("{} API连接测试: 成功", provider);
        Ok(())
    } else {
        bail!("{} API连接测试: 失败", provider)
    }
}

/// Initialize tracing with configurable output
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   RUST_LOG    - standard env filter (default: "linkmuse=info")
///
/// Console logs go to stderr so reports on stdout stay clean.
fn init_logging(level: Option<LogLevel>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = match level {
        Some(level) => EnvFilter::default().add_directive(LevelFilter::from(level).into()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "linkmuse=info".into()),
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let guard = if let Some(ref path) = log_file {
        let file_dir = Path::new(path).parent().unwrap_or(Path::new("."));
        let file_name = Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("linkmuse.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
        None
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}
