use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages, including per-candidate scores
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "linkmuse")]
#[command(about = "linkmuse - discover unlinked notes related to a note with an LLM")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// Overrides RUST_LOG when given
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file path (defaults to $LINKMUSE_CONFIG or ./linkmuse.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Active provider (openai, claude, siliconflow, volc); overrides config
    #[arg(short, long, global = true)]
    pub provider: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Suggest links from a note to related, not yet linked notes
    Discover {
        /// Note path relative to the vault root
        note: String,

        /// Vault root directory
        #[arg(short, long, env = "LINKMUSE_VAULT", default_value = ".")]
        vault: PathBuf,

        /// Notes sent to the model (overrides config)
        #[arg(long)]
        max_notes: Option<usize>,

        /// Links returned (overrides config)
        #[arg(long)]
        max_links: Option<usize>,

        /// Append the report to the note instead of printing it
        #[arg(long)]
        append: bool,
    },

    /// Send a minimal prompt to the active provider
    TestConnection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_discover() {
        let cli = Cli::try_parse_from([
            "linkmuse",
            "--provider",
            "volc",
            "discover",
            "topics/Rust.md",
            "--vault",
            "/notes",
            "--max-links",
            "3",
            "--append",
        ])
        .unwrap();

        assert_eq!(cli.provider.as_deref(), Some("volc"));
        match cli.command {
            Commands::Discover {
                note,
                vault,
                max_notes,
                max_links,
                append,
            } => {
                assert_eq!(note, "topics/Rust.md");
                assert_eq!(vault, PathBuf::from("/notes"));
                assert_eq!(max_notes, None);
                assert_eq!(max_links, Some(3));
                assert!(append);
            }
            _ => panic!("expected discover"),
        }
    }

    #[test]
    fn test_parse_test_connection_with_log_level() {
        let cli = Cli::try_parse_from(["linkmuse", "test-connection", "-l", "debug"]).unwrap();
        assert!(matches!(cli.command, Commands::TestConnection));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
    }
}
