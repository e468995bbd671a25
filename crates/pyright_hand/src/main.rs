//! Pyright-hand launcher
//!
//! - **serve** (default): MCP server on stdio
//! - **check**: one-shot type check, CheckResult JSON on stdout
//! - **files**: list the Python files a check would analyze

use anyhow::Result;
use clap::{Parser, Subcommand};
use pyright_hand_core::{SeverityLevel, DEFAULT_PAGE_SIZE};
use pyright_hand_logging::{init_logging, LogConfig};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Parser, Debug)]
#[command(
    name = "pyright-hand",
    version,
    about = "Pyright type checking for AI assistants over MCP"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log level for stderr and the log file (RUST_LOG overrides)
    #[arg(
        long,
        global = true,
        env = "PYRIGHT_HAND_LOG",
        default_value = "info",
        value_parser = clap::builder::PossibleValuesParser::new(LOG_LEVELS)
    )]
    pub log_level: String,

    /// Also write a daily rolling log file into this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Project root to analyze
    #[arg(
        long,
        global = true,
        env = "PYRIGHT_HAND_ROOT",
        default_value = pyright_hand_mcp::server::DEFAULT_ANALYSIS_ROOT
    )]
    pub root: PathBuf,

    /// Pyright executable (looked up on PATH when unset)
    #[arg(long, global = true, env = "PYRIGHT_PATH")]
    pub pyright_path: Option<PathBuf>,

    /// Maximum seconds a single Pyright run may take
    #[arg(long, global = true, default_value_t = 300)]
    pub timeout_secs: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server on stdio (default)
    Serve,

    /// Type-check the project once and print the result as JSON
    Check {
        /// Minimum severity to report
        #[arg(long, default_value = "warning")]
        level: SeverityLevel,

        /// Extra gitignore-style pattern to exclude (repeatable)
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,

        /// Page number; out-of-range values are clamped
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        /// Diagnostics per page
        #[arg(long, default_value_t = default_page_size())]
        page_size: NonZeroUsize,
    },

    /// List discovered Python files, one per line
    Files {
        /// Extra gitignore-style pattern to exclude (repeatable)
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,
    },
}

fn default_page_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN)
}

fn run_command(cli: Cli) -> Result<()> {
    let config = cli::server_config(&cli.global);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cli::mcp::run(config),
        Commands::Check {
            level,
            ignore,
            page,
            page_size,
        } => cli::check::run(
            config,
            cli::check::CheckArgs {
                level,
                ignore,
                page,
                page_size,
            },
        ),
        Commands::Files { ignore } => cli::files::run(config, cli::files::FilesArgs { ignore }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(LogConfig {
        app_name: "pyright-hand",
        level: &cli.global.log_level,
        log_dir: cli.global.log_dir.as_deref(),
    }) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            return ExitCode::from(1);
        }
    };

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {:?}", err);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["pyright-hand"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.global.timeout_secs, 300);
    }

    #[test]
    fn test_check_arguments() {
        let cli = Cli::try_parse_from([
            "pyright-hand",
            "--root",
            "/srv/project",
            "check",
            "--level",
            "error",
            "--ignore",
            "tests/",
            "--ignore",
            "*.pyi",
            "--page",
            "-2",
            "--page-size",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.global.root, PathBuf::from("/srv/project"));
        match cli.command {
            Some(Commands::Check {
                level,
                ignore,
                page,
                page_size,
            }) => {
                assert_eq!(level, SeverityLevel::Error);
                assert_eq!(ignore, vec!["tests/", "*.pyi"]);
                assert_eq!(page, -2);
                assert_eq!(page_size.get(), 5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["pyright-hand", "check"]).unwrap();
        match cli.command {
            Some(Commands::Check {
                level,
                page,
                page_size,
                ..
            }) => {
                assert_eq!(level, SeverityLevel::Warning);
                assert_eq!(page, 1);
                assert_eq!(page_size.get(), 50);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_zero_page_size() {
        assert!(Cli::try_parse_from(["pyright-hand", "check", "--page-size", "0"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(Cli::try_parse_from(["pyright-hand", "check", "--level", "fatal"]).is_err());
        assert!(Cli::try_parse_from(["pyright-hand", "--log-level", "loud"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pyright-hand",
            "files",
            "--timeout-secs",
            "30",
            "--pyright-path",
            "/opt/pyright",
        ])
        .unwrap();
        assert_eq!(cli.global.timeout_secs, 30);
        assert_eq!(cli.global.pyright_path, Some(PathBuf::from("/opt/pyright")));
    }
}
