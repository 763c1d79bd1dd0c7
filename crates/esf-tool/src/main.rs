//! esf-tool binary entry point.
//!
//! Thin wrapper around the esf-formats library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Runs one subcommand and maps its outcome to an exit code

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "esf-tool",
    about = "Inspect and round-trip ESF save and pack files",
    version
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log filter directive, overrides --verbose and RUST_LOG
    #[arg(long, global = true, env = "ESF_TOOL_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare two documents structurally and report the first mismatch
    ///
    /// Exit codes: 0 equal, 1 mismatch, 2 usage error or missing file,
    /// 3 differences only under the allowed path.
    Compare {
        left: PathBuf,
        right: PathBuf,
        /// Ignore differences at paths ending with this suffix
        #[arg(long)]
        allow: Option<String>,
    },

    /// Load, fully decode and write a document back out
    Probe {
        input: PathBuf,
        output: PathBuf,
        /// Keep the header timestamp instead of stamping the current time
        #[arg(long)]
        keep_time: bool,
        /// Record path (e.g. `COMPRESSED_DATA/CAMPAIGN_ENV/WORLD`) whose first
        /// integer value is replaced before writing
        #[arg(long, requires = "set")]
        path: Option<String>,
        /// Replacement integer for --path
        #[arg(long, requires = "path", allow_negative_numbers = true)]
        set: Option<i64>,
    },

    /// Print a document as JSON
    Dump {
        input: PathBuf,
        /// Print only the node tree, without header and tables
        #[arg(long)]
        tree_only: bool,
        /// Leave compressed records packed
        #[arg(long)]
        no_expand: bool,
    },

    /// Print header fields and table sizes
    Info { input: PathBuf },
}

fn init_logging(cli: &Cli) {
    let filter = match &cli.log {
        Some(directive) => EnvFilter::new(directive),
        None if cli.verbose => EnvFilter::new("debug"),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Command::Compare { left, right, allow } => {
            commands::compare(&left, &right, allow.as_deref())
        }
        Command::Probe {
            input,
            output,
            keep_time,
            path,
            set,
        } => {
            let mutation = path.zip(set);
            commands::probe(&input, &output, keep_time, mutation.as_ref())
        }
        Command::Dump {
            input,
            tree_only,
            no_expand,
        } => commands::dump(&input, tree_only, !no_expand),
        Command::Info { input } => commands::info(&input),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            if commands::is_not_found(&err) {
                ExitCode::from(commands::EXIT_USAGE)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
