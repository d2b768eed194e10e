//! The `cdcr` command-line interface.
//!
//! Argument structs live next to their command in [`commands`]; [`run`]
//! dispatches a parsed [`Cli`]. Every command returns `Result<(), String>`
//! and leaves exit codes to the binary.

pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;

use clap::CommandFactory;
use clap_complete::generate;
use env_logger::Env;
use log::LevelFilter;
use std::io;
use std::path::PathBuf;

pub use parser::{Cli, Commands};

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Explicit config file.
    pub config: Option<PathBuf>,
    /// Suppress informational output.
    pub quiet: bool,
}

/// Install the `env_logger` backend.
///
/// `RUST_LOG` wins unless `-v` or `-q` was given.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if quiet {
        builder.filter_level(LevelFilter::Warn);
    } else if verbose > 0 {
        builder.filter_level(if verbose == 1 {
            LevelFilter::Debug
        } else {
            LevelFilter::Trace
        });
    }
    let _ = builder.try_init();
}

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<(), String> {
    let globals = GlobalOpts {
        config: cli.config,
        quiet: cli.quiet,
    };
    match cli.command {
        Commands::Export(args) => commands::export::run(args, &globals),
        Commands::Predict(args) => commands::predict::run(args, &globals),
        Commands::Conll(args) => commands::conll::run(args, &globals),
        Commands::Score(args) => commands::score::run(args, &globals),
        Commands::Validate(args) => commands::validate::run(args, &globals),
        Commands::Iaa(args) => commands::iaa::run(args, &globals),
        Commands::Config(args) => commands::config::run(args, &globals),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "cdcr", &mut io::stdout());
            Ok(())
        }
    }
}
