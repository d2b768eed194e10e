//! CLI argument parsing and structure definitions

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use super::commands;

/// Cross-document coreference: export, convert and score CONLL chains
#[derive(Parser, Debug)]
#[command(name = "cdcr")]
#[command(
    author,
    version,
    about = "Cross-document coreference: export, convert and score CONLL chains",
    long_about = r#"
cdcr - coreference chains between news articles and science papers

WORKFLOW:
  1. export    annotation records -> gold CONLL + JSON interchange
  2. predict   similarity threshold -> predicted CONLL
  3. score     gold vs predicted -> MUC (and a detailed report)

EXAMPLES:
  cdcr export records.json -o out/gold.json --split 0.8
  cdcr predict records.json -o out/pred.conll --threshold 0.7
  cdcr score out/gold_test.conll out/pred.conll --detail
  cdcr validate out/*.conll
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Warnings and errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: <config dir>/cdcr/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build gold chains from annotation records
    #[command(visible_alias = "x")]
    Export(commands::ExportArgs),

    /// Build predicted chains from similarity scores
    #[command(visible_alias = "p")]
    Predict(commands::PredictArgs),

    /// Convert a document map (and entity list) to CONLL
    Conll(commands::ConllArgs),

    /// Score predicted CONLL against gold CONLL
    #[command(visible_alias = "s")]
    Score(commands::ScoreArgs),

    /// Check CONLL files for malformed rows and unbalanced markers
    #[command(visible_alias = "v")]
    Validate(commands::ValidateArgs),

    /// Inter-annotator agreement
    Iaa(commands::IaaArgs),

    /// Show or create the configuration file
    Config(commands::ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
