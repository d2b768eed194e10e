//! Predict command: threshold baseline over similarity scores

use clap::Parser;
use std::path::PathBuf;

use super::super::output::{color, log_info};
use super::super::utils::{check_split, ensure_parent, export_groups, load_config, output_sets, read_records};
use super::super::GlobalOpts;
use crate::export::{group_records, ExportOptions, TopicGroup};

/// Build predicted chains from similarity scores
///
/// Groups (and split sets) match `cdcr export` on the same records with the
/// same split settings, so the predicted CONLL can be scored against the gold
/// one directly.
#[derive(Parser, Debug)]
pub struct PredictArgs {
    /// Annotation records (JSON array) carrying `similarity`
    #[arg(value_name = "RECORDS")]
    pub input: PathBuf,

    /// Predicted CONLL output
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Link a pair when its similarity is strictly above this value
    #[arg(short, long, value_name = "T")]
    pub threshold: Option<f64>,

    /// Train fraction, as given to `cdcr export`
    #[arg(long, value_name = "FRACTION")]
    pub split: Option<f64>,

    /// Seed, as given to `cdcr export`
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Name on the `#begin document` line
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Process topic groups sequentially
    #[arg(long)]
    pub no_parallel: bool,
}

/// Run the predict command.
pub fn run(args: PredictArgs, globals: &GlobalOpts) -> Result<(), String> {
    let config = load_config(globals.config.as_deref())?;
    let threshold = args.threshold.unwrap_or(config.threshold);
    if !threshold.is_finite() {
        return Err(format!("--threshold must be a number, got {}", threshold));
    }
    let split = check_split(args.split.or(config.split))?;
    let seed = args.seed.unwrap_or(config.seed);
    let name = args.name.unwrap_or(config.document_name);
    let options = ExportOptions {
        parallel: config.parallel && !args.no_parallel,
        ..ExportOptions::default()
    };

    let records = read_records(&args.input)?;
    let grouping = group_records(&records);
    log_info(
        &format!("predicting {} topic groups at threshold {}", grouping.groups.len(), threshold),
        globals.quiet,
    );

    for (path, groups) in output_sets(&args.output, grouping.groups, split, seed) {
        let predicted: Vec<TopicGroup> = groups.iter().map(|g| g.with_threshold(threshold)).collect();
        let output = export_groups(&predicted, options, false);
        ensure_parent(&path)?;
        output
            .write_conll(&path, &name)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        if !globals.quiet {
            println!(
                "{} {} ({} mentions, {} chains)",
                color("32", "ok:"),
                path.display(),
                output.summary.mentions,
                output.summary.chains
            );
        }
    }
    Ok(())
}
