//! Export command: annotation records to gold CONLL and JSON interchange

use clap::Parser;
use std::path::PathBuf;

use super::super::output::{color, log_info};
use super::super::utils::{check_split, export_groups, load_config, output_sets, read_records};
use super::super::GlobalOpts;
use crate::export::{group_records, ExportOptions};

/// Build gold chains from annotation records
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Annotation records (JSON array)
    #[arg(value_name = "RECORDS")]
    pub input: PathBuf,

    /// Document-map output; `<stem>_entities<ext>` and `<stem>.conll` are written alongside
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Train fraction; writes `<stem>_train` and `<stem>_test` sets
    #[arg(long, value_name = "FRACTION")]
    pub split: Option<f64>,

    /// Seed for the split shuffle
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Name on the `#begin document` line
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Show a progress bar
    #[arg(long)]
    pub progress: bool,

    /// Process topic groups sequentially
    #[arg(long)]
    pub no_parallel: bool,
}

/// Run the export command.
pub fn run(args: ExportArgs, globals: &GlobalOpts) -> Result<(), String> {
    let config = load_config(globals.config.as_deref())?;
    let split = check_split(args.split.or(config.split))?;
    let seed = args.seed.unwrap_or(config.seed);
    let name = args.name.unwrap_or(config.document_name);
    let options = ExportOptions {
        parallel: config.parallel && !args.no_parallel,
        ..ExportOptions::default()
    };

    let records = read_records(&args.input)?;
    let grouping = group_records(&records);
    if grouping.groups.is_empty() {
        log::warn!("no usable records in {}", args.input.display());
    }
    log_info(
        &format!(
            "{} records: {} topic groups, {} skipped",
            records.len(),
            grouping.groups.len(),
            grouping.skipped.len()
        ),
        globals.quiet,
    );

    for (path, groups) in output_sets(&args.output, grouping.groups, split, seed) {
        let output = export_groups(&groups, options, args.progress);
        let paths = output
            .write(&path, &name)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

        let s = &output.summary;
        if !globals.quiet {
            println!(
                "{} {} ({} documents, {} mentions, {} chains, {} singletons)",
                color("32", "ok:"),
                paths.conll.display(),
                s.documents,
                s.mentions,
                s.chains,
                s.singletons
            );
        }
        if !s.skipped_groups.is_empty() {
            log::warn!("{}: {} topic groups skipped", path.display(), s.skipped_groups.len());
        }
    }
    Ok(())
}
