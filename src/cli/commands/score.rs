//! Score command: MUC and the cluster comparison report

use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::super::output::{color, metric_colored, to_json, write_output};
use super::super::utils::load_config;
use super::super::GlobalOpts;
use crate::eval::{muc_score_sets, read_conll, ClusterSet, ComparisonReport, CorefScores};

/// Score predicted CONLL against gold CONLL
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Gold CONLL
    #[arg(value_name = "GOLD")]
    pub gold: PathBuf,

    /// Predicted CONLL
    #[arg(value_name = "PRED")]
    pub predicted: PathBuf,

    /// Fail on unbalanced markers instead of skipping the broken clusters
    #[arg(long)]
    pub strict: bool,

    /// Mention and chain-level report besides MUC
    #[arg(long)]
    pub detail: bool,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ScoreOutput {
    Muc { muc: CorefScores },
    Detail(ComparisonReport),
}

fn load_clusters(path: &Path, strict: bool, skip_corrupt: bool) -> Result<ClusterSet, String> {
    let doc = read_conll(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    for warning in &doc.warnings {
        log::warn!("{}: {}", path.display(), warning);
    }
    let clusters = doc.mention_clusters();
    if strict && !clusters.is_well_formed() {
        let issues: Vec<String> = clusters.issues.iter().map(ToString::to_string).collect();
        return Err(format!(
            "{} has {} structural issue(s): {}",
            path.display(),
            issues.len(),
            issues.join("; ")
        ));
    }
    Ok(ClusterSet::from_parsed(&clusters, skip_corrupt))
}

/// Run the score command.
pub fn run(args: ScoreArgs, globals: &GlobalOpts) -> Result<(), String> {
    let config = load_config(globals.config.as_deref())?;
    let skip = config.skip_corrupt_clusters;

    let gold = load_clusters(&args.gold, args.strict, skip)?;
    let predicted = load_clusters(&args.predicted, args.strict, skip)?;

    let output = if args.detail {
        ScoreOutput::Detail(ComparisonReport::compute(&gold, &predicted))
    } else {
        ScoreOutput::Muc {
            muc: muc_score_sets(&gold, &predicted),
        }
    };

    if args.json {
        return write_output(&to_json(&output)?, None);
    }

    match output {
        ScoreOutput::Detail(report) => print!("{}", report),
        ScoreOutput::Muc { muc } => {
            println!("{}", color("1;36", "MUC"));
            println!("  Recall:    {}", metric_colored(muc.recall));
            println!("  Precision: {}", metric_colored(muc.precision));
            println!("  F1:        {}", metric_colored(muc.f1));
        }
    }
    Ok(())
}
