//! Validate command: malformed rows and unbalanced markers in CONLL files

use clap::Parser;
use std::path::PathBuf;

use super::super::output::color;
use super::super::GlobalOpts;
use crate::eval::read_conll;

/// Check CONLL files for malformed rows and unbalanced markers
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// CONLL files
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

/// Run the validate command. Fails if any file has a structural issue.
pub fn run(args: ValidateArgs, globals: &GlobalOpts) -> Result<(), String> {
    let mut broken = 0usize;

    for path in &args.files {
        let doc = read_conll(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let clusters = doc.mention_clusters();

        for warning in &doc.warnings {
            println!("{} {}: {}", color("33", "warn"), path.display(), warning);
        }
        for issue in &clusters.issues {
            println!("{} {}: {}", color("31", "error"), path.display(), issue);
        }

        if !clusters.is_well_formed() {
            broken += 1;
        } else if !globals.quiet {
            println!(
                "{} {} ({} rows, {} clusters)",
                color("32", "ok:"),
                path.display(),
                doc.rows.len(),
                clusters.cluster_count()
            );
        }
    }

    if broken > 0 {
        return Err(format!("{} of {} file(s) have structural issues", broken, args.files.len()));
    }
    Ok(())
}
