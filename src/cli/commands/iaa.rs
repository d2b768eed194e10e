//! Iaa command: Cohen's kappa between two annotators

use clap::Parser;
use std::path::PathBuf;

use super::super::output::{color, to_json, write_output};
use super::super::utils::read_records;
use super::super::GlobalOpts;
use crate::eval::{cohen_kappa, judgment_counts, paired_labels};

/// Inter-annotator agreement
#[derive(Parser, Debug)]
pub struct IaaArgs {
    /// Annotation records (JSON array)
    #[arg(value_name = "RECORDS")]
    pub input: PathBuf,

    /// First annotator
    #[arg(long, value_name = "NAME", requires = "second")]
    pub first: Option<String>,

    /// Second annotator
    #[arg(long, value_name = "NAME", requires = "first")]
    pub second: Option<String>,

    /// JSON output
    #[arg(long)]
    pub json: bool,
}

/// Run the iaa command.
pub fn run(args: IaaArgs, _globals: &GlobalOpts) -> Result<(), String> {
    let records = read_records(&args.input)?;

    let (first, second) = match (args.first, args.second) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            let counts = judgment_counts(&records);
            if args.json {
                return write_output(&to_json(&counts)?, None);
            }
            println!("{}", color("1;36", "Judgments per annotator"));
            for (annotator, count) in &counts {
                println!("  {:<24} {}", annotator, count);
            }
            return Ok(());
        }
    };

    let pairs = paired_labels(&records, &first, &second);
    let agreement = cohen_kappa(&pairs)
        .ok_or_else(|| format!("{} and {} share no judged records", first, second))?;

    if args.json {
        return write_output(&to_json(&agreement)?, None);
    }
    println!("{} vs {}", first, second);
    println!("  shared records: {}", agreement.shared);
    println!("  observed:       {:.3}", agreement.observed);
    println!("  expected:       {:.3}", agreement.expected);
    println!("  kappa:          {}", color("1", &format!("{:.3}", agreement.kappa)));
    Ok(())
}
