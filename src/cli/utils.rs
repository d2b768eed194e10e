//! Utility functions for CLI commands

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::export::pipeline::with_suffix;
use crate::export::{split_groups, ExportOptions, ExportOutput, Exporter, TopicGroup};
use crate::{AnnotationRecord, Config};

/// Effective config from `--config` or the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    Config::load(path).map_err(|e| e.to_string())
}

/// Read annotation records.
pub fn read_records(path: &Path) -> Result<Vec<AnnotationRecord>, String> {
    crate::read_records(path).map_err(|e| format!("Failed to read records {}: {}", path.display(), e))
}

/// Check a train fraction.
pub fn check_split(split: Option<f64>) -> Result<Option<f64>, String> {
    match split {
        Some(f) if !(0.0..=1.0).contains(&f) => Err(format!("--split must be within [0, 1], got {}", f)),
        other => Ok(other),
    }
}

/// Output sets: one per split side, or just `output` when not splitting.
pub fn output_sets(
    output: &Path,
    groups: Vec<TopicGroup>,
    split: Option<f64>,
    seed: u64,
) -> Vec<(PathBuf, Vec<TopicGroup>)> {
    match split {
        Some(fraction) => {
            let (train, test) = split_groups(groups, fraction, seed);
            vec![(with_suffix(output, "_train"), train), (with_suffix(output, "_test"), test)]
        }
        None => vec![(output.to_path_buf(), groups)],
    }
}

/// Export with an optional progress bar.
pub fn export_groups(groups: &[TopicGroup], options: ExportOptions, progress: bool) -> ExportOutput {
    let pb = group_progress(groups.len(), progress);
    let output = Exporter::new(options).export_with(groups, |report| {
        pb.inc(1);
        if let Some(e) = &report.error {
            pb.set_message(format!("topic {} skipped: {}", report.topic, e));
        }
    });
    pb.finish_and_clear();
    output
}

/// Progress bar over `len` topic groups, or a hidden one.
pub fn group_progress(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => log::debug!("progress template rejected: {}", e),
    }
    pb
}

/// Create the parent directory of an output path.
pub fn ensure_parent(path: &Path) -> Result<(), String> {
    match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => std::fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e)),
        None => Ok(()),
    }
}
