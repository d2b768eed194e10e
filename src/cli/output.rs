//! Output formatting utilities for CLI commands

use is_terminal::IsTerminal;
use std::io::{self, Write};
use std::path::Path;

/// ANSI-colour `text` when stdout is a terminal.
pub fn color(code: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Percentage with a colour keyed to quality.
pub fn metric_colored(value: f64) -> String {
    let pct = value * 100.0;
    let code = if pct >= 90.0 {
        "1;32"
    } else if pct >= 70.0 {
        "1;33"
    } else if pct >= 50.0 {
        "33"
    } else {
        "1;31"
    };
    color(code, &format!("{:5.1}%", pct))
}

/// Log info message (respects quiet flag)
pub fn log_info(msg: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", msg);
    }
}

/// Write output to file or stdout
pub fn write_output(content: &str, path: Option<&Path>) -> Result<(), String> {
    if let Some(path) = path {
        std::fs::write(path, content).map_err(|e| format!("Failed to write to {}: {}", path.display(), e))?;
    } else {
        print!("{}", content);
        io::stdout().flush().map_err(|e| format!("Failed to flush stdout: {}", e))?;
    }
    Ok(())
}

/// Pretty JSON for `--json` output.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|s| s + "\n")
        .map_err(|e| format!("Failed to serialize output: {}", e))
}
