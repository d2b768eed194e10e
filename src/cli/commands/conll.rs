//! Conll command: document map (+ entity list) to CONLL

use clap::Parser;
use std::path::PathBuf;

use super::super::output::{color, write_output};
use super::super::utils::{ensure_parent, load_config};
use super::super::GlobalOpts;
use crate::eval::conll_to_string;
use crate::export::pipeline::with_suffix;
use crate::export::{conll_rows, read_entities, DocumentMap};

/// Convert a document map (and entity list) to CONLL
#[derive(Parser, Debug)]
pub struct ConllArgs {
    /// Document map JSON
    #[arg(value_name = "DOCS")]
    pub input: PathBuf,

    /// CONLL output (stdout if omitted)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Entity list JSON (default: `<stem>_entities<ext>` next to DOCS, if present)
    #[arg(short, long, value_name = "PATH")]
    pub entities: Option<PathBuf>,

    /// Name on the `#begin document` line
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

/// Run the conll command.
pub fn run(args: ConllArgs, globals: &GlobalOpts) -> Result<(), String> {
    let config = load_config(globals.config.as_deref())?;
    let name = args.name.unwrap_or(config.document_name);

    let docs = DocumentMap::read(&args.input)
        .map_err(|e| format!("Failed to read document map {}: {}", args.input.display(), e))?;

    let entities_path = args.entities.or_else(|| {
        let sibling = with_suffix(&args.input, "_entities");
        sibling.is_file().then_some(sibling)
    });
    let entities = match &entities_path {
        Some(path) => {
            read_entities(path).map_err(|e| format!("Failed to read entities {}: {}", path.display(), e))?
        }
        None => {
            log::warn!("no entity list for {}; writing unmarked tokens", args.input.display());
            Vec::new()
        }
    };

    let rows = conll_rows(&docs, &entities).map_err(|e| e.to_string())?;
    let text = conll_to_string(&name, &rows);

    match &args.output {
        Some(path) => {
            ensure_parent(path)?;
            write_output(&text, Some(path.as_path()))?;
            if !globals.quiet {
                println!(
                    "{} {} ({} documents, {} entities)",
                    color("32", "ok:"),
                    path.display(),
                    docs.len(),
                    entities.len()
                );
            }
        }
        None => write_output(&text, None)?,
    }
    Ok(())
}
