//! # cdcr
//!
//! Cross-document coreference between news articles and the science papers
//! they report on.
//!
//! - **Export**: pairwise annotator judgments in, coreference chains out, as
//!   token-aligned CONLL plus JSON interchange files
//! - **Evaluation**: tolerant CONLL reading, MUC scoring, cluster comparison
//!   reports, inter-annotator agreement
//!
//! ## Pipeline
//!
//! ```text
//! records.json ─▶ topic groups ─▶ boundary resolution ─▶ chains ─▶ alignment ─▶ CONLL / JSON
//!                                                                                     │
//!                                               predicted CONLL ─▶ MUC / report ◀─────┘
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use cdcr::eval::{muc_score, CorefScores};
//! use std::collections::HashSet;
//!
//! let gold: Vec<HashSet<&str>> = vec![["a", "b", "c"].into(), ["d", "e", "f", "g"].into()];
//! let pred: Vec<HashSet<&str>> = vec![["a", "b"].into(), ["c", "d"].into(), ["f", "g", "h", "i"].into()];
//!
//! let CorefScores { recall, precision, .. } = muc_score(&gold, &pred);
//! assert!((recall - 0.4).abs() < 1e-9);
//! assert!((precision - 0.4).abs() < 1e-9);
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Default | Adds |
//! |---------|---------|------|
//! | `cli` | yes | the `cdcr` binary (clap, env_logger, indicatif) |
//! | `parallel` | yes | rayon over topic groups during export |

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod eval;
pub mod export;
pub mod offset;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::Config;
pub use error::{Error, Result};
pub use offset::SpanConverter;

pub use cdcr_core::{AnnotationRecord, DocKey, DocType, Judgment, Label, MentionSpan, SpanParse, VoteCount};

/// Read a JSON array of annotation records.
pub fn read_records(path: impl AsRef<std::path::Path>) -> Result<Vec<AnnotationRecord>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let records: Vec<AnnotationRecord> = serde_json::from_str(&text)?;
    log::info!("read {} records from {}", records.len(), path.display());
    Ok(records)
}
