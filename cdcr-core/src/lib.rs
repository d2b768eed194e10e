//! # cdcr-core
//!
//! Core types shared across the cdcr workspace.
//!
//! This crate provides:
//! - **Spans**: `MentionSpan` and its strict `text;start;end` encoding
//! - **Records**: `AnnotationRecord`, `Judgment`, `Label`, majority voting
//! - **Identity**: `DocType` and the synthetic `DocKey` (`{topic}_{type}_{id}`)
//!
//! No I/O happens here; loading and writing live in the `cdcr` crate.

pub mod error;
pub mod record;
pub mod span;

pub use error::{Error, Result};
pub use record::{AnnotationRecord, DocKey, DocType, Judgment, Label, VoteCount};
pub use span::{MentionSpan, SpanParse, SPAN_SEPARATOR};
