//! From annotation records to aligned, cluster-labelled documents.
//!
//! # Stages
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Screening, grouping, split | [`topic`] | [`topic::TopicGroup`]s in topic order |
//! | Boundary resolution | [`boundary`] | surviving spans, owner merges |
//! | Chain building | [`chains`] | chains of [`chains::MentionKey`] |
//! | Segmentation | [`tokenize`] | sentences and tokens |
//! | Alignment | [`align`] | per-token cluster markers |
//! | Interchange | [`json`] | document map and entity list |
//!
//! [`pipeline::Exporter`] drives all of them for a batch.
//!
//! ```rust
//! use cdcr::export::{group_records, ExportOptions, Exporter};
//! use cdcr_core::{AnnotationRecord, Judgment, Label};
//!
//! let record = AnnotationRecord {
//!     id: 1,
//!     news_document_id: 10,
//!     science_document_id: 20,
//!     news_text: "The vaccine works.".into(),
//!     science_text: "mRNA vaccines were effective.".into(),
//!     news_mention: "The vaccine;0;11".into(),
//!     science_mention: "mRNA vaccines;0;13".into(),
//!     judgments: vec![Judgment::new("a", Label::Yes)],
//!     similarity: None,
//!     is_bad: false,
//! };
//!
//! let grouping = group_records(&[record]);
//! let output = Exporter::new(ExportOptions::default()).export(&grouping.groups);
//! let conll = output.conll("test_entities");
//!
//! assert!(conll.contains("0_news_10"));
//! assert!(conll.contains("(0"));
//! ```

pub mod align;
pub mod boundary;
pub mod chains;
pub mod json;
pub mod pipeline;
pub mod tokenize;
pub mod topic;

pub use align::{align, AlignedDocument, AlignedMention, AlignedToken, ClusterBound};
pub use boundary::{resolve_boundaries, Bound, OwnerId, Resolution};
pub use chains::{build_chains, ChainSet, ChainTask, ClusterIdAllocator, MentionKey};
pub use json::{conll_rows, entities_from_aligned, read_entities, write_json, DocumentMap, EntityRecord, TokenRow};
pub use pipeline::{ExportOptions, ExportOutput, ExportPaths, ExportSummary, Exporter, GroupReport};
pub use tokenize::{DocumentTokens, RuleTokenizer, Sentence, Token, Tokenizer};
pub use topic::{group_records, screen, split_groups, Grouping, ScreenedRecord, SkipReason, TopicGroup};
