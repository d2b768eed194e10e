//! Reading and scoring clustered CONLL output.
//!
//! - [`conll`]: the 8-column CONLL format, writer and tolerant parser
//! - [`coref`]: mention signatures and cluster sets built from parsed files
//! - [`coref_metrics`]: MUC
//! - [`analysis`]: mention-level and chain-level comparison beyond MUC
//! - [`iaa`]: Cohen's kappa between annotators
//!
//! ```rust
//! use cdcr::eval::{muc_score_sets, parse_conll, ClusterSet};
//!
//! let gold = "#begin document test_entities\n\
//!     0\t0_0\t0_news_1\t0\t0\tvaccines\tTrue\t(1)\n\
//!     0\t0_0\t0_science_2\t0\t0\tvaccine\tTrue\t(1)\n\
//!     #end document\n";
//!
//! let clusters = ClusterSet::from_parsed(&parse_conll(gold).mention_clusters(), true);
//! let scores = muc_score_sets(&clusters, &clusters);
//! assert_eq!(scores.f1, 1.0);
//! ```

pub mod analysis;
pub mod conll;
pub mod coref;
pub mod coref_metrics;
pub mod iaa;

pub use analysis::{ChainTally, ComparisonReport};
pub use conll::{
    conll_to_string, parse_conll, read_conll, write_conll, ClusterMarker, ConllDocument, ConllRow, MarkerPart,
    MentionClusters, ParsedMention, RowWarning, StructuralIssue, DEFAULT_DOCUMENT_NAME,
};
pub use coref::{Cluster, ClusterSet, MentionSignature};
pub use coref_metrics::{muc_links, muc_score, muc_score_sets, CorefScores, LinkCounts};
pub use iaa::{cohen_kappa, judgment_counts, paired_labels, Agreement};
