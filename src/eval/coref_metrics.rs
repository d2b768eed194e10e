//! MUC link-based coreference scoring (Vilain et al., 1995).
//!
//! For every key cluster `K`, count the partitions `p(K)` it is cut into by
//! the response: each response cluster sharing a mention with `K` is one
//! partition, and each mention of `K` found in no response cluster is a
//! partition of its own. Then
//!
//! ```text
//! recall    = Σ (|K| - p(K)) / Σ (|K| - 1)      over gold clusters K
//! precision = same, with gold and predicted swapped
//! f1        = 2PR / (P + R)
//! ```
//!
//! Degenerate inputs are defined, not errors: a zero denominator yields 0,
//! so all-singleton inputs score 0 even against themselves.
//!
//! `|K| - p(K)` is not clamped. When one mention sits in several response
//! clusters, `p(K)` can exceed `|K|` and the cluster subtracts links; a
//! sufficiently fragmented response can then score below zero.
//!
//! # Example
//!
//! The worked example of Pradhan et al. (2014):
//!
//! ```rust
//! use cdcr::eval::coref_metrics::muc_score;
//! use std::collections::HashSet;
//!
//! let set = |xs: &[&'static str]| xs.iter().copied().collect::<HashSet<_>>();
//! let gold = vec![set(&["a", "b", "c"]), set(&["d", "e", "f", "g"])];
//! let pred = vec![set(&["a", "b"]), set(&["c", "d"]), set(&["f", "g", "h", "i"])];
//!
//! let scores = muc_score(&gold, &pred);
//! assert!((scores.recall - 0.4).abs() < 1e-9);
//! assert!((scores.precision - 0.4).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use super::coref::ClusterSet;

/// Precision, recall and F1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorefScores {
    /// Precision
    pub precision: f64,
    /// Recall
    pub recall: f64,
    /// F1 score
    pub f1: f64,
}

impl CorefScores {
    /// Create new scores; F1 is derived (0 when `P + R` is 0).
    #[must_use]
    pub fn new(precision: f64, recall: f64) -> Self {
        let sum = precision + recall;
        let f1 = if sum == 0.0 { 0.0 } else { 2.0 * precision * recall / sum };
        Self {
            precision,
            recall,
            f1,
        }
    }

    /// `(recall, precision, f1)`, the order scoring reports use.
    #[must_use]
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.recall, self.precision, self.f1)
    }
}

impl fmt::Display for CorefScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R={:.1}%  P={:.1}%  F1={:.1}%",
            self.recall * 100.0,
            self.precision * 100.0,
            self.f1 * 100.0
        )
    }
}

/// Link counts behind one direction of the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounts {
    /// Σ (|K| - p(K)), negative when a response splits mentions across
    /// more clusters than the key cluster has mentions.
    pub numerator: i64,
    /// Σ (|K| - 1)
    pub denominator: usize,
}

impl LinkCounts {
    /// numerator / denominator, 0 when the denominator is 0.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.denominator == 0 {
            0.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }
}

/// Count links of `key` recovered by `response`.
///
/// Empty key clusters contribute nothing.
pub fn muc_links<T: Eq + Hash>(key: &[HashSet<T>], response: &[HashSet<T>]) -> LinkCounts {
    let mut counts = LinkCounts::default();

    for cluster in key.iter().filter(|c| !c.is_empty()) {
        let mut partitions = 0;
        let mut remaining: HashSet<&T> = cluster.iter().collect();

        for other in response {
            let mut touches = false;
            for mention in cluster.iter().filter(|m| other.contains(*m)) {
                touches = true;
                remaining.remove(mention);
            }
            if touches {
                partitions += 1;
            }
        }
        // Mentions the response never placed are partitions of one.
        partitions += remaining.len();

        counts.numerator += cluster.len() as i64 - partitions as i64;
        counts.denominator += cluster.len() - 1;
    }

    counts
}

/// MUC scores of `predicted` against `gold`.
#[must_use]
pub fn muc_score<T: Eq + Hash>(gold: &[HashSet<T>], predicted: &[HashSet<T>]) -> CorefScores {
    let recall = muc_links(gold, predicted).ratio();
    let precision = muc_links(predicted, gold).ratio();
    CorefScores::new(precision, recall)
}

/// MUC scores between two parsed cluster sets.
#[must_use]
pub fn muc_score_sets(gold: &ClusterSet, predicted: &ClusterSet) -> CorefScores {
    muc_score(&gold.mention_sets(), &predicted.mention_sets())
}
